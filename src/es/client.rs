use async_trait::async_trait;
use elasticsearch::auth::Credentials;
use elasticsearch::cert::CertificateValidation;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use elasticsearch::indices::{IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts};
use elasticsearch::{BulkParts, Elasticsearch};
use serde_json::Value;
use url::Url;

use crate::config::EsConfig;
use crate::error::AppError;
use crate::es::indexer::{bulk_body, first_error_reason, summarize};
use crate::es::mapping::IndexSchema;
use crate::sink::{BulkSummary, IndexSink};

pub fn create_client(config: &EsConfig) -> anyhow::Result<Elasticsearch> {
    let url = Url::parse(&config.url)?;
    let pool = SingleNodeConnectionPool::new(url);
    let mut builder = TransportBuilder::new(pool)
        .disable_proxy()
        .auth(Credentials::Basic(
            config.username.clone(),
            config.password.clone(),
        ));
    if config.accept_invalid_certs {
        builder = builder.cert_validation(CertificateValidation::None);
    }
    let transport = builder.build()?;
    Ok(Elasticsearch::new(transport))
}

/// `IndexSink` backed by a single Elasticsearch node.
pub struct EsSink {
    client: Elasticsearch,
}

impl EsSink {
    pub fn new(client: Elasticsearch) -> Self {
        Self { client }
    }

    pub fn from_config(config: &EsConfig) -> anyhow::Result<Self> {
        Ok(Self::new(create_client(config)?))
    }
}

#[async_trait]
impl IndexSink for EsSink {
    async fn ping(&self) -> Result<(), AppError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| AppError::Connectivity(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(AppError::Connectivity(format!("ping returned status {status}")));
        }
        Ok(())
    }

    async fn index_exists(&self, index: &str) -> Result<bool, AppError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(AppError::Provisioning(format!(
                "existence check for '{index}' returned status {status}"
            ))),
        }
    }

    async fn create_index(&self, index: &str, schema: &IndexSchema) -> Result<(), AppError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(schema.index_body())
            .send()
            .await?;

        if !response.status_code().is_success() {
            let error_body: Value = response.json().await?;
            return Err(AppError::Provisioning(format!(
                "failed to create index '{index}': {}",
                error_body["error"]
            )));
        }
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<(), AppError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await?;

        if !response.status_code().is_success() {
            let error_body: Value = response.json().await?;
            return Err(AppError::Provisioning(format!(
                "failed to delete index '{index}': {}",
                error_body["error"]
            )));
        }
        Ok(())
    }

    async fn bulk_write(
        &self,
        index: &str,
        documents: Vec<Value>,
    ) -> Result<BulkSummary, AppError> {
        let submitted = documents.len();
        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(bulk_body(documents))
            .send()
            .await
            .map_err(|e| AppError::SinkWrite(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::SinkWrite(format!("status {status}: {body}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::SinkWrite(format!("failed to read bulk response: {e}")))?;

        let summary = summarize(&body, submitted);
        if summary.failed > 0
            && let Some(reason) = first_error_reason(&body)
        {
            tracing::debug!("First bulk item error: {reason}");
        }
        Ok(summary)
    }
}
