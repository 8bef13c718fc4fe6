use std::sync::Arc;

use crate::config::AppConfig;
use crate::es::client::EsSink;
use crate::es::mapping::IndexSchema;
use crate::ingest::{IngestLoop, Pipeline};
use crate::prompt::RecreateDecision;
use crate::source::PositionSource;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Connects to Elasticsearch, provisions the index and polls `source` forever.
pub async fn run<S: PositionSource>(
    config: &AppConfig,
    source: S,
    schema: IndexSchema,
    decision: &dyn RecreateDecision,
) -> anyhow::Result<()> {
    tracing::info!("Elasticsearch URL: {}", config.elasticsearch.url);
    let sink = Arc::new(EsSink::from_config(&config.elasticsearch)?);

    let ingest = IngestLoop::new(
        source,
        sink,
        config.ingest.index_name.clone(),
        config.ingest.effective_interval(),
    );

    Pipeline::new(ingest, schema).start(decision).await?;
    Ok(())
}
