use crate::error::AppError;
use crate::es::mapping::IndexSchema;
use crate::prompt::RecreateDecision;
use crate::sink::IndexSink;

/// State the index was left in by [`ensure_index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    Created,
    Recreated,
    Retained,
}

/// Makes sure `index` exists with `schema` before ingestion starts.
///
/// An existing index is only dropped when `decision` says so. Delete and
/// create are separate calls: if creation fails after a delete, the index
/// stays gone and the error is returned.
pub async fn ensure_index(
    sink: &dyn IndexSink,
    index: &str,
    schema: &IndexSchema,
    decision: &dyn RecreateDecision,
) -> Result<Provisioned, AppError> {
    if let Err(e) = sink.ping().await {
        tracing::error!("Cannot reach Elasticsearch: {e}");
        return Err(match e {
            AppError::Connectivity(_) => e,
            other => AppError::Connectivity(other.to_string()),
        });
    }

    let exists = sink.index_exists(index).await.map_err(provisioning)?;

    if !exists {
        create(sink, index, schema).await?;
        return Ok(Provisioned::Created);
    }

    if !decision.should_recreate(index).await {
        tracing::info!("Retaining existing index '{index}'");
        return Ok(Provisioned::Retained);
    }

    tracing::info!("Deleting index '{index}'");
    sink.delete_index(index).await.map_err(provisioning)?;
    if let Err(e) = create(sink, index, schema).await {
        tracing::error!("Index '{index}' was deleted but could not be recreated");
        return Err(e);
    }
    Ok(Provisioned::Recreated)
}

async fn create(sink: &dyn IndexSink, index: &str, schema: &IndexSchema) -> Result<(), AppError> {
    tracing::info!("Create index '{index}'");
    sink.create_index(index, schema)
        .await
        .map_err(provisioning)
}

fn provisioning(e: AppError) -> AppError {
    match e {
        AppError::Provisioning(_) => e,
        other => AppError::Provisioning(other.to_string()),
    }
}
