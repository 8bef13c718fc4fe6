use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Sink unreachable at startup.
    #[error("Cannot reach Elasticsearch: {0}")]
    Connectivity(String),

    /// Index create/delete failed.
    #[error("Index provisioning failed: {0}")]
    Provisioning(String),

    #[error("Feed fetch failed: {0}")]
    Fetch(String),

    #[error("Bulk write failed: {0}")]
    SinkWrite(String),

    #[error("Elasticsearch error: {0}")]
    Elasticsearch(#[from] elasticsearch::Error),
}

impl AppError {
    /// Fatal errors abort startup; everything else is contained within one ingest cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Connectivity(_) | Self::Provisioning(_))
    }
}
