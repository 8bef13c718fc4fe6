//! Document store abstraction used by provisioning and the ingest loop.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppError;
use crate::es::mapping::IndexSchema;

/// Outcome of a bulk write the store accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkSummary {
    pub submitted: usize,
    /// Items the store rejected individually while accepting the request.
    pub failed: usize,
}

impl BulkSummary {
    pub fn indexed(&self) -> usize {
        self.submitted.saturating_sub(self.failed)
    }
}

/// The search index the ingest programs write to.
///
/// `EsSink` is the production implementation; tests inject in-memory ones.
#[async_trait]
pub trait IndexSink: Send + Sync {
    /// Health check. An error means the store is unreachable.
    async fn ping(&self) -> Result<(), AppError>;

    async fn index_exists(&self, index: &str) -> Result<bool, AppError>;

    async fn create_index(&self, index: &str, schema: &IndexSchema) -> Result<(), AppError>;

    async fn delete_index(&self, index: &str) -> Result<(), AppError>;

    /// Write `documents` to `index` in a single bulk request, preserving order.
    async fn bulk_write(
        &self,
        index: &str,
        documents: Vec<Value>,
    ) -> Result<BulkSummary, AppError>;
}
