//! Position sources polled by the ingest loop.

pub mod siri;
pub mod tracks;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AppError;

pub use siri::VehicleFeedSource;
pub use tracks::SyntheticTrackSource;

/// Produces raw position records each cycle and maps each one to exactly one
/// index document.
#[async_trait]
pub trait PositionSource: Send + Sync {
    type Record: Send;
    type Document: Serialize + Send;

    /// Records observed since the last call. An error skips the cycle.
    async fn fetch(&self) -> Result<Vec<Self::Record>, AppError>;

    fn transform(&self, record: Self::Record) -> Self::Document;
}
