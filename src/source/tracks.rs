use async_trait::async_trait;

use crate::error::AppError;
use crate::models::position::{TrackDocument, TrackWaypoint};
use crate::source::PositionSource;

/// Synthetic track source for `load-tracks`.
///
/// Waypoint generation along tracks is not implemented: every cycle yields no
/// records, so nothing is written. The index and loop are still provisioned
/// and driven so a generator can be plugged in here.
#[derive(Debug, Default)]
pub struct SyntheticTrackSource;

#[async_trait]
impl PositionSource for SyntheticTrackSource {
    type Record = TrackWaypoint;
    type Document = TrackDocument;

    async fn fetch(&self) -> Result<Vec<TrackWaypoint>, AppError> {
        tracing::debug!("Waypoint generation is not implemented, producing no waypoints");
        Ok(Vec::new())
    }

    fn transform(&self, record: TrackWaypoint) -> TrackDocument {
        record.into()
    }
}
