use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `geo_point` in object form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

/// One synthetic waypoint along a track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackWaypoint {
    pub location: GeoPoint,
    pub entity_id: String,
    /// Degrees
    pub azimuth: f64,
    /// Miles per hour
    pub speed: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackDocument {
    pub location: GeoPoint,
    pub entity_id: String,
    pub azimuth: f64,
    pub speed: f64,
    #[serde(rename = "@timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl From<TrackWaypoint> for TrackDocument {
    fn from(waypoint: TrackWaypoint) -> Self {
        Self {
            location: waypoint.location,
            entity_id: waypoint.entity_id,
            azimuth: waypoint.azimuth,
            speed: waypoint.speed,
            timestamp: waypoint.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleDocument {
    pub location: GeoPoint,
    pub bearing: f64,
    pub vehicle_ref: String,
    /// Upstream `RecordedAtTime`, kept as sent
    #[serde(rename = "@timestamp")]
    pub timestamp: String,
    pub index_time: DateTime<Utc>,
}
