//! SIRI VehicleMonitoring feed (MTA Bus Time JSON flavour).

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use std::time::Duration;

use crate::config::FeedConfig;
use crate::error::AppError;
use crate::models::position::{GeoPoint, VehicleDocument};
use crate::source::PositionSource;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SiriEnvelope {
    siri: Siri,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Siri {
    service_delivery: ServiceDelivery,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ServiceDelivery {
    #[serde(default)]
    vehicle_monitoring_delivery: Vec<VehicleMonitoringDelivery>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct VehicleMonitoringDelivery {
    #[serde(default)]
    vehicle_activity: Vec<VehicleActivity>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VehicleActivity {
    pub recorded_at_time: String,
    pub monitored_vehicle_journey: MonitoredVehicleJourney,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonitoredVehicleJourney {
    pub vehicle_location: VehicleLocation,
    /// Degrees clockwise from north
    pub bearing: f64,
    pub vehicle_ref: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VehicleLocation {
    pub longitude: f64,
    pub latitude: f64,
}

/// Extracts every vehicle activity entry from a SIRI response body.
pub fn parse_vehicle_activity(body: &str) -> Result<Vec<VehicleActivity>, AppError> {
    let envelope: SiriEnvelope = serde_json::from_str(body)
        .map_err(|e| AppError::Fetch(format!("malformed SIRI payload: {e}")))?;

    Ok(envelope
        .siri
        .service_delivery
        .vehicle_monitoring_delivery
        .into_iter()
        .flat_map(|delivery| delivery.vehicle_activity)
        .collect())
}

/// Converts the feed's clockwise-from-north bearing into the heading
/// convention used by the index: `-bearing + 90`.
pub fn correct_bearing(bearing: f64) -> f64 {
    (bearing * -1.0) + 90.0
}

/// Polls the live vehicle feed for `load-vehicles`.
pub struct VehicleFeedSource {
    url: String,
    api_key: String,
    client: ReqwestClient,
}

/// A hung request would stall every later cycle.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

impl VehicleFeedSource {
    pub fn new(config: &FeedConfig) -> Result<Self, AppError> {
        let client = ReqwestClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            client,
        })
    }
}

#[async_trait]
impl PositionSource for VehicleFeedSource {
    type Record = VehicleActivity;
    type Document = VehicleDocument;

    async fn fetch(&self) -> Result<Vec<VehicleActivity>, AppError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("request to {} failed: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(format!("feed returned status {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Fetch(format!("failed to read feed body: {e}")))?;
        parse_vehicle_activity(&body)
    }

    fn transform(&self, record: VehicleActivity) -> VehicleDocument {
        let journey = record.monitored_vehicle_journey;
        VehicleDocument {
            location: GeoPoint {
                lon: journey.vehicle_location.longitude,
                lat: journey.vehicle_location.latitude,
            },
            bearing: correct_bearing(journey.bearing),
            vehicle_ref: journey.vehicle_ref,
            timestamp: record.recorded_at_time,
            index_time: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "Siri": {
            "ServiceDelivery": {
                "ResponseTimestamp": "2020-03-01T12:00:05.000-05:00",
                "VehicleMonitoringDelivery": [{
                    "VehicleActivity": [
                        {
                            "RecordedAtTime": "2020-03-01T12:00:00.000-05:00",
                            "MonitoredVehicleJourney": {
                                "LineRef": "MTA NYCT_M15",
                                "VehicleLocation": { "Longitude": -73.9712, "Latitude": 40.7831 },
                                "Bearing": 270.0,
                                "VehicleRef": "MTA NYCT_6042"
                            }
                        },
                        {
                            "RecordedAtTime": "2020-03-01T12:00:01.000-05:00",
                            "MonitoredVehicleJourney": {
                                "VehicleLocation": { "Longitude": -73.9442, "Latitude": 40.8075 },
                                "Bearing": 45.5,
                                "VehicleRef": "MTA NYCT_7211"
                            }
                        }
                    ]
                }]
            }
        }
    }"#;

    fn source() -> VehicleFeedSource {
        VehicleFeedSource::new(&FeedConfig::default()).unwrap()
    }

    #[test]
    fn parses_nested_vehicle_activity() {
        let activity = parse_vehicle_activity(PAYLOAD).unwrap();
        assert_eq!(activity.len(), 2);
        assert_eq!(activity[0].monitored_vehicle_journey.vehicle_ref, "MTA NYCT_6042");
        assert_eq!(activity[1].recorded_at_time, "2020-03-01T12:00:01.000-05:00");
    }

    #[test]
    fn delivery_without_activity_is_empty() {
        let body = r#"{"Siri": {"ServiceDelivery": {"VehicleMonitoringDelivery": [{}]}}}"#;
        assert!(parse_vehicle_activity(body).unwrap().is_empty());
    }

    #[test]
    fn malformed_payload_is_a_fetch_error() {
        for body in [
            "not json",
            r#"{"Siri": {}}"#,
            r#"{"Siri": {"ServiceDelivery": {"VehicleMonitoringDelivery": [{"VehicleActivity": [{"RecordedAtTime": "x"}]}]}}}"#,
        ] {
            let err = parse_vehicle_activity(body).unwrap_err();
            assert!(matches!(err, AppError::Fetch(_)), "{body}");
        }
    }

    #[test]
    fn bearing_is_mirrored_onto_the_x_axis() {
        assert_eq!(correct_bearing(0.0), 90.0);
        assert_eq!(correct_bearing(90.0), 0.0);
        assert_eq!(correct_bearing(180.0), -90.0);
        assert_eq!(correct_bearing(270.0), -180.0);
        // -180 and 180 are the same heading.
        assert_eq!(correct_bearing(270.0).rem_euclid(360.0), 180.0);
        assert_eq!(correct_bearing(180.0).rem_euclid(360.0), 270.0);
    }

    #[test]
    fn transform_copies_identity_and_timestamp_verbatim() {
        let record = parse_vehicle_activity(PAYLOAD).unwrap().remove(0);
        let before = Utc::now();
        let doc = source().transform(record);

        assert_eq!(doc.location, GeoPoint { lon: -73.9712, lat: 40.7831 });
        assert_eq!(doc.bearing, -180.0);
        assert_eq!(doc.vehicle_ref, "MTA NYCT_6042");
        assert_eq!(doc.timestamp, "2020-03-01T12:00:00.000-05:00");
        assert!(doc.index_time >= before);
    }

    #[test]
    fn document_serializes_with_index_field_names() {
        let record = parse_vehicle_activity(PAYLOAD).unwrap().remove(1);
        let value = serde_json::to_value(source().transform(record)).unwrap();

        assert_eq!(value["location"]["lon"], -73.9442);
        assert_eq!(value["location"]["lat"], 40.8075);
        assert_eq!(value["bearing"], 44.5);
        assert_eq!(value["vehicle_ref"], "MTA NYCT_7211");
        assert_eq!(value["@timestamp"], "2020-03-01T12:00:01.000-05:00");
        assert!(value["index_time"].is_string());
    }
}
