use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    GeoPoint,
    Keyword,
    Double,
    Date,
}

impl FieldType {
    fn mapping(self) -> Value {
        match self {
            // Bad coordinates from the feed should not reject the whole document.
            Self::GeoPoint => json!({ "type": "geo_point", "ignore_malformed": true }),
            Self::Keyword => json!({ "type": "keyword" }),
            Self::Double => json!({ "type": "double" }),
            Self::Date => json!({ "type": "date" }),
        }
    }
}

/// Fixed field mapping of an ingest index. Changing it requires deleting and
/// recreating the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSchema {
    fields: Vec<(&'static str, FieldType)>,
}

impl IndexSchema {
    /// Synthetic waypoints produced by `load-tracks`.
    pub fn tracks() -> Self {
        Self {
            fields: vec![
                ("location", FieldType::GeoPoint),
                ("entity_id", FieldType::Keyword),
                ("azimuth", FieldType::Double),
                ("speed", FieldType::Double),
                ("@timestamp", FieldType::Date),
            ],
        }
    }

    /// Live vehicle positions produced by `load-vehicles`.
    pub fn vehicles() -> Self {
        Self {
            fields: vec![
                ("location", FieldType::GeoPoint),
                ("vehicle_ref", FieldType::Keyword),
                ("bearing", FieldType::Double),
                ("@timestamp", FieldType::Date),
                ("index_time", FieldType::Date),
            ],
        }
    }

    /// Body for the create-index request.
    pub fn index_body(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, field_type)| ((*name).to_string(), field_type.mapping()))
            .collect();

        json!({
            "mappings": {
                "properties": properties
            }
        })
    }
}
