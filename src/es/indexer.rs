use elasticsearch::http::request::JsonBody;
use serde_json::{Value, json};

use crate::sink::BulkSummary;

/// Flat bulk body: one action line followed by the document, per document.
/// The target index comes from the request path, so the action carries no metadata.
pub fn bulk_body(documents: Vec<Value>) -> Vec<JsonBody<Value>> {
    let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);
    for doc in documents {
        // Action line
        body.push(json!({"index": {}}).into());
        // Document line
        body.push(doc.into());
    }
    body
}

/// Counts per-item failures in an accepted bulk response.
pub fn summarize(response: &Value, submitted: usize) -> BulkSummary {
    if !response["errors"].as_bool().unwrap_or(false) {
        return BulkSummary {
            submitted,
            failed: 0,
        };
    }

    let failed = response["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter(|item| item["index"]["error"].is_object())
                .count()
        })
        .unwrap_or_default();

    BulkSummary { submitted, failed }
}

/// First per-item error reason, for log context.
pub fn first_error_reason(response: &Value) -> Option<String> {
    response["items"].as_array()?.iter().find_map(|item| {
        item["index"]["error"]["reason"]
            .as_str()
            .map(String::from)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulk_body_interleaves_actions_and_documents() {
        let docs = vec![json!({"vehicle_ref": "A"}), json!({"vehicle_ref": "B"})];
        assert_eq!(bulk_body(docs).len(), 4);
        assert!(bulk_body(Vec::new()).is_empty());
    }

    #[test]
    fn summary_without_errors_counts_everything_indexed() {
        let response = json!({"errors": false, "items": [{"index": {"status": 201}}]});
        let summary = summarize(&response, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.indexed(), 1);
    }

    #[test]
    fn summary_counts_failed_items() {
        let response = json!({
            "errors": true,
            "items": [
                {"index": {"status": 201}},
                {"index": {"status": 400, "error": {"type": "mapper_parsing_exception", "reason": "failed to parse field [location]"}}},
                {"index": {"status": 201}}
            ]
        });
        let summary = summarize(&response, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.indexed(), 2);
        assert_eq!(
            first_error_reason(&response).as_deref(),
            Some("failed to parse field [location]")
        );
    }
}
