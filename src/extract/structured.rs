//! Tier A: list of results straight from a JSON API response.

use serde_json::Value;
use tracing::warn;

use super::{RawItem, Tier};

pub(super) fn extract_structured_items(body: &str, list_field: &str) -> Vec<RawItem> {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => items_from_value(&value, list_field),
        Err(e) => {
            warn!("Upstream JSON did not parse: {}", e);
            Vec::new()
        }
    }
}

/// Reads `list_field` from the top-level object. Anything other than an
/// array there yields no items.
pub(super) fn items_from_value(value: &Value, list_field: &str) -> Vec<RawItem> {
    value
        .get(list_field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .cloned()
                .map(|fields| RawItem {
                    tier: Tier::Structured,
                    fields,
                })
                .collect()
        })
        .unwrap_or_default()
}
