//! Tier B: serialized page state embedded in a `<script>` block.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use super::{RawItem, Tier};

static PRELOADED_STATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<script[^>]*>\s*window\.__PRELOADED_STATE__\s*=\s*(\{.*?\})\s*;\s*</script>")
        .expect("valid preloaded state regex")
});

const ITEM_STACKS_POINTER: &str = "/search/searchResult/itemStacks";

/// JavaScript literals that appear in the state blob but are not JSON.
const NON_JSON_TOKENS: &[&str] = &["undefined", "NaN"];

pub(super) fn extract_embedded_items(html: &str) -> Vec<RawItem> {
    let Some(blob) = PRELOADED_STATE_RE.captures(html).and_then(|c| c.get(1)) else {
        debug!("No preloaded state block in page");
        return Vec::new();
    };

    let cleaned = sanitize_state(blob.as_str());
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(state) => items_from_state(&state),
        Err(e) => {
            warn!("Error parsing embedded JSON: {}", e);
            Vec::new()
        }
    }
}

/// Flattens `search.searchResult.itemStacks[*].items` into one list.
pub(super) fn items_from_state(state: &Value) -> Vec<RawItem> {
    let Some(stacks) = state.pointer(ITEM_STACKS_POINTER).and_then(Value::as_array) else {
        debug!("Preloaded state has no item stacks");
        return Vec::new();
    };

    stacks
        .iter()
        .filter_map(|stack| stack.get("items").and_then(Value::as_array))
        .flatten()
        .cloned()
        .map(|fields| RawItem {
            tier: Tier::Embedded,
            fields,
        })
        .collect()
}

/// Rewrites bare `undefined` and `NaN` tokens to `null`.
///
/// String literals are copied through untouched, so a product called
/// "NaN Cookbook" keeps its name.
pub fn sanitize_state(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.char_indices().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some((idx, ch)) = chars.next() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
            out.push(ch);
            continue;
        }

        if is_identifier_char(ch) {
            let end = raw[idx..]
                .find(|c: char| !is_identifier_char(c))
                .map_or(raw.len(), |offset| idx + offset);
            let word = &raw[idx..end];
            if NON_JSON_TOKENS.contains(&word) {
                out.push_str("null");
            } else {
                out.push_str(word);
            }
            while chars.next_if(|(i, _)| *i < end).is_some() {}
            continue;
        }

        out.push(ch);
    }

    out
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}
