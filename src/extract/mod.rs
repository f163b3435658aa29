//! # Tiered product extraction
//!
//! Turns a raw upstream payload into [`ProductRecord`]s. A [`Pipeline`]
//! holds an ordered list of [`Strategy`] tiers and tries each one that
//! applies to the payload's [`ContentKind`], stopping at the first tier that
//! produces results:
//!
//! - **Structured**: a list field of a JSON API response
//! - **Embedded**: page state serialized into a `<script>` block
//! - **Pattern**: item containers matched in otherwise unstructured HTML
//!
//! No tier ever fails the request. A tier that finds nothing, or whose
//! input does not parse, hands over to the next one.

mod embedded;
mod mapping;
mod pattern;
mod structured;

use serde_json::Value;
use tracing::{debug, info};

use crate::models::ProductRecord;
use crate::traits::ContentKind;

pub use embedded::sanitize_state;
pub use mapping::{LOW_CONFIDENCE_MARKER, MappingRules, map_item, resolve_url};
pub use pattern::MAX_PATTERN_ITEMS;

/// Which extraction tier produced an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Structured,
    Embedded,
    Pattern,
}

/// An untyped upstream item, tagged with its tier
#[derive(Debug, Clone, PartialEq)]
pub struct RawItem {
    pub tier: Tier,
    pub fields: Value,
}

/// One extraction tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Read the array under `list_field` of a JSON object
    Structured { list_field: String },
    /// Parse `window.__PRELOADED_STATE__` and flatten its item stacks
    Embedded,
    /// Scan `data-item-id` containers for a title and a price
    Pattern,
}

impl Strategy {
    pub fn structured(list_field: impl Into<String>) -> Self {
        Self::Structured {
            list_field: list_field.into(),
        }
    }

    pub fn tier(&self) -> Tier {
        match self {
            Self::Structured { .. } => Tier::Structured,
            Self::Embedded => Tier::Embedded,
            Self::Pattern => Tier::Pattern,
        }
    }

    pub fn applies_to(&self, kind: ContentKind) -> bool {
        match self {
            Self::Structured { .. } => kind == ContentKind::Json,
            Self::Embedded | Self::Pattern => kind == ContentKind::Html,
        }
    }

    /// Runs this tier alone. Never fails; an empty vector means "nothing here".
    pub fn try_extract(&self, content: &str) -> Vec<RawItem> {
        match self {
            Self::Structured { list_field } => {
                structured::extract_structured_items(content, list_field)
            }
            Self::Embedded => embedded::extract_embedded_items(content),
            Self::Pattern => pattern::extract_pattern_items(content),
        }
    }
}

/// Ordered tiers plus the mapping rules of one source
#[derive(Debug, Clone)]
pub struct Pipeline {
    strategies: Vec<Strategy>,
    rules: MappingRules,
    search_url_pattern: String,
}

impl Pipeline {
    pub fn new(strategies: Vec<Strategy>, rules: MappingRules, search_url_pattern: String) -> Self {
        Self {
            strategies,
            rules,
            search_url_pattern,
        }
    }

    /// Raw items from the first applicable tier that yields any.
    pub fn raw_items(&self, content: &str, kind: ContentKind) -> Vec<RawItem> {
        for strategy in self.strategies.iter().filter(|s| s.applies_to(kind)) {
            let items = strategy.try_extract(content);
            if !items.is_empty() {
                return items;
            }
            debug!("{:?} tier yielded no items", strategy.tier());
        }
        Vec::new()
    }

    /// Mapped records from the first applicable tier whose items survive
    /// mapping. Items without a usable name or source never come out.
    pub fn extract(&self, content: &str, kind: ContentKind, query: &str) -> Vec<ProductRecord> {
        let fallback_link = fill_query(&self.search_url_pattern, query);

        for strategy in self.strategies.iter().filter(|s| s.applies_to(kind)) {
            let items = strategy.try_extract(content);
            let records: Vec<ProductRecord> = items
                .iter()
                .filter_map(|item| map_item(item, &self.rules, &fallback_link))
                .collect();

            if !records.is_empty() {
                info!(
                    "Extracted {} products from {} items using {:?} tier",
                    records.len(),
                    items.len(),
                    strategy.tier()
                );
                return records;
            }
            debug!(
                "{:?} tier produced no usable products ({} raw items)",
                strategy.tier(),
                items.len()
            );
        }

        Vec::new()
    }
}

/// Substitutes the percent-encoded query into a `{query}` pattern.
pub fn fill_query(pattern: &str, query: &str) -> String {
    pattern.replace("{query}", &urlencoding::encode(query))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PATTERN: &str = "https://www.walmart.com/search?q={query}";

    fn retailer_pipeline() -> Pipeline {
        Pipeline::new(
            vec![Strategy::structured("items"), Strategy::Embedded, Strategy::Pattern],
            MappingRules {
                fixed_source: Some("Walmart".to_string()),
                base_url: Some("https://www.walmart.com".to_string()),
                require_price: true,
            },
            SEARCH_PATTERN.to_string(),
        )
    }

    fn shopping_pipeline() -> Pipeline {
        Pipeline::new(
            vec![Strategy::structured("shopping_results")],
            MappingRules::default(),
            "https://www.google.com/search?tbm=shop&q={query}".to_string(),
        )
    }

    const STATE_PAGE: &str = r#"<html><script>window.__PRELOADED_STATE__ = {"search":{"searchResult":{"itemStacks":[{"items":[{"name":"Embedded Laptop","price":{"priceString":"$499.00"},"canonicalUrl":"/ip/2"}]}]}}};</script>
        <div data-item-id="9"><span>Pattern Laptop</span> $1.00</div></html>"#;

    #[test]
    fn json_content_uses_structured_tier_only() {
        let body = r#"{"items":[{"productDataShaped":{"productName":"HP","priceInfo":{"currentPrice":379}}}]}"#;
        let records = retailer_pipeline().extract(body, ContentKind::Json, "laptop");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "HP");
        assert_eq!(records[0].link, "https://www.walmart.com/search?q=laptop");
    }

    #[test]
    fn html_prefers_embedded_over_pattern() {
        let records = retailer_pipeline().extract(STATE_PAGE, ContentKind::Html, "laptop");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Embedded Laptop");
        assert_eq!(records[0].source, "Walmart");
        assert_eq!(records[0].link, "https://www.walmart.com/ip/2");
    }

    #[test]
    fn html_falls_back_to_pattern_when_state_is_broken() {
        let page = STATE_PAGE.replace(r#""itemStacks":["#, r#""itemStacks":[oops,"#);
        let records = retailer_pipeline().extract(&page, ContentKind::Html, "gaming laptop");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Pattern Laptop");
        assert_eq!(records[0].source, "Walmart (Basic)");
        assert_eq!(records[0].link, "https://www.walmart.com/search?q=gaming%20laptop");
    }

    #[test]
    fn embedded_items_without_names_fall_through_to_pattern() {
        let page = STATE_PAGE.replace(r#""name":"Embedded Laptop","#, "");
        assert_eq!(
            retailer_pipeline().raw_items(&page, ContentKind::Html)[0].tier,
            Tier::Embedded
        );
        let records = retailer_pipeline().extract(&page, ContentKind::Html, "laptop");
        assert_eq!(records[0].name, "Pattern Laptop");
    }

    #[test]
    fn structured_tier_does_not_run_on_html() {
        let records = shopping_pipeline().extract(
            r#"<html>{"shopping_results":[{"title":"X","source":"amazon"}]}</html>"#,
            ContentKind::Html,
            "x",
        );
        assert!(records.is_empty());
    }

    #[test]
    fn nothing_found_anywhere_yields_empty() {
        let pipeline = retailer_pipeline();
        assert!(pipeline.extract("<html>Robot check</html>", ContentKind::Html, "laptop").is_empty());
        assert!(pipeline.extract("{}", ContentKind::Json, "laptop").is_empty());
        assert!(pipeline.raw_items("garbage", ContentKind::Json).is_empty());
    }

    #[test]
    fn extraction_never_panics_on_odd_input() {
        let pipeline = retailer_pipeline();
        for content in ["", "null", "[]", "<", "{\"items\":null}", "window.__PRELOADED_STATE__ = {;</script>"] {
            for kind in [ContentKind::Json, ContentKind::Html] {
                assert!(pipeline.extract(content, kind, "q").is_empty());
            }
        }
    }

    #[test]
    fn fill_query_percent_encodes() {
        assert_eq!(
            fill_query(SEARCH_PATTERN, "4k tv & stand"),
            "https://www.walmart.com/search?q=4k%20tv%20%26%20stand"
        );
    }
}
