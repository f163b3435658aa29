//! Field mapping from raw upstream items to [`ProductRecord`].
//!
//! Each field is looked up through a fixed list of JSON pointers, tried in
//! order; the first usable value wins.

use serde_json::{Number, Value};
use url::Url;

use super::{RawItem, Tier};
use crate::models::ProductRecord;

const NAME_FIELDS: &[&str] = &["/title", "/productName", "/name", "/product_name"];

const PRICE_TEXT_FIELDS: &[&str] = &[
    "/price",
    "/price/priceString",
    "/priceInfo/priceString",
    "/priceString",
];

const PRICE_AMOUNT_FIELDS: &[&str] = &[
    "/extracted_price",
    "/price",
    "/price/currentPrice",
    "/priceInfo/currentPrice",
    "/priceInfo/currentPrice/price",
];

const LINK_FIELDS: &[&str] = &["/link", "/product_link", "/canonicalUrl", "/productPageUrl"];

const IMAGE_FIELDS: &[&str] = &["/thumbnail", "/imageUrl", "/image", "/imageInfo/thumbnailUrl"];

/// Some retailer payloads wrap the product under this key.
const WRAPPED_PRODUCT_FIELD: &str = "productDataShaped";

/// Appended to the source label of pattern-tier records.
pub const LOW_CONFIDENCE_MARKER: &str = " (Basic)";

/// Per-source rules applied while mapping
#[derive(Debug, Clone, Default)]
pub struct MappingRules {
    /// Source label for every record; `None` reads the item's own `source`
    pub fixed_source: Option<String>,
    /// Origin that relative links and images are resolved against
    pub base_url: Option<String>,
    /// Drop records that carry no price at all
    pub require_price: bool,
}

/// Maps one raw item, or returns `None` when it lacks a name, a source,
/// or a required price.
pub fn map_item(item: &RawItem, rules: &MappingRules, fallback_link: &str) -> Option<ProductRecord> {
    let body = match item.fields.get(WRAPPED_PRODUCT_FIELD) {
        Some(inner) if inner.is_object() => inner,
        _ => &item.fields,
    };

    let name = first_text(body, NAME_FIELDS)?;

    let source = match (&rules.fixed_source, item.tier) {
        (Some(fixed), Tier::Pattern) => format!("{fixed}{LOW_CONFIDENCE_MARKER}"),
        (Some(fixed), _) => fixed.clone(),
        (None, _) => first_text(body, &["/source"])?,
    };
    if source.trim().is_empty() {
        return None;
    }

    let price = price_display(body);
    if rules.require_price && price.is_none() {
        return None;
    }

    let base_url = rules.base_url.as_deref();
    let link = first_text(body, LINK_FIELDS)
        .and_then(|raw| resolve_url(&raw, base_url))
        .unwrap_or_else(|| fallback_link.to_string());
    let image = first_text(body, IMAGE_FIELDS).and_then(|raw| resolve_url(&raw, base_url));

    let rating = body.get("rating").and_then(|value| match value {
        Value::Number(n) => Some(render_amount(n)),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    });
    let description = first_text(body, &["/description"]);

    Some(ProductRecord {
        name,
        price,
        link,
        image,
        rating,
        description,
        source,
    })
}

fn first_text(body: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .filter_map(|pointer| body.pointer(pointer).and_then(Value::as_str))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

/// Pre-formatted price strings win over raw amounts.
fn price_display(body: &Value) -> Option<String> {
    if let Some(text) = first_text(body, PRICE_TEXT_FIELDS) {
        return Some(text);
    }

    PRICE_AMOUNT_FIELDS
        .iter()
        .filter_map(|pointer| body.pointer(pointer))
        .find_map(|value| match value {
            Value::Number(n) => Some(render_amount(n)),
            Value::String(s) if s.trim().parse::<f64>().is_ok() => Some(s.trim().to_string()),
            _ => None,
        })
        .map(|amount| format!("${amount}"))
}

/// Whole amounts render without a fractional part: `379`, `379.5`.
fn render_amount(n: &Number) -> String {
    if let Some(int) = n.as_i64() {
        return int.to_string();
    }
    match n.as_f64() {
        Some(float) if float.fract() == 0.0 && float.abs() < 1e15 => format!("{float:.0}"),
        Some(float) => float.to_string(),
        None => n.to_string(),
    }
}

/// Absolute URLs pass through; protocol-relative ones get `https:`;
/// relative paths are joined onto `base_url` when there is one. Anything
/// that is not `http`/`https` (`javascript:`, `mailto:`) yields `None`.
pub fn resolve_url(raw: &str, base_url: Option<&str>) -> Option<String> {
    if raw.starts_with("//") {
        return Some(format!("https:{raw}"));
    }

    let resolved = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => match base_url.and_then(|base| Url::parse(base).ok()) {
            Some(base) => base.join(raw).ok()?,
            // Without an origin the path is kept as given
            None => return Some(raw.to_string()),
        },
    };

    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const FALLBACK: &str = "https://www.walmart.com/search?q=laptop";

    fn item(tier: Tier, fields: Value) -> RawItem {
        RawItem { tier, fields }
    }

    fn retailer_rules() -> MappingRules {
        MappingRules {
            fixed_source: Some("Walmart".to_string()),
            base_url: Some("https://www.walmart.com".to_string()),
            require_price: true,
        }
    }

    #[test]
    fn shopping_result_maps_fields_verbatim() {
        let raw = item(
            Tier::Structured,
            json!({"title": "X", "source": "amazon", "price": "$10", "link": "/x", "thumbnail": "i.png"}),
        );

        let record = map_item(&raw, &MappingRules::default(), FALLBACK).unwrap();
        assert_eq!(record.name, "X");
        assert_eq!(record.source, "amazon");
        assert_eq!(record.price.as_deref(), Some("$10"));
        assert_eq!(record.link, "/x");
        assert_eq!(record.image.as_deref(), Some("i.png"));
        assert_eq!(record.rating, None);
        assert_eq!(record.description, None);
    }

    #[test]
    fn wrapped_retailer_item_resolves_link_and_synthesizes_price() {
        let raw = item(
            Tier::Structured,
            json!({"productDataShaped": {
                "productName": "HP Laptop",
                "priceInfo": {"currentPrice": 379},
                "canonicalUrl": "/ip/HP-Laptop/123",
                "imageInfo": {"thumbnailUrl": "https://i5.walmartimages.com/1.jpg"}
            }}),
        );

        let record = map_item(&raw, &retailer_rules(), FALLBACK).unwrap();
        assert_eq!(record.name, "HP Laptop");
        assert_eq!(record.price.as_deref(), Some("$379"));
        assert_eq!(record.link, "https://www.walmart.com/ip/HP-Laptop/123");
        assert_eq!(
            record.image.as_deref(),
            Some("https://i5.walmartimages.com/1.jpg")
        );
        assert_eq!(record.source, "Walmart");
    }

    #[test]
    fn embedded_item_prefers_price_string() {
        let raw = item(
            Tier::Embedded,
            json!({"name": "Lenovo", "price": {"priceString": "$329.00", "currentPrice": 329}}),
        );

        let record = map_item(&raw, &retailer_rules(), FALLBACK).unwrap();
        assert_eq!(record.price.as_deref(), Some("$329.00"));
        assert_eq!(record.link, FALLBACK);
    }

    #[test]
    fn fractional_and_string_amounts_render() {
        let float = item(Tier::Embedded, json!({"name": "A", "price": {"currentPrice": 12.5}}));
        let whole = item(Tier::Embedded, json!({"name": "B", "price": {"currentPrice": 40.0}}));
        let text = item(Tier::Embedded, json!({"name": "C", "priceInfo": {"currentPrice": "7.99"}}));

        let rules = retailer_rules();
        assert_eq!(map_item(&float, &rules, FALLBACK).unwrap().price.as_deref(), Some("$12.5"));
        assert_eq!(map_item(&whole, &rules, FALLBACK).unwrap().price.as_deref(), Some("$40"));
        assert_eq!(map_item(&text, &rules, FALLBACK).unwrap().price.as_deref(), Some("$7.99"));
    }

    #[test]
    fn name_aliases_follow_priority() {
        let raw = item(
            Tier::Structured,
            json!({"name": "second", "title": "  ", "productName": "first", "source": "ebay"}),
        );
        let record = map_item(&raw, &MappingRules::default(), FALLBACK).unwrap();
        assert_eq!(record.name, "first");
    }

    #[test]
    fn item_without_any_name_is_dropped() {
        let raw = item(
            Tier::Structured,
            json!({"source": "amazon", "price": "$10", "label": "Laptop"}),
        );
        assert!(map_item(&raw, &MappingRules::default(), FALLBACK).is_none());
    }

    #[test]
    fn item_without_source_is_dropped_when_source_not_fixed() {
        let raw = item(Tier::Structured, json!({"title": "X", "source": ""}));
        assert!(map_item(&raw, &MappingRules::default(), FALLBACK).is_none());
    }

    #[test]
    fn required_price_drops_priceless_items() {
        let raw = item(Tier::Embedded, json!({"name": "No price", "price": {"currentPrice": null}}));
        assert!(map_item(&raw, &retailer_rules(), FALLBACK).is_none());

        let lenient = MappingRules {
            require_price: false,
            ..retailer_rules()
        };
        let record = map_item(&raw, &lenient, FALLBACK).unwrap();
        assert_eq!(record.price, None);
    }

    #[test]
    fn pattern_tier_marks_source_as_low_confidence() {
        let raw = item(Tier::Pattern, json!({"name": "Mug", "price": "$7.50"}));
        let record = map_item(&raw, &retailer_rules(), FALLBACK).unwrap();
        assert_eq!(record.source, "Walmart (Basic)");
    }

    #[test]
    fn rating_accepts_numbers_and_strings() {
        let numeric = item(Tier::Structured, json!({"title": "A", "source": "croma", "rating": 4.5}));
        let text = item(Tier::Structured, json!({"title": "B", "source": "croma", "rating": "4"}));

        let rules = MappingRules::default();
        assert_eq!(map_item(&numeric, &rules, FALLBACK).unwrap().rating.as_deref(), Some("4.5"));
        assert_eq!(map_item(&text, &rules, FALLBACK).unwrap().rating.as_deref(), Some("4"));
    }

    #[test]
    fn resolve_url_handles_each_form() {
        let base = Some("https://www.walmart.com");
        assert_eq!(resolve_url("https://a.com/x", base).as_deref(), Some("https://a.com/x"));
        assert_eq!(
            resolve_url("//cdn.a.com/i.jpg", base).as_deref(),
            Some("https://cdn.a.com/i.jpg")
        );
        assert_eq!(
            resolve_url("/ip/1", base).as_deref(),
            Some("https://www.walmart.com/ip/1")
        );
        assert_eq!(resolve_url("/ip/1", None).as_deref(), Some("/ip/1"));
    }

    #[test]
    fn resolve_url_rejects_non_web_schemes() {
        let base = Some("https://www.walmart.com");
        assert_eq!(resolve_url("javascript:void(0)", base), None);
        assert_eq!(resolve_url("javascript:void(0)", None), None);
        assert_eq!(resolve_url("mailto:help@walmart.com", base), None);
    }

    #[test]
    fn placeholder_links_fall_back_to_search_page() {
        let script = item(
            Tier::Pattern,
            json!({"name": "Lamp", "price": "$9.99", "link": "javascript:void(0)"}),
        );
        let mail = item(
            Tier::Structured,
            json!({"title": "Mug", "source": "ebay", "link": "mailto:seller@example.com", "thumbnail": "javascript:0"}),
        );

        let record = map_item(&script, &retailer_rules(), FALLBACK).unwrap();
        assert_eq!(record.link, FALLBACK);

        let record = map_item(&mail, &MappingRules::default(), FALLBACK).unwrap();
        assert_eq!(record.link, FALLBACK);
        assert_eq!(record.image, None);
    }
}
