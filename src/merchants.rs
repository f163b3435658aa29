//! Approved merchant list and source-label normalization

use tracing::debug;

use crate::models::ProductRecord;

/// Lowercase label fragment to canonical display name.
///
/// Matching walks this slice in order and stops at the first key contained
/// in the label, so the order here decides ties.
pub const APPROVED_MERCHANTS: &[(&str, &str)] = &[
    ("amazon", "Amazon"),
    ("flipkart", "Flipkart"),
    ("meesho", "Meesho"),
    ("snapdeal", "Snapdeal"),
    ("walmart", "Walmart"),
    ("reliancedigital", "Reliance Digital"),
    ("ajio", "AJIO"),
    ("tatacliq", "Tata Cliq"),
    ("myntra", "Myntra"),
    ("shopclues", "ShopClues"),
    ("croma", "Croma"),
    ("nykaa", "Nykaa"),
    ("firstcry", "FirstCry"),
    ("paytmmall", "Paytm Mall"),
    ("pepperfry", "Pepperfry"),
    ("bigbasket", "BigBasket"),
    ("jiomart", "JioMart"),
    ("blinkit", "Blinkit"),
    ("purplle", "Purplle"),
    ("lifestylestores", "Lifestyle Stores"),
    ("decathlon", "Decathlon"),
    ("indiamart", "IndiaMART"),
    ("ebay", "eBay"),
    ("aliexpress", "AliExpress"),
    ("bestbuy", "BestBuy"),
    ("homeshop18", "HomeShop18"),
    ("reliancetrends", "Reliance Trends"),
    ("fabindia", "FabIndia"),
    ("maxfashion", "Max Fashion"),
    ("healthkart", "HealthKart"),
    ("lenskart", "Lenskart"),
    ("bewakoof", "Bewakoof"),
    ("chumbak", "Chumbak"),
    ("tata1mg", "Tata 1MG"),
    ("pharmeasy", "PharmEasy"),
    ("apple", "Apple Store"),
];

/// Returns the canonical merchant name for a raw source label, or `None`
/// when the label names no approved merchant.
pub fn normalize_source(raw: &str) -> Option<&'static str> {
    let label = raw.to_lowercase();
    APPROVED_MERCHANTS
        .iter()
        .find(|(key, _)| label.contains(key))
        .map(|(_, canonical)| *canonical)
}

/// Keeps records from approved merchants, rewriting `source` to the
/// canonical name. Order of the survivors is preserved.
pub fn filter_approved(records: Vec<ProductRecord>) -> Vec<ProductRecord> {
    let total = records.len();

    let approved: Vec<ProductRecord> = records
        .into_iter()
        .filter_map(|mut record| {
            if record.name.trim().is_empty() || record.source.trim().is_empty() {
                return None;
            }
            let canonical = normalize_source(&record.source)?;
            record.source = canonical.to_string();
            Some(record)
        })
        .collect();

    debug!(
        "Approved {} of {} records by merchant",
        approved.len(),
        total
    );
    approved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, source: &str) -> ProductRecord {
        ProductRecord {
            name: name.to_string(),
            price: Some("$10".to_string()),
            link: "https://example.com/p".to_string(),
            image: None,
            rating: None,
            description: None,
            source: source.to_string(),
        }
    }

    #[test]
    fn normalize_source_matches_substring_case_insensitively() {
        assert_eq!(normalize_source("amazon.in"), Some("Amazon"));
        assert_eq!(normalize_source("Flipkart Seller"), Some("Flipkart"));
        assert_eq!(normalize_source("www.BestBuy.com"), Some("BestBuy"));
    }

    #[test]
    fn normalize_source_rejects_unknown_label() {
        assert_eq!(normalize_source("randomsite.com"), None);
        assert_eq!(normalize_source(""), None);
    }

    #[test]
    fn normalize_source_uses_declaration_order_for_ties() {
        // "amazon" is declared before "apple", so it wins regardless of position
        assert_eq!(normalize_source("apple products on amazon"), Some("Amazon"));
        // "tatacliq" is declared before "tata1mg"
        assert_eq!(normalize_source("tata1mg via tatacliq"), Some("Tata Cliq"));
    }

    #[test]
    fn merchant_keys_are_lowercase_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for (key, canonical) in APPROVED_MERCHANTS {
            assert_eq!(*key, key.to_lowercase());
            assert!(!canonical.is_empty());
            assert!(seen.insert(*key), "duplicate key {key}");
        }
    }

    #[test]
    fn filter_approved_keeps_order_and_rewrites_source() {
        let records = vec![
            record("A", "flipkart.com"),
            record("B", "randomsite.com"),
            record("C", "Amazon.in - Seller"),
            record("D", "Croma"),
        ];

        let approved = filter_approved(records);
        let pairs: Vec<(&str, &str)> = approved
            .iter()
            .map(|r| (r.name.as_str(), r.source.as_str()))
            .collect();

        assert_eq!(
            pairs,
            vec![("A", "Flipkart"), ("C", "Amazon"), ("D", "Croma")]
        );
    }

    #[test]
    fn filter_approved_drops_blank_name_or_source() {
        let records = vec![
            record("  ", "amazon"),
            record("Phone", ""),
            record("Phone", "walmart"),
        ];

        let approved = filter_approved(records);
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].source, "Walmart");
    }
}
