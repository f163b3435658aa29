//! Data models for product records and search outcomes

use serde::Serialize;

pub const PRICE_NOT_AVAILABLE: &str = "Price not available";
pub const NO_IMAGE_AVAILABLE: &str = "No image available";
pub const NO_RATING_AVAILABLE: &str = "No rating available";
pub const NO_DESCRIPTION_AVAILABLE: &str = "No description available";

/// A normalized product produced by the extraction pipeline.
///
/// Optional fields stay `None` until the record is turned into a
/// [`ProductListing`] at the response boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub name: String,
    pub price: Option<String>,
    pub link: String,
    pub image: Option<String>,
    pub rating: Option<String>,
    pub description: Option<String>,
    pub source: String,
}

/// Wire form of a [`ProductRecord`], with sentinels for absent fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductListing {
    pub product_name: String,
    pub price: String,
    pub website_link: String,
    pub image: String,
    pub rating: String,
    pub description: String,
    pub source: String,
}

impl From<ProductRecord> for ProductListing {
    fn from(record: ProductRecord) -> Self {
        Self {
            product_name: record.name,
            price: record
                .price
                .unwrap_or_else(|| PRICE_NOT_AVAILABLE.to_string()),
            website_link: record.link,
            image: record
                .image
                .unwrap_or_else(|| NO_IMAGE_AVAILABLE.to_string()),
            rating: record
                .rating
                .unwrap_or_else(|| NO_RATING_AVAILABLE.to_string()),
            description: record
                .description
                .unwrap_or_else(|| NO_DESCRIPTION_AVAILABLE.to_string()),
            source: record.source,
        }
    }
}

/// Whether the results are live or substituted placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Success,
    DemoData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub query: String,
    pub status: SearchStatus,
    pub message: Option<String>,
    pub results: Vec<ProductRecord>,
}
