//! Walmart search, read from the retailer's internal endpoints

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::error::{FetchError, SearchError};
use crate::extract::{MappingRules, Pipeline, Strategy, fill_query};
use crate::models::ProductRecord;
use crate::traits::{FetchLimits, FetchResponse, Fetcher, ProductSource, SourceConfig};

pub const WALMART_ORIGIN: &str = "https://www.walmart.com";

const DEMO_SOURCE: &str = "Walmart (Demo Data)";

/// Product source for Walmart.
///
/// Tries the JSON search API first. If that request fails at the transport
/// level, the public search page is fetched once and mined for embedded
/// state, then for item markup.
pub struct WalmartSource {
    fetcher: Arc<dyn Fetcher>,
    config: SourceConfig,
    api_url_pattern: String,
    pipeline: Pipeline,
}

impl WalmartSource {
    pub fn new(fetcher: Arc<dyn Fetcher>, limits: FetchLimits) -> Self {
        Self::with_origin(fetcher, WALMART_ORIGIN, limits)
    }

    /// Same as [`WalmartSource::new`] but against another origin
    pub fn with_origin(fetcher: Arc<dyn Fetcher>, origin: &str, limits: FetchLimits) -> Self {
        let origin = origin.trim_end_matches('/');

        let config = SourceConfig {
            name: "Walmart".to_string(),
            base_url: Some(origin.to_string()),
            search_url_pattern: format!("{origin}/search?q={{query}}"),
            limits,
        };

        let pipeline = Pipeline::new(
            vec![
                Strategy::structured("items"),
                Strategy::Embedded,
                Strategy::Pattern,
            ],
            MappingRules {
                fixed_source: Some(config.name.clone()),
                base_url: config.base_url.clone(),
                require_price: true,
            },
            config.search_url_pattern.clone(),
        );

        Self {
            fetcher,
            api_url_pattern: format!("{origin}/search/api/preso?q={{query}}&page=1&prg=desktop"),
            config,
            pipeline,
        }
    }

    async fn fetch_api(&self, query: &str) -> Result<FetchResponse, FetchError> {
        let url = fill_query(&self.api_url_pattern, query);
        let headers = BTreeMap::from([
            ("User-Agent".to_string(), self.user_agent().to_string()),
            ("Accept".to_string(), "application/json".to_string()),
            ("Accept-Language".to_string(), "en-US,en;q=0.9".to_string()),
            ("Referer".to_string(), self.build_search_url(query)),
            ("Connection".to_string(), "keep-alive".to_string()),
            ("Cache-Control".to_string(), "no-cache".to_string()),
            ("Pragma".to_string(), "no-cache".to_string()),
        ]);

        info!("Requesting: {}", url);
        let request = self.config.request(url, headers);
        let response = self.fetcher.fetch(&request).await?;
        info!("Response status: {}", response.status);
        response.error_for_status(&request.url)
    }

    async fn fetch_search_page(&self, query: &str) -> Result<FetchResponse, FetchError> {
        let url = self.build_search_url(query);
        let headers = BTreeMap::from([
            ("User-Agent".to_string(), self.user_agent().to_string()),
            ("Accept".to_string(), "text/html".to_string()),
            ("Accept-Language".to_string(), "en-US,en;q=0.9".to_string()),
        ]);

        let request = self.config.request(url, headers);
        let response = self.fetcher.fetch(&request).await?;
        response.error_for_status(&request.url)
    }
}

#[async_trait]
impl ProductSource for WalmartSource {
    fn config(&self) -> &SourceConfig {
        &self.config
    }

    async fn search_products(&self, query: &str) -> Result<Vec<ProductRecord>, SearchError> {
        info!("Searching {} for: {}", self.config.name, query);

        let response = match self.fetch_api(query).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Error fetching from {} API: {}", self.config.name, e);
                info!("Trying HTML search page instead");

                self.fetch_search_page(query).await.inspect_err(|e| {
                    error!("Search page fallback also failed: {}", e);
                })?
            }
        };

        let products = self
            .pipeline
            .extract(&response.body, response.content_kind(), query);

        info!("Returning {} formatted products", products.len());
        Ok(products)
    }

    fn demo_results(&self, _query: &str) -> Vec<ProductRecord> {
        let origin = self.config.base_url.as_deref().unwrap_or(WALMART_ORIGIN);

        vec![
            ProductRecord {
                name: "HP 15.6\" FHD Laptop, Intel Core i5-1135G7, 8GB RAM, 256GB SSD, Silver"
                    .to_string(),
                price: Some("$379.00".to_string()),
                link: format!(
                    "{origin}/ip/HP-15-6-FHD-Laptop-Intel-Core-i5-1135G7-8GB-RAM-256GB-SSD-Silver/123456789"
                ),
                image: Some("https://i5.walmartimages.com/asr/sample.jpg".to_string()),
                rating: None,
                description: None,
                source: DEMO_SOURCE.to_string(),
            },
            ProductRecord {
                name: "Lenovo IdeaPad 3i 15.6\" FHD Touch Screen Laptop, Intel Core i3-1115G4, 8GB RAM, 256GB SSD"
                    .to_string(),
                price: Some("$329.00".to_string()),
                link: format!(
                    "{origin}/ip/Lenovo-IdeaPad-3i-15-6-FHD-Touch-Screen-Laptop-Intel-Core-i3-1115G4-8GB-RAM-256GB-SSD/987654321"
                ),
                image: Some("https://i5.walmartimages.com/asr/sample2.jpg".to_string()),
                rating: None,
                description: None,
                source: DEMO_SOURCE.to_string(),
            },
        ]
    }
}
