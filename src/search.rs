use std::sync::Arc;

use tracing::{info, warn};

use crate::error::SearchError;
use crate::models::{SearchOutcome, SearchStatus};
use crate::traits::ProductSource;

const DEMO_MESSAGE: &str = "Showing demo data. The retailer may be blocking automated access.";

/// Runs a query against the configured source and applies the demo-data
/// policy when nothing comes back.
#[derive(Clone)]
pub struct ProductSearch {
    source: Arc<dyn ProductSource>,
    demo_on_empty: bool,
}

impl ProductSearch {
    pub fn new(source: Arc<dyn ProductSource>, demo_on_empty: bool) -> Self {
        Self {
            source,
            demo_on_empty,
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source.config().name
    }

    pub async fn search(&self, query: &str) -> Result<SearchOutcome, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::MissingQuery);
        }

        info!("Processing search for: {}", query);
        let results = self.source.search_products(query).await?;

        if results.is_empty() && self.demo_on_empty {
            let demo = self.source.demo_results(query);
            if !demo.is_empty() {
                warn!(
                    "No products found on {} - substituting demo data",
                    self.source_name()
                );
                return Ok(SearchOutcome {
                    query: query.to_string(),
                    status: SearchStatus::DemoData,
                    message: Some(DEMO_MESSAGE.to_string()),
                    results: demo,
                });
            }
        }

        if results.is_empty() {
            info!("No products found for: {}", query);
        } else {
            info!("Found {} products for: {}", results.len(), query);
        }

        Ok(SearchOutcome {
            query: query.to_string(),
            status: SearchStatus::Success,
            message: None,
            results,
        })
    }
}
