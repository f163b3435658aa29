//! Google Shopping results through SerpAPI

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::error::{FetchError, SearchError};
use crate::extract::{MappingRules, Pipeline, Strategy};
use crate::merchants::filter_approved;
use crate::models::ProductRecord;
use crate::traits::{FetchLimits, Fetcher, ProductSource, SourceConfig};

pub const SERPAPI_ENDPOINT: &str = "https://serpapi.com/search";

/// Product source backed by the SerpAPI `google_shopping` engine.
///
/// Results keep the merchant reported by each listing, and only listings
/// from approved merchants are returned.
pub struct SerpApiSource {
    fetcher: Arc<dyn Fetcher>,
    config: SourceConfig,
    endpoint: String,
    api_key: String,
    country: String,
    language: String,
    pipeline: Pipeline,
}

impl SerpApiSource {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        api_key: impl Into<String>,
        limits: FetchLimits,
    ) -> Self {
        let config = SourceConfig {
            name: "Google Shopping".to_string(),
            base_url: None,
            search_url_pattern: "https://www.google.com/search?tbm=shop&q={query}".to_string(),
            limits,
        };

        let pipeline = Pipeline::new(
            vec![Strategy::structured("shopping_results")],
            MappingRules::default(),
            config.search_url_pattern.clone(),
        );

        Self {
            fetcher,
            config,
            endpoint: SERPAPI_ENDPOINT.to_string(),
            api_key: api_key.into(),
            country: "IN".to_string(),
            language: "en".to_string(),
            pipeline,
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the `gl` and `hl` parameters (e.g. "IN", "en")
    #[must_use]
    pub fn with_locale(mut self, country: impl Into<String>, language: impl Into<String>) -> Self {
        self.country = country.into();
        self.language = language.into();
        self
    }

    fn request_url(&self, query: &str) -> String {
        format!(
            "{}?engine=google_shopping&q={}&api_key={}&gl={}&hl={}",
            self.endpoint,
            urlencoding::encode(query),
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.country),
            urlencoding::encode(&self.language),
        )
    }

    /// Errors carry the bare endpoint so the API key never reaches logs or
    /// response bodies.
    fn redact(&self, error: FetchError) -> FetchError {
        match error {
            FetchError::Transport { source, .. } => FetchError::Transport {
                url: self.endpoint.clone(),
                source: source.without_url(),
            },
            FetchError::UnexpectedStatus { status, .. } => FetchError::UnexpectedStatus {
                status,
                url: self.endpoint.clone(),
            },
            FetchError::ResponseTooLarge { limit, .. } => FetchError::ResponseTooLarge {
                url: self.endpoint.clone(),
                limit,
            },
            other @ FetchError::InvalidHeader { .. } => other,
        }
    }
}

#[async_trait]
impl ProductSource for SerpApiSource {
    fn config(&self) -> &SourceConfig {
        &self.config
    }

    async fn search_products(&self, query: &str) -> Result<Vec<ProductRecord>, SearchError> {
        info!("Searching {} for: {}", self.config.name, query);

        let headers = BTreeMap::from([("Accept".to_string(), "application/json".to_string())]);
        let request = self.config.request(self.request_url(query), headers);

        let response = self
            .fetcher
            .fetch(&request)
            .await
            .and_then(|response| response.error_for_status(&self.endpoint))
            .map_err(|e| self.redact(e))?;

        let products = self
            .pipeline
            .extract(&response.body, response.content_kind(), query);
        let found = products.len();
        let approved = filter_approved(products);

        info!(
            "Kept {} of {} products from approved merchants",
            approved.len(),
            found
        );
        Ok(approved)
    }
}
