//! Traits and interfaces for upstream-agnostic product search

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{FetchError, SearchError};
use crate::extract::fill_query;
use crate::models::ProductRecord;

/// A single outbound GET request
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub timeout: Duration,
    pub max_bytes: usize,
}

/// Raw upstream response, status included
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
    pub content_type: Option<String>,
}

/// How the upstream body should be read by the extraction pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Json,
    Html,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turns a non-success status into [`FetchError::UnexpectedStatus`].
    pub fn error_for_status(self, url: &str) -> Result<Self, FetchError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FetchError::UnexpectedStatus {
                status: self.status,
                url: url.to_string(),
            })
        }
    }

    /// Content type decides; without one, a body opening with `{` or `[`
    /// is taken as JSON.
    pub fn content_kind(&self) -> ContentKind {
        match self.content_type.as_deref() {
            Some(ct) if ct.to_ascii_lowercase().contains("json") => ContentKind::Json,
            Some(_) => ContentKind::Html,
            None => match self.body.trim_start().chars().next() {
                Some('{' | '[') => ContentKind::Json,
                _ => ContentKind::Html,
            },
        }
    }
}

/// Outbound HTTP capability used by product sources
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Performs a GET and returns the raw response whatever its status.
    ///
    /// # Errors
    /// Returns [`FetchError`] when the upstream is unreachable, times out,
    /// or sends more than `max_bytes`.
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError>;
}

/// Configuration for a product source
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Display name for the source
    pub name: String,
    /// Origin used to resolve relative product links, if the source has one
    pub base_url: Option<String>,
    /// Human-facing search results URL with a {query} placeholder
    pub search_url_pattern: String,
    /// Timeout and size ceiling for every fetch this source makes
    pub limits: FetchLimits,
}

impl SourceConfig {
    pub fn request(&self, url: String, headers: BTreeMap<String, String>) -> FetchRequest {
        FetchRequest {
            url,
            headers,
            timeout: self.limits.timeout,
            max_bytes: self.limits.max_bytes,
        }
    }
}

/// Bounds applied to each outbound fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    pub timeout: Duration,
    pub max_bytes: usize,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Trait for upstream-specific product sources
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Get the configuration for this source
    fn config(&self) -> &SourceConfig;

    /// Search the upstream for products matching `query`
    ///
    /// # Returns
    /// * `Result<Vec<ProductRecord>, SearchError>` - Normalized records, possibly empty
    async fn search_products(&self, query: &str) -> Result<Vec<ProductRecord>, SearchError>;

    /// Placeholder results shown when live extraction finds nothing and the
    /// demo policy is enabled
    fn demo_results(&self, _query: &str) -> Vec<ProductRecord> {
        Vec::new()
    }

    /// Process a query to create the human-facing search URL
    fn build_search_url(&self, query: &str) -> String {
        fill_query(&self.config().search_url_pattern, query)
    }

    /// Get the user agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
    }
}
