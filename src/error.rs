use thiserror::Error;

/// Failure of a single outbound fetch.
///
/// Every variant counts as a transport failure for the fallback logic in
/// [`crate::sources`]: unreachable, timed out, non-success, or oversized.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("response from {url} exceeded {limit} bytes")]
    ResponseTooLarge { url: String, limit: usize },

    #[error("invalid request header {name}")]
    InvalidHeader { name: String },
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search query is required")]
    MissingQuery,

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
