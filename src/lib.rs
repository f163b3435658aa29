//! Product search service: fetches listings from a shopping API or a
//! retailer's own endpoints and normalizes them into one record shape.

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod merchants;
pub mod models;
pub mod search;
pub mod sources;
pub mod traits;

pub use error::{FetchError, SearchError};
pub use models::{ProductListing, ProductRecord, SearchOutcome, SearchStatus};
pub use search::ProductSearch;
