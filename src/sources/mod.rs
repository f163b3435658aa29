//! Upstream product sources

mod serpapi;
mod walmart;

pub use serpapi::{SERPAPI_ENDPOINT, SerpApiSource};
pub use walmart::{WALMART_ORIGIN, WalmartSource};
