use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::error::FetchError;
use crate::traits::{FetchRequest, FetchResponse, Fetcher};

/// [`Fetcher`] backed by a shared `reqwest` client.
///
/// Timeout and size ceiling come from each [`FetchRequest`]; the body is
/// read chunk by chunk so an oversized response is cut off early.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder().build()?;

        Ok(Self { client })
    }
}

fn header_map(request: &FetchRequest) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &request.headers {
        let invalid = || FetchError::InvalidHeader { name: name.clone() };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        let transport = |source: reqwest::Error| FetchError::Transport {
            url: request.url.clone(),
            source,
        };
        let too_large = || FetchError::ResponseTooLarge {
            url: request.url.clone(),
            limit: request.max_bytes,
        };

        let mut response = self
            .client
            .get(&request.url)
            .headers(header_map(request)?)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        if let Some(length) = response.content_length()
            && length > request.max_bytes as u64
        {
            return Err(too_large());
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(transport)? {
            if bytes.len() + chunk.len() > request.max_bytes {
                return Err(too_large());
            }
            bytes.extend_from_slice(&chunk);
        }

        debug!(
            "Fetched {} bytes from {} (status {})",
            bytes.len(),
            request.url,
            status
        );

        Ok(FetchResponse {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
            content_type,
        })
    }
}
