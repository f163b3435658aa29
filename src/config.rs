//! Environment-driven configuration

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};

use crate::traits::FetchLimits;

/// Which upstream answers searches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Walmart,
    SerpApi,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "walmart" => Ok(Self::Walmart),
            "serpapi" => Ok(Self::SerpApi),
            other => Err(anyhow!("unknown SEARCH_BACKEND {other:?} (expected walmart or serpapi)")),
        }
    }
}

/// Shape of the JSON body returned by `/search`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStyle {
    /// `{ query, count, status, message?, results }`
    Detailed,
    /// `{ results }`
    Bare,
}

impl FromStr for ResponseStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detailed" => Ok(Self::Detailed),
            "bare" => Ok(Self::Bare),
            other => Err(anyhow!("unknown RESPONSE_STYLE {other:?} (expected detailed or bare)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend: Backend,
    pub serpapi_key: Option<String>,
    pub serpapi_country: String,
    pub serpapi_language: String,
    pub response_style: ResponseStyle,
    pub demo_on_empty: bool,
    pub fetch_limits: FetchLimits,
    pub log_level: String,
}

impl Config {
    /// Reads the process environment (after `.env` has been loaded)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let backend = match get("SEARCH_BACKEND") {
            Some(raw) => raw.parse()?,
            None => Backend::Walmart,
        };

        let serpapi_key = get("SERPAPI_KEY");
        if backend == Backend::SerpApi && serpapi_key.is_none() {
            bail!("SERPAPI_KEY is required when SEARCH_BACKEND=serpapi");
        }

        let response_style = match get("RESPONSE_STYLE") {
            Some(raw) => raw.parse()?,
            None => match backend {
                Backend::Walmart => ResponseStyle::Detailed,
                Backend::SerpApi => ResponseStyle::Bare,
            },
        };

        let demo_on_empty = match get("DEMO_DATA_ON_EMPTY") {
            Some(raw) => parse_bool("DEMO_DATA_ON_EMPTY", &raw)?,
            None => backend == Backend::Walmart,
        };

        let defaults = FetchLimits::default();
        let timeout = match get("FETCH_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(
                raw.trim()
                    .parse()
                    .with_context(|| format!("FETCH_TIMEOUT_MS is not a number: {raw}"))?,
            ),
            None => defaults.timeout,
        };
        let max_bytes = match get("FETCH_MAX_BYTES") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("FETCH_MAX_BYTES is not a number: {raw}"))?,
            None => defaults.max_bytes,
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port: {raw}"))?,
            None => 3000,
        };

        Ok(Self {
            port,
            backend,
            serpapi_key,
            serpapi_country: get("SERPAPI_COUNTRY").unwrap_or_else(|| "IN".to_string()),
            serpapi_language: get("SERPAPI_LANGUAGE").unwrap_or_else(|| "en".to_string()),
            response_style,
            demo_on_empty,
            fetch_limits: FetchLimits { timeout, max_bytes },
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("{key} must be true or false, got {raw:?}"),
    }
}
