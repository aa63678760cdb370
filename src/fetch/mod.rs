// src/fetch/mod.rs
// =============================================================================
// This module downloads pages.
//
// The crawler never talks to reqwest directly. It only knows the PageFetcher
// trait, so tests can feed it canned HTML and a different strategy (for
// example a headless browser that clicks "read more" buttons) can be plugged
// in without touching the crawl loop.
//
// Submodules:
// - http: the reqwest-based fetcher used by the CLI
// =============================================================================

mod http;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use http::HttpFetcher;

/// Why a page could not be fetched. None of these stop a crawl.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Server answered with something other than 200
    #[error("HTTP {0}")]
    Status(u16),
    /// Request did not finish within the configured timeout
    #[error("request timed out")]
    Timeout,
    /// Connection, DNS, TLS or body decoding failure
    #[error("network error: {0}")]
    Network(String),
    /// URL could not be parsed or is not http(s)
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Coarse failure category, used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Status,
    Timeout,
    Network,
    InvalidUrl,
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Status(_) => FailureKind::Status,
            FetchError::Timeout => FailureKind::Timeout,
            FetchError::Network(_) => FailureKind::Network,
            FetchError::InvalidUrl(_) => FailureKind::InvalidUrl,
        }
    }
}

/// Anything that can turn a URL into HTML.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

// A shared fetcher is still a fetcher.
#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for std::sync::Arc<T> {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch(url).await
    }
}
