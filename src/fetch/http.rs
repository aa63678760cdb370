// src/fetch/http.rs
// =============================================================================
// This module fetches pages over HTTP with reqwest.
//
// Key behaviour:
// - One GET per page, with a browser User-Agent and a request timeout
// - Only HTTP 200 counts as success (the site answers 3xx/4xx pages we
//   don't want to scan)
// - reqwest errors are sorted into timeout / network categories so the
//   report can say why a page was skipped
// =============================================================================

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use super::{FetchError, PageFetcher};
use crate::config::FetchOptions;

/// reqwest-backed PageFetcher.
///
/// The inner Client is reused for every request (connection pooling), so
/// build one fetcher per run rather than one per page.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(options: &FetchOptions) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FetchError::InvalidUrl(format!(
                "unsupported scheme '{}' in {}",
                parsed.scheme(),
                url
            )));
        }

        debug!(url, "GET");

        let result = match self.client.get(parsed).send().await {
            Ok(response) => read_response(response).await,
            Err(e) => Err(categorize_error(e)),
        };

        if let Err(ref e) = result {
            warn!(url, error = %e, "fetch failed");
        }
        result
    }
}

async fn read_response(response: reqwest::Response) -> Result<String, FetchError> {
    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::Status(status.as_u16()));
    }

    response.text().await.map_err(categorize_error)
}

// Sorts reqwest errors into the categories the crawler reports.
//
// reqwest errors can happen for many reasons:
// - timeout while connecting or reading the body
// - DNS resolution failure / refused connection
// - TLS certificate issues
// - too many redirects
fn categorize_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        return FetchError::Timeout;
    }

    let message = if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_connect() {
        let text = error.to_string();
        if text.contains("dns") {
            "could not resolve hostname".to_string()
        } else {
            format!("connection failed: {}", text)
        }
    } else {
        error.to_string()
    };

    FetchError::Network(message)
}
