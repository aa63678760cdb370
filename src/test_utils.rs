// src/test_utils.rs
// In-memory PageFetcher for tests: no network, and it remembers how often
// each URL was requested.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::fetch::{FetchError, PageFetcher};

#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, Result<String, FetchError>>,
    hits: Mutex<HashMap<String, usize>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `html` for `url`.
    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(html.to_string()));
        self
    }

    /// Makes `url` fail with `error`.
    pub fn failing(mut self, url: &str, error: FetchError) -> Self {
        self.pages.insert(url.to_string(), Err(error));
        self
    }

    pub fn hits(&self, url: &str) -> usize {
        self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        *self.hits.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;
        // Unknown pages behave like a 404
        self.pages
            .get(url)
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)))
    }
}
