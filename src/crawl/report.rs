// src/crawl/report.rs
// =============================================================================
// What a crawl hands back to the caller.
//
// The report always exists, even when pages failed: failed pages are listed
// in `failures` instead of aborting the run, so the caller can tell a
// complete result from a partial one.
// =============================================================================

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use url::Url;

use crate::fetch::{FailureKind, FetchError};

/// Which pass a page belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Listing,
    Article,
}

/// A page that could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFailure {
    pub url: String,
    pub stage: Stage,
    pub kind: FailureKind,
    pub message: String,
}

impl PageFailure {
    pub fn new(url: impl Into<String>, stage: Stage, error: &FetchError) -> Self {
        Self {
            url: url.into(),
            stage,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Internal links found in one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleLinks {
    pub url: String,
    pub title: String,
    pub links: BTreeSet<String>,
}

impl ArticleLinks {
    pub fn new(url: impl Into<String>, links: BTreeSet<String>) -> Self {
        let url = url.into();
        Self {
            title: article_title(&url),
            url,
            links,
        }
    }
}

/// Result of one crawl run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlReport {
    pub start_url: String,
    /// Listing pages visited (failed ones included), in visit order
    pub listing_pages: Vec<String>,
    pub articles: BTreeSet<String>,
    /// Per-article internal links (empty for an articles-only crawl)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, ArticleLinks>,
    pub failures: Vec<PageFailure>,
    /// The page cap stopped the listing pass with pages still queued
    pub cap_reached: bool,
    pub cancelled: bool,
}

impl CrawlReport {
    /// True if every page that was attempted could be used.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

/// Human-readable title from an article URL's last path segment.
///
/// Example: ".../magazine/phrasal-verbs-anglais/" -> "Phrasal verbs anglais"
pub fn article_title(url: &str) -> String {
    let slug = Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|segments| segments.rev().find(|s| !s.is_empty()).map(str::to_string))
        })
        .unwrap_or_default();

    let words = slug.replace('-', " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
