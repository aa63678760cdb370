// src/extract/links.rs
// =============================================================================
// This module decides which hyperlinks count as internal magazine links.
//
// A link is kept when, after normalization:
// 1. it starts with the site's magazine prefix, and
// 2. it is not on the exclusion list (category pages, author pages, ...)
//
// Results are BTreeSets, so the same page always yields the same links in
// the same order.
// =============================================================================

use std::collections::{BTreeSet, HashSet};
use url::Url;

use super::boundary::ContentScope;
use super::html::HtmlDocument;
use super::normalize::{normalize_url, resolve_href};

/// Prefix + exclusion filter applied to every normalized URL.
#[derive(Debug, Clone)]
pub struct LinkFilter {
    prefix: String,
    excluded: HashSet<String>,
}

impl LinkFilter {
    /// Builds a filter. Exclusion entries go through the same normalization
    /// as extracted links so both sides compare equal.
    pub fn new<I, S>(prefix: impl Into<String>, excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let excluded = excluded
            .into_iter()
            .map(|raw| {
                let raw = raw.as_ref();
                normalize_url(raw).unwrap_or_else(|| raw.trim().to_string())
            })
            .collect();

        Self {
            prefix: prefix.into(),
            excluded,
        }
    }

    pub fn is_excluded(&self, url: &str) -> bool {
        self.excluded.contains(url)
    }

    /// True if a normalized URL passes both the prefix and exclusion checks.
    pub fn accepts(&self, url: &str) -> bool {
        url.starts_with(&self.prefix) && !self.is_excluded(url)
    }
}

/// Extracts qualifying links from the anchors inside `scope`.
///
/// Parameters:
///   doc: the parsed page
///   scope: which part of the page to look at (see boundary::locate)
///   base: the page's own URL, for resolving relative hrefs
///   filter: prefix + exclusion rules
pub fn extract_links<'a>(
    doc: &'a HtmlDocument,
    scope: &ContentScope<'a>,
    base: &Url,
    filter: &LinkFilter,
) -> BTreeSet<String> {
    scope
        .anchors(doc)
        .iter()
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_href(base, href))
        .filter(|url| filter.accepts(url))
        .collect()
}
