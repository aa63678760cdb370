// src/extract/articles.rs
// =============================================================================
// Reads a category/listing page.
//
// Two things are pulled out of every listing page:
// - articles: the "read more" anchors of the article cards, filtered with
//   the same prefix/exclusion rules as internal links
// - pagination: every anchor on the page (no content boundary here) whose
//   href itself looks like `.../page/<n>/`. The href is matched before
//   resolution: on `/page/2/` a relative `?orderby=date` or `feed/` would
//   otherwise resolve under `/page/2/` and look like pagination.
// =============================================================================

use regex::Regex;
use std::collections::BTreeSet;
use url::Url;

use super::html::HtmlDocument;
use super::links::LinkFilter;
use super::normalize::resolve_href;

/// What one listing page contributed to the crawl.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListingHarvest {
    pub articles: BTreeSet<String>,
    pub pagination: BTreeSet<String>,
}

/// Markers used to recognise articles and pagination on listing pages.
#[derive(Debug, Clone)]
pub struct ArticleCollector {
    article_class: String,
    pagination: Regex,
    filter: LinkFilter,
}

impl ArticleCollector {
    pub fn new(article_class: impl Into<String>, pagination: Regex, filter: LinkFilter) -> Self {
        Self {
            article_class: article_class.into(),
            pagination,
            filter,
        }
    }

    /// Parses `html` (fetched from `page_url`) and harvests it.
    ///
    /// Pagination links pointing at another host are dropped: the crawl
    /// follows one listing, never a sidebar link to someone else's site.
    pub fn harvest(&self, html: &str, page_url: &Url) -> ListingHarvest {
        let doc = HtmlDocument::parse(html);
        let mut harvest = ListingHarvest::default();

        for anchor in doc.anchors_with_class(&self.article_class) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if let Some(url) = resolve_href(page_url, href) {
                if self.filter.accepts(&url) {
                    harvest.articles.insert(url);
                }
            }
        }

        for anchor in doc.anchors() {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if !self.pagination.is_match(href.trim()) {
                continue;
            }
            if let Some(url) = resolve_href(page_url, href) {
                if same_host(page_url, &url) {
                    harvest.pagination.insert(url);
                }
            }
        }

        harvest
    }
}

fn same_host(page_url: &Url, candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|c| c.host_str() == page_url.host_str())
        .unwrap_or(false)
}
