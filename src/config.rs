// src/config.rs
// =============================================================================
// This module holds everything the crawler can be configured with.
//
// There are two kinds of settings:
// - SiteProfile: facts about the website (which URLs count as internal links,
//   which CSS classes mark articles and the navigation block, what pagination
//   links look like). Defaults target the myes.school magazine.
// - CrawlOptions: how politely and how far we crawl (page cap, depth cap,
//   delay between requests, concurrency, timeouts).
//
// A SiteProfile can be loaded from a TOML file so the same binary can be
// pointed at another site without recompiling.
// =============================================================================

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::extract::BoundaryPolicy;

/// Path prefix every internal magazine link starts with.
pub const DEFAULT_LINK_PREFIX: &str = "https://www.myes.school/fr/magazine/";

/// Class carried by the "read more" anchor of each article card.
pub const DEFAULT_ARTICLE_CLASS: &str = "button-read-more";

/// Class of the `<section>` holding related posts / previous-next navigation.
pub const DEFAULT_NAVIGATION_CLASS: &str = "unicoach-post-navigation";

/// Pagination links look like `/page/3/`.
pub const DEFAULT_PAGINATION_PATTERN: &str = r"/page/\d+/";

/// Category crawled when no URL is given.
pub const DEFAULT_CATEGORY_URL: &str = "https://www.myes.school/fr/magazine/vocabulaire-anglais/";

/// Browser-like User-Agent; the site serves a reduced page to unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Category and landing pages that share the magazine prefix but are not articles.
pub const DEFAULT_EXCLUDED_URLS: &[&str] = &[
    "https://www.myes.school/fr/magazine/",
    "https://www.myes.school/fr/magazine/category/",
    "https://www.myes.school/fr/magazine/category/exercices-et-grammaire/",
    "https://www.myes.school/fr/magazine/non-classifiee/",
    "https://www.myes.school/fr/magazine/cpf/",
    "https://www.myes.school/fr/magazine/author/marketing/",
    "https://www.myes.school/fr/magazine/exercices-et-grammaire/exercices-anglais/",
    "https://www.myes.school/fr/magazine/exercices-et-grammaire/vocabulaire-anglais/",
    "https://www.myes.school/fr/magazine/exercices-et-grammaire/grammaire-anglais/",
    "https://www.myes.school/fr/magazine/tourisme-et-culture/",
    "https://www.myes.school/fr/magazine/tourisme-et-culture/voyages/",
    "https://www.myes.school/fr/magazine/tourisme-et-culture/films-series-anglais/",
    "https://www.myes.school/fr/magazine/tourisme-et-culture/livres-anglais/",
    "https://www.myes.school/fr/magazine/conseils/certifications-anglais/",
    "https://www.myes.school/fr/magazine/conseils/professionnel/",
    "https://www.myes.school/fr/magazine/conseils/formation-anglais/",
];

/// Errors raised while assembling the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read profile {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid profile {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid pagination pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid start URL '{0}'")]
    StartUrl(String),
}

/// Site-specific markers the extractors rely on.
///
/// Every field has a default, so a profile file only needs the keys it
/// changes:
///
/// ```toml
/// link_prefix = "https://example.com/blog/"
/// article_class = "more-link"
/// excluded = ["https://example.com/blog/"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    /// Internal links must start with this string
    pub link_prefix: String,
    /// Class of the anchors that point at articles on a listing page
    pub article_class: String,
    /// Class of the `<section>` that ends the article body
    pub navigation_class: String,
    /// Regex matched against raw hrefs to find pagination links
    pub pagination_pattern: String,
    /// URLs never reported, neither as articles nor as links
    pub excluded: Vec<String>,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            link_prefix: DEFAULT_LINK_PREFIX.to_string(),
            article_class: DEFAULT_ARTICLE_CLASS.to_string(),
            navigation_class: DEFAULT_NAVIGATION_CLASS.to_string(),
            pagination_pattern: DEFAULT_PAGINATION_PATTERN.to_string(),
            excluded: DEFAULT_EXCLUDED_URLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SiteProfile {
    /// Loads a profile from a TOML file, falling back to defaults for
    /// missing keys.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })
    }

    /// Compiles the pagination pattern.
    pub fn pagination_regex(&self) -> Result<Regex, ConfigError> {
        Regex::new(&self.pagination_pattern).map_err(|source| ConfigError::Pattern {
            pattern: self.pagination_pattern.clone(),
            source,
        })
    }
}

/// Limits and politeness settings for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Stop the listing pass after this many pages have been visited
    pub max_pages: usize,
    /// Deepest pagination hop followed (start page = depth 1), None = unlimited
    pub max_depth: Option<usize>,
    /// Pause between two listing page fetches
    pub delay: Duration,
    /// Maximum number of article pages fetched at the same time
    pub concurrency: usize,
    /// Pre-enqueue `<start>/page/2/ ..= <start>/page/N/` (0 = disabled)
    pub seed_pages: usize,
    /// What counts as article body when the navigation marker is found
    pub boundary: BoundaryPolicy,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_pages: 50,
            max_depth: None,
            delay: Duration::from_millis(250),
            concurrency: 4,
            seed_pages: 0,
            boundary: BoundaryPolicy::BeforeMarker,
        }
    }
}

/// Settings for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Reads an exclusion list: one URL per line, blank lines and `#` comments
/// ignored.
pub fn parse_exclusion_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
