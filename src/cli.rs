// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Three subcommands share the same crawl flags:
// - articles: list the articles of a category
// - links:    list the articles of a category and the internal links of each
// - article:  list the internal links of one article
//
// The flags are turned into the configuration types from config.rs here, so
// the rest of the crate never sees raw CLI arguments.
// =============================================================================

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{
    parse_exclusion_list, CrawlOptions, FetchOptions, SiteProfile, DEFAULT_CATEGORY_URL, DEFAULT_USER_AGENT,
};
use crate::extract::BoundaryPolicy;

#[derive(Parser, Debug)]
#[command(
    name = "magazine-crawler",
    version,
    about = "Crawl a magazine category, find its articles and list their internal links",
    long_about = "magazine-crawler walks a category page and its pagination, collects the articles \
                  linked by their \"read more\" buttons and, for each article, lists the internal \
                  magazine links found in the body (the related-posts section is ignored)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the articles of a category (follows pagination)
    ///
    /// Example: magazine-crawler articles https://www.myes.school/fr/magazine/vocabulaire-anglais/
    Articles {
        /// Category / listing page to start from
        #[arg(default_value = DEFAULT_CATEGORY_URL)]
        category_url: String,

        #[command(flatten)]
        crawl: CrawlArgs,
    },

    /// List the articles of a category and the internal links of each one
    ///
    /// Example: magazine-crawler links https://www.myes.school/fr/magazine/vocabulaire-anglais/ --json
    Links {
        /// Category / listing page to start from
        #[arg(default_value = DEFAULT_CATEGORY_URL)]
        category_url: String,

        #[command(flatten)]
        crawl: CrawlArgs,
    },

    /// List the internal links of a single article
    Article {
        /// Article page to scan
        article_url: String,

        #[command(flatten)]
        crawl: CrawlArgs,
    },
}

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct CrawlArgs {
    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,

    /// URL never reported as article or link (repeatable)
    #[arg(long = "exclude", value_name = "URL")]
    pub exclude: Vec<String>,

    /// File with one excluded URL per line ('#' starts a comment)
    #[arg(long, value_name = "PATH")]
    pub exclude_file: Option<PathBuf>,

    /// TOML site profile overriding the built-in magazine markers
    #[arg(long, value_name = "PATH")]
    pub profile: Option<PathBuf>,

    /// Maximum number of listing pages to visit
    #[arg(long, default_value_t = 50)]
    pub max_pages: usize,

    /// Maximum pagination depth (start page = 1); unlimited if omitted
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Delay between two listing page requests, in milliseconds
    #[arg(long, default_value_t = 250)]
    pub delay_ms: u64,

    /// Number of article pages fetched at the same time
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Also visit <category>/page/2/ up to <category>/page/N/
    #[arg(long, default_value_t = 0, value_name = "N")]
    pub seed_pages: usize,

    /// Which part of an article counts as its content
    #[arg(long, value_enum, default_value_t = BoundaryPolicy::BeforeMarker)]
    pub boundary: BoundaryPolicy,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

impl CrawlArgs {
    /// Built-in profile, overridden by --profile, plus every exclusion given
    /// on the command line.
    pub fn site_profile(&self) -> Result<SiteProfile> {
        let mut profile = match &self.profile {
            Some(path) => SiteProfile::from_file(path)?,
            None => SiteProfile::default(),
        };

        if let Some(path) = &self.exclude_file {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("could not read exclusion file {}", path.display()))?;
            profile.excluded.extend(parse_exclusion_list(&raw));
        }
        profile.excluded.extend(self.exclude.iter().cloned());

        Ok(profile)
    }

    pub fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            max_pages: self.max_pages,
            max_depth: self.max_depth,
            delay: Duration::from_millis(self.delay_ms),
            concurrency: self.concurrency.max(1),
            seed_pages: self.seed_pages,
            boundary: self.boundary,
        }
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
        }
    }
}
