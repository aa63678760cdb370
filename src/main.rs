// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing, to stderr, level from RUST_LOG)
// 2. Parse command-line arguments using clap
// 3. Build the fetcher and the crawl session, wire Ctrl-C to cancellation
// 4. Print the report as a table or JSON
// 5. Exit with proper code (0 = complete, 1 = some pages failed, 2 = error)
// =============================================================================

// Module declarations
mod cli;      // src/cli.rs - command-line parsing
mod config;   // src/config.rs - site profile and crawl options
mod crawl;    // src/crawl/ - frontier and crawl session
mod extract;  // src/extract/ - HTML parsing and link filtering
mod fetch;    // src/fetch/ - downloading pages

#[cfg(test)]
mod test_utils;

use anyhow::Result;
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, CrawlArgs};
use crawl::{CrawlEvent, CrawlReport, CrawlSession};
use fetch::HttpFetcher;

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // Unexpected error: print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so that --json output on stdout stays parseable
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// Returns:
//   Ok(0) = every page was fetched
//   Ok(1) = partial result (some pages failed, or the run was cancelled)
//   Err = bad arguments, unreadable profile, ...
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    let (mode, url, args) = match cli.command {
        Commands::Articles { category_url, crawl } => (Mode::Articles, category_url, crawl),
        Commands::Links { category_url, crawl } => (Mode::Links, category_url, crawl),
        Commands::Article { article_url, crawl } => (Mode::Article, article_url, crawl),
    };

    let report = crawl_site(mode, &url, &args).await?;
    print_results(&report, mode, args.json)?;

    if report.is_complete() {
        Ok(0)
    } else {
        Ok(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Articles,
    Links,
    Article,
}

async fn crawl_site(mode: Mode, url: &str, args: &CrawlArgs) -> Result<CrawlReport> {
    let profile = args.site_profile()?;
    let fetcher = HttpFetcher::new(&args.fetch_options())?;

    // Ctrl-C stops the crawl at the next page and still prints what we have
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing current page");
            flag.store(true, Ordering::Relaxed);
        }
    });

    let session = CrawlSession::new(fetcher, &profile, args.crawl_options())?
        .with_cancel_flag(cancel)
        .on_event(print_progress);

    info!(url, ?mode, "crawl requested");
    let report = match mode {
        Mode::Articles => session.collect_articles(url).await?,
        Mode::Links => session.collect_article_links(url).await?,
        Mode::Article => session.scan_article(url).await?,
    };
    Ok(report)
}

// Progress lines for humans, on stderr
fn print_progress(event: &CrawlEvent) {
    match event {
        CrawlEvent::ListingVisited { url, depth, articles, .. } => {
            eprintln!("📖 [depth {}] {} ({} article(s))", depth, url, articles)
        }
        CrawlEvent::ArticleFound { url } => eprintln!("   ✅ {}", url),
        CrawlEvent::PaginationQueued { url, .. } => eprintln!("   ➕ {}", url),
        CrawlEvent::ArticleScanned { url, links } => eprintln!("🔗 {} link(s) in {}", links, url),
        CrawlEvent::PageFailed(failure) => eprintln!("❌ {} ({})", failure.url, failure.message),
        CrawlEvent::CapReached { max_pages } => {
            eprintln!("⚠️  Stopped after {} listing page(s) (--max-pages)", max_pages)
        }
        CrawlEvent::Cancelled => eprintln!("⏹️  Cancelled"),
    }
}

// Prints the report either as a table or JSON
fn print_results(report: &CrawlReport, mode: Mode, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
    } else {
        print_table(report, mode);
    }
    Ok(())
}

fn print_table(report: &CrawlReport, mode: Mode) {
    if mode != Mode::Article {
        println!("\n📋 Articles ({}):", report.articles.len());
        for (i, article) in report.articles.iter().enumerate() {
            println!("{:>4}. {}", i + 1, article);
        }
    }

    for article in report.links.values() {
        println!("\n🔗 {} ({} link(s))", article.title, article.links.len());
        println!("   {}", article.url);
        println!("   {}", "-".repeat(article.url.len()));
        if article.links.is_empty() {
            println!("   (no internal links)");
        }
        for link in &article.links {
            println!("   - {}", link);
        }
    }

    if !report.failures.is_empty() {
        println!("\n{:<70} {:<10} {:<30}", "FAILED URL", "STAGE", "REASON");
        println!("{}", "=".repeat(110));
        for failure in &report.failures {
            // Truncate URL if too long for display
            let url_display = if failure.url.len() > 67 {
                format!("{}...", &failure.url[..67])
            } else {
                failure.url.clone()
            };
            println!("{:<70} {:<10} {:<30}", url_display, format!("{:?}", failure.stage), failure.message);
        }
    }

    println!();
    println!("📊 Summary:");
    if mode != Mode::Article {
        println!("   📄 Listing pages: {}", report.listing_pages.len());
    }
    println!("   📰 Articles: {}", report.articles.len());
    if !report.links.is_empty() {
        let total: usize = report.links.values().map(|a| a.links.len()).sum();
        println!("   🔗 Internal links: {}", total);
    }
    println!("   ❌ Failed pages: {}", report.failures.len());
    if report.cap_reached {
        println!("   ⚠️  Page cap reached, results may be incomplete");
    }
}
