// src/crawl/session.rs
// =============================================================================
// One crawl run, from a category URL to a report.
//
// How it works:
// 1. Listing pass: walk the category and its pagination breadth-first
//    (CrawlFrontier), harvesting article URLs from every page
// 2. Link pass: fetch each article, cut it at the navigation section and
//    keep its internal links
//
// All crawl state (frontier, visited set, results, failures) lives inside
// the session, so two sessions never share anything and can run side by
// side.
//
// Politeness:
// - listing pages are fetched one at a time with a delay in between
// - article pages are fetched with a small, fixed number in flight
// =============================================================================

use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use super::events::{CrawlEvent, Observer};
use super::frontier::CrawlFrontier;
use super::report::{ArticleLinks, CrawlReport, PageFailure, Stage};
use crate::config::{ConfigError, CrawlOptions, SiteProfile};
use crate::extract::{self, ArticleCollector, BoundaryPolicy, HtmlDocument, LinkFilter};
use crate::fetch::{FetchError, PageFetcher};

/// Drives a crawl with any PageFetcher.
pub struct CrawlSession<F: PageFetcher> {
    fetcher: F,
    collector: ArticleCollector,
    filter: LinkFilter,
    navigation_class: String,
    options: CrawlOptions,
    cancel: Arc<AtomicBool>,
    observer: Option<Observer>,
    failures: Vec<PageFailure>,
}

impl<F: PageFetcher> CrawlSession<F> {
    /// Builds a session for one site profile.
    ///
    /// Fails only if the profile's pagination pattern is not a valid regex.
    pub fn new(fetcher: F, profile: &SiteProfile, options: CrawlOptions) -> Result<Self, ConfigError> {
        let filter = LinkFilter::new(profile.link_prefix.clone(), &profile.excluded);
        let collector = ArticleCollector::new(
            profile.article_class.clone(),
            profile.pagination_regex()?,
            filter.clone(),
        );

        Ok(Self {
            fetcher,
            collector,
            filter,
            navigation_class: profile.navigation_class.clone(),
            options,
            cancel: Arc::new(AtomicBool::new(false)),
            observer: None,
            failures: Vec::new(),
        })
    }

    /// Shares a cancellation flag; setting it stops the crawl at the next
    /// page boundary and returns what was collected so far.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    /// Registers a callback receiving every CrawlEvent.
    pub fn on_event(mut self, callback: impl FnMut(&CrawlEvent) + Send + 'static) -> Self {
        self.observer = Some(Box::new(callback));
        self
    }

    /// Listing pass only: which articles does this category contain?
    pub async fn collect_articles(self, start_url: &str) -> Result<CrawlReport, ConfigError> {
        self.run(start_url, false).await
    }

    /// Listing pass followed by the link pass over every article found.
    pub async fn collect_article_links(self, start_url: &str) -> Result<CrawlReport, ConfigError> {
        self.run(start_url, true).await
    }

    /// Link pass for a single article, no listing crawl.
    pub async fn scan_article(mut self, article_url: &str) -> Result<CrawlReport, ConfigError> {
        let url = extract::normalize_url(article_url).ok_or_else(|| ConfigError::StartUrl(article_url.to_string()))?;

        let articles = BTreeSet::from([url.clone()]);
        let links = self.link_pass(&articles).await;

        Ok(CrawlReport {
            start_url: url,
            listing_pages: Vec::new(),
            articles,
            links,
            failures: std::mem::take(&mut self.failures),
            cap_reached: false,
            cancelled: self.is_cancelled(),
        })
    }

    async fn run(mut self, start_url: &str, with_links: bool) -> Result<CrawlReport, ConfigError> {
        let start = extract::normalize_url(start_url).ok_or_else(|| ConfigError::StartUrl(start_url.to_string()))?;

        info!(
            start = %start,
            max_pages = self.options.max_pages,
            max_depth = ?self.options.max_depth,
            "starting crawl"
        );

        let (articles, listing_pages, cap_reached) = self.listing_pass(&start).await;

        let links = if with_links && !self.is_cancelled() {
            self.link_pass(&articles).await
        } else {
            BTreeMap::new()
        };

        let report = CrawlReport {
            start_url: start,
            listing_pages,
            articles,
            links,
            failures: std::mem::take(&mut self.failures),
            cap_reached,
            cancelled: self.is_cancelled(),
        };

        info!(
            listing_pages = report.listing_pages.len(),
            articles = report.articles.len(),
            failures = report.failures.len(),
            "crawl finished"
        );
        Ok(report)
    }

    // Breadth-first walk over the listing and its pagination.
    // Returns (articles, visited listing pages, cap reached).
    async fn listing_pass(&mut self, start: &str) -> (BTreeSet<String>, Vec<String>, bool) {
        let mut frontier = CrawlFrontier::new(self.options.max_pages, self.options.max_depth);
        frontier.enqueue(start, 1);
        for seed in seed_pages(start, self.options.seed_pages) {
            frontier.enqueue(seed, 2);
        }

        let mut articles = BTreeSet::new();
        let mut first = true;

        loop {
            if self.is_cancelled() {
                info!("crawl cancelled");
                self.emit(CrawlEvent::Cancelled);
                break;
            }
            let Some(item) = frontier.pop_next() else {
                break;
            };

            // Polite crawling: pause between two listing pages
            if !first && !self.options.delay.is_zero() {
                tokio::time::sleep(self.options.delay).await;
            }
            first = false;

            debug!(url = %item.url, depth = item.depth, "visiting listing page");

            let html = match self.fetcher.fetch(&item.url).await {
                Ok(html) => html,
                Err(e) => {
                    self.record_failure(&item.url, Stage::Listing, &e);
                    continue;
                }
            };

            let page_url = match Url::parse(&item.url) {
                Ok(url) => url,
                Err(e) => {
                    self.record_failure(&item.url, Stage::Listing, &FetchError::InvalidUrl(e.to_string()));
                    continue;
                }
            };
            let harvest = self.collector.harvest(&html, &page_url);

            info!(
                url = %item.url,
                depth = item.depth,
                articles = harvest.articles.len(),
                pagination = harvest.pagination.len(),
                "listing page harvested"
            );
            self.emit(CrawlEvent::ListingVisited {
                url: item.url.clone(),
                depth: item.depth,
                articles: harvest.articles.len(),
                pagination: harvest.pagination.len(),
            });

            for article in harvest.articles {
                if articles.insert(article.clone()) {
                    self.emit(CrawlEvent::ArticleFound { url: article });
                }
            }

            for page in harvest.pagination {
                if frontier.enqueue(page.clone(), item.depth + 1) {
                    debug!(url = %page, depth = item.depth + 1, "pagination page queued");
                    self.emit(CrawlEvent::PaginationQueued {
                        url: page,
                        depth: item.depth + 1,
                    });
                }
            }
        }

        let cap_reached = frontier.cap_reached();
        if cap_reached {
            warn!(
                max_pages = self.options.max_pages,
                visited = frontier.visited_count(),
                pending = frontier.pending(),
                "page cap reached, listing pass stopped early"
            );
            self.emit(CrawlEvent::CapReached {
                max_pages: self.options.max_pages,
            });
        }

        (articles, frontier.into_visited(), cap_reached)
    }

    // Fetches every article with bounded concurrency and extracts its links.
    async fn link_pass(&mut self, articles: &BTreeSet<String>) -> BTreeMap<String, ArticleLinks> {
        let fetcher = &self.fetcher;
        let filter = &self.filter;
        let cancel = &self.cancel;
        let navigation_class = self.navigation_class.as_str();
        let policy = self.options.boundary;

        let mut scans = stream::iter(articles.iter().cloned())
            .map(move |url| async move {
                if cancel.load(Ordering::Relaxed) {
                    return (url, None);
                }
                let outcome = fetcher
                    .fetch(&url)
                    .await
                    .and_then(|html| scan_article_html(&html, &url, navigation_class, policy, filter));
                (url, Some(outcome))
            })
            .buffer_unordered(self.options.concurrency.max(1));

        let mut results = BTreeMap::new();
        while let Some((url, outcome)) = scans.next().await {
            match outcome {
                Some(Ok(links)) => {
                    debug!(url = %url, links = links.len(), "article scanned");
                    let event = CrawlEvent::ArticleScanned {
                        url: url.clone(),
                        links: links.len(),
                    };
                    notify(&mut self.observer, &event);
                    results.insert(url.clone(), ArticleLinks::new(url, links));
                }
                Some(Err(e)) => {
                    warn!(url = %url, error = %e, "article skipped");
                    let failure = PageFailure::new(url, Stage::Article, &e);
                    notify(&mut self.observer, &CrawlEvent::PageFailed(failure.clone()));
                    self.failures.push(failure);
                }
                // Cancelled before this article was fetched
                None => {}
            }
        }

        results
    }

    fn record_failure(&mut self, url: &str, stage: Stage, error: &FetchError) {
        warn!(url, error = %error, "page skipped");
        let failure = PageFailure::new(url, stage, error);
        self.emit(CrawlEvent::PageFailed(failure.clone()));
        self.failures.push(failure);
    }

    fn emit(&mut self, event: CrawlEvent) {
        notify(&mut self.observer, &event);
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

fn notify(observer: &mut Option<Observer>, event: &CrawlEvent) {
    if let Some(callback) = observer.as_mut() {
        callback(event);
    }
}

// Parses an article and returns its internal links. Synchronous, so the
// parsed document never lives across an await point.
fn scan_article_html(
    html: &str,
    url: &str,
    navigation_class: &str,
    policy: BoundaryPolicy,
    filter: &LinkFilter,
) -> Result<BTreeSet<String>, FetchError> {
    let base = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;
    let doc = HtmlDocument::parse(html);
    let scope = extract::locate(&doc, navigation_class, policy);
    Ok(extract::extract_links(&doc, &scope, &base, filter))
}

// `<start>/page/2/` ..= `<start>/page/N/`. Some listings only render their
// pagination client-side, so it can't be discovered from the HTML.
fn seed_pages(start: &str, last_page: usize) -> Vec<String> {
    let Ok(mut base) = Url::parse(start) else {
        return Vec::new();
    };
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    (2..=last_page)
        .filter_map(|n| base.join(&format!("page/{}/", n)).ok())
        .map(|url| url.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::StaticFetcher;
    use std::sync::Mutex;
    use std::time::Duration;

    const START: &str = "https://mag.test/fr/magazine/vocabulaire/";

    fn profile() -> SiteProfile {
        SiteProfile {
            link_prefix: "https://mag.test/fr/magazine/".to_string(),
            excluded: vec!["https://mag.test/fr/magazine/".to_string()],
            ..SiteProfile::default()
        }
    }

    fn options() -> CrawlOptions {
        CrawlOptions {
            delay: Duration::ZERO,
            ..CrawlOptions::default()
        }
    }

    fn card(href: &str) -> String {
        format!(r#"<a class="button-read-more" href="{}">Lire la suite</a>"#, href)
    }

    fn two_page_site() -> StaticFetcher {
        StaticFetcher::new()
            .page(
                START,
                &format!(
                    r#"<body>{}<nav><a href="/fr/magazine/vocabulaire/page/2/">2</a></nav></body>"#,
                    card("https://mag.test/fr/magazine/foo/")
                ),
            )
            .page(
                "https://mag.test/fr/magazine/vocabulaire/page/2/",
                &format!(
                    r#"<body>{}<nav><a href="/fr/magazine/vocabulaire/">1</a></nav></body>"#,
                    card("https://mag.test/fr/magazine/bar/")
                ),
            )
    }

    #[tokio::test]
    async fn test_articles_across_pagination() {
        let fetcher = Arc::new(two_page_site());
        let session = CrawlSession::new(fetcher.clone(), &profile(), options()).unwrap();

        let report = session.collect_articles(START).await.unwrap();

        assert_eq!(
            report.articles.iter().collect::<Vec<_>>(),
            vec![
                "https://mag.test/fr/magazine/bar/",
                "https://mag.test/fr/magazine/foo/",
            ]
        );
        assert_eq!(report.listing_pages.len(), 2);
        assert!(report.links.is_empty());
        assert!(report.is_complete());
        // page 2 links back to page 1: still fetched exactly once each
        assert_eq!(fetcher.hits(START), 1);
        assert_eq!(fetcher.hits("https://mag.test/fr/magazine/vocabulaire/page/2/"), 1);
    }

    #[tokio::test]
    async fn test_full_crawl_with_links() {
        let fetcher = two_page_site()
            .page(
                "https://mag.test/fr/magazine/foo/",
                r#"<body>
                    <div class="entry">
                        <a href="/fr/magazine/bar/">bar</a>
                        <a href="https://mag.test/fr/magazine/">home, excluded</a>
                    </div>
                    <section class="unicoach-post-navigation"><a href="/fr/magazine/decoy/">next</a></section>
                </body>"#,
            )
            .page(
                "https://mag.test/fr/magazine/bar/",
                r#"<body><section class="unicoach-post-navigation">
                    <a href="https://mag.test/fr/magazine/decoy/">decoy</a>
                </section></body>"#,
            );

        let report = CrawlSession::new(fetcher, &profile(), options())
            .unwrap()
            .collect_article_links(START)
            .await
            .unwrap();

        let foo = &report.links["https://mag.test/fr/magazine/foo/"];
        assert_eq!(foo.title, "Foo");
        assert_eq!(
            foo.links.iter().collect::<Vec<_>>(),
            vec!["https://mag.test/fr/magazine/bar/"]
        );

        let bar = &report.links["https://mag.test/fr/magazine/bar/"];
        assert!(bar.links.is_empty());
    }

    #[tokio::test]
    async fn test_failures_are_recorded_not_fatal() {
        let fetcher = StaticFetcher::new()
            .page(
                START,
                &format!(
                    r#"<body>{}{}<a href="/fr/magazine/vocabulaire/page/2/">2</a></body>"#,
                    card("/fr/magazine/ok/"),
                    card("/fr/magazine/gone/")
                ),
            )
            .failing("https://mag.test/fr/magazine/vocabulaire/page/2/", FetchError::Timeout)
            .page("https://mag.test/fr/magazine/ok/", "<body></body>");
        // "gone" is unknown to the fetcher and answers 404

        let report = CrawlSession::new(fetcher, &profile(), options())
            .unwrap()
            .collect_article_links(START)
            .await
            .unwrap();

        assert_eq!(report.articles.len(), 2);
        assert_eq!(report.links.len(), 1);
        assert!(!report.is_complete());

        let stages: Vec<_> = report.failures.iter().map(|f| (f.url.as_str(), f.stage)).collect();
        assert!(stages.contains(&("https://mag.test/fr/magazine/vocabulaire/page/2/", Stage::Listing)));
        assert!(stages.contains(&("https://mag.test/fr/magazine/gone/", Stage::Article)));
    }

    #[tokio::test]
    async fn test_page_cap_stops_endless_pagination() {
        // every page n links to page n+1
        let mut fetcher = StaticFetcher::new();
        fetcher = fetcher.page(START, &format!(r#"<a href="{}page/2/">next</a>"#, START));
        for n in 2..20 {
            fetcher = fetcher.page(
                &format!("{}page/{}/", START, n),
                &format!(r#"<a href="{}page/{}/">next</a>"#, START, n + 1),
            );
        }

        let report = CrawlSession::new(
            fetcher,
            &profile(),
            CrawlOptions {
                max_pages: 5,
                ..options()
            },
        )
        .unwrap()
        .collect_articles(START)
        .await
        .unwrap();

        assert_eq!(report.listing_pages.len(), 5);
        assert!(report.cap_reached);
    }

    #[tokio::test]
    async fn test_sort_and_feed_links_are_not_crawled_as_pages() {
        let page_two = "https://mag.test/fr/magazine/vocabulaire/page/2/";
        let fetcher = StaticFetcher::new()
            .page(START, r#"<a href="/fr/magazine/vocabulaire/page/2/">2</a>"#)
            .page(
                page_two,
                &format!(
                    r#"<body>{}<a href="?orderby=date">sort</a><a href="feed/">rss</a></body>"#,
                    card("/fr/magazine/bar/")
                ),
            );

        let report = CrawlSession::new(fetcher, &profile(), options())
            .unwrap()
            .collect_articles(START)
            .await
            .unwrap();

        assert_eq!(report.listing_pages, vec![START.to_string(), page_two.to_string()]);
        assert!(report.failures.is_empty());
        assert!(report.articles.contains("https://mag.test/fr/magazine/bar/"));
    }

    #[tokio::test]
    async fn test_seed_pages_are_crawled() {
        let fetcher = StaticFetcher::new()
            .page(START, "<body></body>")
            .page(&format!("{}page/2/", START), &card("/fr/magazine/seeded/"));

        let report = CrawlSession::new(
            fetcher,
            &profile(),
            CrawlOptions {
                seed_pages: 3,
                ..options()
            },
        )
        .unwrap()
        .collect_articles(START)
        .await
        .unwrap();

        assert!(report.articles.contains("https://mag.test/fr/magazine/seeded/"));
        assert_eq!(report.listing_pages.len(), 3);
        // page 3 does not exist
        assert_eq!(report.failures.len(), 1);
    }

    #[tokio::test]
    async fn test_events_are_emitted() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();

        CrawlSession::new(two_page_site(), &profile(), options())
            .unwrap()
            .on_event(move |event| sink.lock().unwrap().push(event.clone()))
            .collect_articles(START)
            .await
            .unwrap();

        let events = events.lock().unwrap();
        let visited = events
            .iter()
            .filter(|e| matches!(e, CrawlEvent::ListingVisited { .. }))
            .count();
        assert_eq!(visited, 2);
        assert!(events.contains(&CrawlEvent::PaginationQueued {
            url: "https://mag.test/fr/magazine/vocabulaire/page/2/".to_string(),
            depth: 2,
        }));
        assert!(events.contains(&CrawlEvent::ArticleFound {
            url: "https://mag.test/fr/magazine/foo/".to_string(),
        }));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let flag = Arc::new(AtomicBool::new(true));
        let fetcher = Arc::new(two_page_site());

        let report = CrawlSession::new(fetcher.clone(), &profile(), options())
            .unwrap()
            .with_cancel_flag(flag)
            .collect_article_links(START)
            .await
            .unwrap();

        assert!(report.cancelled);
        assert!(report.articles.is_empty());
        assert_eq!(fetcher.total_hits(), 0);
    }

    #[tokio::test]
    async fn test_scan_single_article() {
        let fetcher = StaticFetcher::new().page(
            "https://mag.test/fr/magazine/foo/",
            r#"<p><a href="/fr/magazine/a/">a</a> <a href="/fr/magazine/b/">b</a></p>"#,
        );

        let report = CrawlSession::new(fetcher, &profile(), options())
            .unwrap()
            .scan_article("https://mag.test/fr/magazine/foo/")
            .await
            .unwrap();

        assert_eq!(report.links["https://mag.test/fr/magazine/foo/"].links.len(), 2);
        assert!(report.listing_pages.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_start_url() {
        let result = CrawlSession::new(StaticFetcher::new(), &profile(), options())
            .unwrap()
            .collect_articles("not a url")
            .await;
        assert!(matches!(result, Err(ConfigError::StartUrl(_))));
    }

    #[test]
    fn test_seed_page_urls() {
        assert_eq!(
            seed_pages("https://mag.test/fr/magazine/vocab", 3),
            vec![
                "https://mag.test/fr/magazine/vocab/page/2/",
                "https://mag.test/fr/magazine/vocab/page/3/",
            ]
        );
        assert!(seed_pages(START, 1).is_empty());
    }
}
