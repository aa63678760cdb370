// src/crawl/events.rs
// Progress events a front end can subscribe to (see CrawlSession::on_event).

use super::report::PageFailure;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    /// A listing page was fetched and harvested
    ListingVisited {
        url: String,
        depth: usize,
        articles: usize,
        pagination: usize,
    },
    /// First time an article URL was seen
    ArticleFound { url: String },
    /// A new pagination page joined the frontier
    PaginationQueued { url: String, depth: usize },
    /// An article page was scanned for internal links
    ArticleScanned { url: String, links: usize },
    PageFailed(PageFailure),
    /// max_pages stopped the listing pass early
    CapReached { max_pages: usize },
    Cancelled,
}

pub(crate) type Observer = Box<dyn FnMut(&CrawlEvent) + Send>;
