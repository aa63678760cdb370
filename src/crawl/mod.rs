// src/crawl/mod.rs
// =============================================================================
// This module handles the crawl itself.
//
// Features:
// - Breadth-first walk over a category and its pagination pages
// - Each page visited at most once, with a page cap and an optional depth cap
// - Per-article internal link extraction with bounded concurrency
// - Failed pages are reported, never fatal
// - Progress events and cancellation for the front end
//
// Submodules:
// - frontier: queue + visited set
// - session: the crawl driver
// - report: results handed back to the caller
// - events: progress notifications
// =============================================================================

mod events;
mod frontier;
mod report;
mod session;

pub use events::CrawlEvent;
pub use report::CrawlReport;
pub use session::CrawlSession;
