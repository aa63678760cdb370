// src/extract/mod.rs
// =============================================================================
// This module turns downloaded HTML into URLs.
//
// Submodules:
// - normalize: one absolute form for every URL we compare
// - html: the parsed document and the queries we run on it
// - boundary: where an article's own content stops
// - links: prefix/exclusion filtering of internal links
// - articles: article cards and pagination on listing pages
//
// Everything here is synchronous. A parsed document is created, queried and
// dropped inside one function call and never crosses an `.await`.
// =============================================================================

mod articles;
mod boundary;
mod html;
mod links;
mod normalize;

pub use articles::ArticleCollector;
pub use boundary::{locate, BoundaryPolicy};
pub use html::HtmlDocument;
pub use links::{extract_links, LinkFilter};
pub use normalize::normalize_url;
