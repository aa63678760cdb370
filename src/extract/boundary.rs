// src/extract/boundary.rs
// =============================================================================
// Finds where an article's own content ends.
//
// Article pages end with a `<section class="unicoach-post-navigation">`
// holding previous/next links and related posts. Those links point at other
// magazine articles, but they are navigation, not links the author wrote, so
// link extraction must stop at that section.
//
// How much of the page counts as "before the marker" is a policy choice; see
// BoundaryPolicy.
// =============================================================================

use clap::ValueEnum;
use scraper::ElementRef;
use serde::{Deserialize, Serialize};

use super::html::{previous_sibling_element, HtmlDocument};

/// What to scan when the navigation marker is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryPolicy {
    /// Everything that precedes the marker in document order.
    /// Nothing before the marker means nothing to scan.
    #[default]
    BeforeMarker,
    /// Only the element right before the marker (empty if there is none)
    PreviousSibling,
    /// The element right before the marker, or the whole page if there is none
    PreviousSiblingOrDocument,
}

/// The part of a document link extraction is allowed to look at.
#[derive(Debug, Clone, Copy)]
pub enum ContentScope<'a> {
    /// No marker on the page
    WholeDocument,
    /// Everything before this marker element
    BeforeMarker(ElementRef<'a>),
    /// Only this element and its descendants
    Subtree(ElementRef<'a>),
    /// Marker found with nothing usable in front of it
    Empty,
}

impl<'a> ContentScope<'a> {
    /// Anchors (with href) inside the scope, in document order.
    pub fn anchors(&self, doc: &'a HtmlDocument) -> Vec<ElementRef<'a>> {
        match *self {
            ContentScope::WholeDocument => doc.anchors().collect(),
            ContentScope::BeforeMarker(marker) => doc.anchors_before(marker),
            ContentScope::Subtree(root) => doc.anchors_within(root),
            ContentScope::Empty => Vec::new(),
        }
    }
}

/// Locates the content scope of an article page.
///
/// The marker is the first `<section>` whose class list contains
/// `navigation_class`. Without a marker the whole document is in scope
/// whatever the policy.
pub fn locate<'a>(doc: &'a HtmlDocument, navigation_class: &str, policy: BoundaryPolicy) -> ContentScope<'a> {
    let Some(marker) = doc.first_element("section", navigation_class) else {
        return ContentScope::WholeDocument;
    };

    match policy {
        BoundaryPolicy::BeforeMarker => {
            if has_preceding_element(doc, marker) {
                ContentScope::BeforeMarker(marker)
            } else {
                ContentScope::Empty
            }
        }
        BoundaryPolicy::PreviousSibling => match previous_sibling_element(marker) {
            Some(sibling) => ContentScope::Subtree(sibling),
            None => ContentScope::Empty,
        },
        BoundaryPolicy::PreviousSiblingOrDocument => match previous_sibling_element(marker) {
            Some(sibling) => ContentScope::Subtree(sibling),
            None => ContentScope::WholeDocument,
        },
    }
}

// True if some element other than the structural html/head/body wrappers
// (or the marker's own ancestors) comes before the marker.
fn has_preceding_element(doc: &HtmlDocument, marker: ElementRef<'_>) -> bool {
    let ancestors: Vec<_> = marker.ancestors().map(|node| node.id()).collect();
    let stop = marker.id();

    doc.elements()
        .take_while(|el| el.id() != stop)
        .filter(|el| !ancestors.contains(&el.id()))
        .any(|el| !in_head(&el))
}

fn in_head(el: &ElementRef<'_>) -> bool {
    el.value().name() == "head"
        || el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| a.value().name() == "head")
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAV: &str = "unicoach-post-navigation";

    fn hrefs<'a>(scope: &ContentScope<'a>, doc: &'a HtmlDocument) -> Vec<String> {
        scope
            .anchors(doc)
            .iter()
            .filter_map(|a| a.value().attr("href").map(str::to_string))
            .collect()
    }

    #[test]
    fn test_no_marker_means_whole_document() {
        let doc = HtmlDocument::parse(r#"<body><a href="/x/">x</a></body>"#);
        for policy in [
            BoundaryPolicy::BeforeMarker,
            BoundaryPolicy::PreviousSibling,
            BoundaryPolicy::PreviousSiblingOrDocument,
        ] {
            let scope = locate(&doc, NAV, policy);
            assert!(matches!(scope, ContentScope::WholeDocument));
        }
    }

    #[test]
    fn test_before_marker_collects_all_preceding_blocks() {
        let doc = HtmlDocument::parse(
            r#"<body>
                <header><a href="/h/">h</a></header>
                <article><p><a href="/a/">a</a></p></article>
                <section class="unicoach-post-navigation"><a href="/nav/">nav</a></section>
                <footer><a href="/f/">f</a></footer>
            </body>"#,
        );
        let scope = locate(&doc, NAV, BoundaryPolicy::BeforeMarker);
        assert_eq!(hrefs(&scope, &doc), vec!["/h/", "/a/"]);
    }

    #[test]
    fn test_marker_nested_inside_wrapper() {
        let doc = HtmlDocument::parse(
            r#"<body><div id="page"><main>
                <div class="entry"><a href="/a/">a</a></div>
                <section class="unicoach-post-navigation"><a href="/nav/">nav</a></section>
            </main></div></body>"#,
        );
        let scope = locate(&doc, NAV, BoundaryPolicy::BeforeMarker);
        assert_eq!(hrefs(&scope, &doc), vec!["/a/"]);
    }

    #[test]
    fn test_marker_first_in_body_is_empty() {
        let doc = HtmlDocument::parse(
            r#"<html><head><title>t</title></head><body>
                <section class="unicoach-post-navigation"><a href="/decoy/">decoy</a></section>
            </body></html>"#,
        );
        assert!(matches!(
            locate(&doc, NAV, BoundaryPolicy::BeforeMarker),
            ContentScope::Empty
        ));
        assert!(matches!(
            locate(&doc, NAV, BoundaryPolicy::PreviousSibling),
            ContentScope::Empty
        ));
        assert!(matches!(
            locate(&doc, NAV, BoundaryPolicy::PreviousSiblingOrDocument),
            ContentScope::WholeDocument
        ));
    }

    #[test]
    fn test_previous_sibling_only_scans_one_block() {
        let doc = HtmlDocument::parse(
            r#"<body>
                <div><a href="/far/">far</a></div>
                <div><a href="/near/">near</a></div>
                <section class="unicoach-post-navigation"><a href="/nav/">nav</a></section>
            </body>"#,
        );
        let scope = locate(&doc, NAV, BoundaryPolicy::PreviousSibling);
        assert_eq!(hrefs(&scope, &doc), vec!["/near/"]);
    }

    #[test]
    fn test_only_section_tag_is_a_marker() {
        let doc = HtmlDocument::parse(
            r#"<body>
                <div class="unicoach-post-navigation"><a href="/a/">a</a></div>
            </body>"#,
        );
        assert!(matches!(
            locate(&doc, NAV, BoundaryPolicy::BeforeMarker),
            ContentScope::WholeDocument
        ));
    }
}
