// src/extract/html.rs
// =============================================================================
// A thin wrapper around scraper's parsed document.
//
// The extractors only need a handful of questions answered ("which anchors
// have this class?", "where is the navigation section?", "what comes before
// it?"), so we answer them here once instead of sprinkling CSS selectors and
// tree walking across the crate.
//
// Class checks look at the individual tokens of the class attribute, so
// `class="btn button-read-more"` matches `button-read-more`.
// =============================================================================

use scraper::{ElementRef, Html};

/// A parsed HTML page.
///
/// html5ever never rejects input: broken markup is repaired the way a browser
/// would, and garbage ends up as an almost empty tree. Parsing therefore
/// cannot fail.
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(raw: &str) -> Self {
        Self {
            html: Html::parse_document(raw),
        }
    }

    /// Every element in document order.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.html.tree.root().descendants().filter_map(ElementRef::wrap)
    }

    /// All `<a href>` elements in document order.
    pub fn anchors(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.elements().filter(is_anchor)
    }

    /// `<a>` elements whose class list contains `class`.
    pub fn anchors_with_class<'a>(&'a self, class: &'a str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.anchors().filter(move |el| has_class(el, class))
    }

    /// First element with the given tag name and class.
    pub fn first_element(&self, tag: &str, class: &str) -> Option<ElementRef<'_>> {
        self.elements()
            .find(|el| el.value().name().eq_ignore_ascii_case(tag) && has_class(el, class))
    }

    /// Anchors that appear before `marker` in document order.
    ///
    /// The marker's own descendants come after it in a pre-order walk, so
    /// anything inside the marker is excluded too.
    pub fn anchors_before<'a>(&'a self, marker: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        let stop = marker.id();
        self.html
            .tree
            .root()
            .descendants()
            .take_while(|node| node.id() != stop)
            .filter_map(ElementRef::wrap)
            .filter(is_anchor)
            .collect()
    }

    /// Anchors inside `root`, including `root` itself.
    pub fn anchors_within<'a>(&self, root: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        root.descendants()
            .filter_map(ElementRef::wrap)
            .filter(is_anchor)
            .collect()
    }
}

/// The element sibling right before `el`, skipping text and comments.
pub fn previous_sibling_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.prev_siblings().find_map(ElementRef::wrap)
}

fn is_anchor(el: &ElementRef<'_>) -> bool {
    el.value().name() == "a" && el.value().attr("href").is_some()
}

fn has_class(el: &ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}
