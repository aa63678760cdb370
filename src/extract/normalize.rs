// src/extract/normalize.rs
// =============================================================================
// URL normalization shared by every extractor.
//
// All comparisons in the crawler (visited set, exclusion list, prefix filter)
// happen on the same absolute form:
// - surrounding whitespace trimmed
// - relative hrefs joined against the page URL
// - fragment removed (`/a/#comments` and `/a/` are the same page)
// - only http and https kept
// =============================================================================

use url::Url;

/// Resolves an href found on `base` into its normalized absolute form.
///
/// Returns None for anchors, mail/phone/script links and anything that
/// doesn't parse.
///
/// Examples:
///   base = "https://example.com/mag/page/2/"
///   href = "/mag/foo/"         -> Some("https://example.com/mag/foo/")
///   href = " ../bar/ "         -> Some("https://example.com/mag/page/bar/")
///   href = "/mag/foo/#respond" -> Some("https://example.com/mag/foo/")
///   href = "mailto:a@b.c"      -> None
pub fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    finish(&mut url)
}

/// Normalizes an already-absolute URL (start URL, exclusion entries).
pub fn normalize_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    finish(&mut url)
}

fn finish(url: &mut Url) -> Option<String> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_fragment(None);
    Some(url.to_string())
}
