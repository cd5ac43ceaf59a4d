//! HTML link and title extraction
//!
//! This module handles parsing document markup to extract:
//! - Links to follow (from `<a>` tags)
//! - The page title
//! - The link matching a click target

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A followable link found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Absolute target URL
    pub url: Url,

    /// Visible text, whitespace-normalised
    pub text: String,

    /// The `title` attribute, if any
    pub title: Option<String>,
}

/// Extracts the page title from the HTML document
pub(crate) fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| normalize_whitespace(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

/// Extracts all followable `<a>` links from the HTML document
///
/// **Excluded:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only anchors
pub(crate) fn extract_links(document: &Html, base_url: &Url) -> Vec<Link> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| to_link(element, base_url))
        .collect()
}

/// Finds the first link whose text or identifying attribute equals `needle`
///
/// Compared after whitespace normalisation, in document order, against:
/// the visible text, the `title`, `id` and raw `href` attributes, and the
/// `alt` text of an image inside the anchor.
pub(crate) fn find_link(document: &Html, base_url: &Url, needle: &str) -> Option<Link> {
    let needle = normalize_whitespace(needle);
    if needle.is_empty() {
        return None;
    }

    let a_selector = Selector::parse("a[href]").ok()?;
    let img_selector = Selector::parse("img[alt]").ok()?;

    document
        .select(&a_selector)
        .filter(|element| link_matches(element, &img_selector, &needle))
        .find_map(|element| to_link(element, base_url))
}

fn link_matches(element: &ElementRef<'_>, img_selector: &Selector, needle: &str) -> bool {
    let value = element.value();

    if normalize_whitespace(&element.text().collect::<String>()) == needle {
        return true;
    }

    let attribute_match = ["title", "id", "href"]
        .iter()
        .filter_map(|name| value.attr(name))
        .any(|attr| normalize_whitespace(attr) == needle);
    if attribute_match {
        return true;
    }

    element
        .select(img_selector)
        .filter_map(|img| img.value().attr("alt"))
        .any(|alt| normalize_whitespace(alt) == needle)
}

fn to_link(element: ElementRef<'_>, base_url: &Url) -> Option<Link> {
    let href = element.value().attr("href")?;
    let url = resolve_link(href, base_url)?;

    Some(Link {
        url,
        text: normalize_whitespace(&element.text().collect::<String>()),
        title: element
            .value()
            .attr("title")
            .map(normalize_whitespace)
            .filter(|t| !t.is_empty()),
    })
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub(crate) fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    // Same page anchors
    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => Some(absolute_url),
        _ => None,
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
