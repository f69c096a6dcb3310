//! Link extraction from rendered pages
//!
//! Only `<a href>` links are followed. Links are resolved against the page
//! they were found on, stripped of fragments and kept only when they belong
//! to the crawl (same site as the page, underneath the base URL).

use crate::url::is_internal_link;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Returns the internal links of `document`, in document order, without
/// duplicates
///
/// # Example
///
/// ```
/// use scraper::Html;
/// use url::Url;
/// use web_connector::crawler::internal_links;
///
/// let page = Url::parse("https://example.com/docs/").unwrap();
/// let html = Html::parse_document(r#"<a href="intro">Intro</a><a href="https://other.com/">Out</a>"#);
/// let links = internal_links("https://example.com/docs", &page, &html);
/// assert_eq!(links, vec!["https://example.com/docs/intro".to_string()]);
/// ```
pub fn internal_links(base: &str, current: &Url, document: &Html) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Some(resolved) = resolve_link(href, current) else {
            continue;
        };

        if !is_internal_link(base, current, &resolved) {
            continue;
        }

        let link = resolved.to_string();
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }

    links
}

/// Resolves an href against the page URL
///
/// Returns None for empty and fragment-only hrefs, `javascript:`, `mailto:`,
/// `tel:` and `data:` links, and anything that is not HTTP(S) once resolved.
fn resolve_link(href: &str, current: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let mut resolved = current.join(href).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }
    resolved.set_fragment(None);

    Some(resolved)
}
