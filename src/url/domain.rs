use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use web_connector::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if both URLs share host and effective port
///
/// This is the "network location" comparison: `https://a.com` and
/// `https://a.com:443` are the same site, `https://a.com:8443` is not.
pub fn same_site(a: &Url, b: &Url) -> bool {
    extract_domain(a) == extract_domain(b) && a.port_or_known_default() == b.port_or_known_default()
}

/// Returns true if `candidate` belongs to the crawl rooted at `base`
///
/// A link is internal when it lives on the same site as the page it was
/// found on and sits underneath the crawl's base URL.
pub fn is_internal_link(base: &str, current: &Url, candidate: &Url) -> bool {
    same_site(current, candidate) && candidate.as_str().starts_with(base)
}
