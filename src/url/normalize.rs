use crate::UrlError;
use url::{ParseError, Url};

/// Prepends `https://` to bare hosts such as `docs.example.com/guide`
///
/// Input that already carries a scheme (`mailto:`, `ftp://`) or is a
/// path (`/docs/a`) is returned unchanged so parsing rejects it later.
/// `host:port` counts as a bare host.
///
/// # Examples
///
/// ```
/// use web_connector::url::ensure_scheme;
///
/// assert_eq!(ensure_scheme("example.com"), "https://example.com");
/// assert_eq!(ensure_scheme("localhost:3000/a"), "https://localhost:3000/a");
/// assert_eq!(ensure_scheme("http://example.com"), "http://example.com");
/// assert_eq!(ensure_scheme("mailto:x@y.z"), "mailto:x@y.z");
/// assert_eq!(ensure_scheme("/docs/a"), "/docs/a");
/// ```
pub fn ensure_scheme(raw: &str) -> String {
    let trimmed = raw.trim();
    let bare_host = match Url::parse(trimmed) {
        Err(ParseError::RelativeUrlWithoutBase) => !trimmed.starts_with('/'),
        // "example.com:8080" parses with "example.com" as its scheme
        Ok(url) => url.cannot_be_a_base() && url.path().starts_with(|c: char| c.is_ascii_digit()),
        Err(_) => false,
    };

    if bare_host {
        format!("https://{}", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Normalizes a URL into the canonical string used for dedup
///
/// # Normalization Steps
///
/// 1. Add `https://` when no scheme is present
/// 2. Parse the URL; reject if malformed
/// 3. Reject anything but HTTP and HTTPS
/// 4. Reject URLs without a host
/// 5. Remove the fragment (everything after #)
///
/// Parsing already lowercases the host, drops default ports and resolves
/// dot segments, so two spellings of the same page produce the same string.
///
/// # Examples
///
/// ```
/// use web_connector::url::normalize_url;
///
/// let url = normalize_url("HTTPS://Example.COM/a/../guide#install").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/guide");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let with_scheme = ensure_scheme(url_str);
    let mut url = Url::parse(&with_scheme).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingDomain),
    }

    url.set_fragment(None);

    Ok(url)
}

/// Returns true if the URL path names a PDF document
pub fn is_pdf_url(url: &Url) -> bool {
    url.path().to_ascii_lowercase().ends_with(".pdf")
}
