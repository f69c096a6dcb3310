use crate::sources::SourceError;
use crate::url::normalize_url;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// What a sitemap document lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapEntries {
    /// A `<urlset>`: page URLs
    Pages(Vec<String>),
    /// A `<sitemapindex>`: URLs of further sitemaps
    Index(Vec<String>),
}

/// Lists every page URL reachable from the sitemap at `sitemap_url`
///
/// Sitemap indexes are followed one level deep. A nested sitemap that fails
/// to load is logged and skipped; the top-level sitemap failing is an error.
/// Relative `<loc>` entries resolve against the sitemap that lists them.
pub async fn list_sitemap_urls(client: &Client, sitemap_url: &str) -> Result<Vec<String>, SourceError> {
    let base = normalize_url(sitemap_url).map_err(|source| SourceError::InvalidBaseUrl {
        url: sitemap_url.to_string(),
        source,
    })?;
    let body = fetch_sitemap(client, base.as_str()).await?;

    let pages = match parse_sitemap(&body) {
        SitemapEntries::Index(children) => {
            tracing::info!(
                "Sitemap {} is an index of {} sitemaps",
                sitemap_url,
                children.len()
            );
            let mut pages = Vec::new();
            for child in dedup_normalized(&base, children) {
                let Ok(child_base) = Url::parse(&child) else {
                    continue;
                };
                match fetch_sitemap(client, &child).await {
                    Ok(child_body) => match parse_sitemap(&child_body) {
                        SitemapEntries::Pages(child_pages) => {
                            pages.extend(dedup_normalized(&child_base, child_pages))
                        }
                        SitemapEntries::Index(_) => {
                            tracing::warn!("Ignoring nested sitemap index {}", child)
                        }
                    },
                    Err(e) => tracing::warn!("Skipping sitemap {}: {}", child, e),
                }
            }
            pages
        }
        SitemapEntries::Pages(pages) => pages,
    };

    Ok(dedup_normalized(&base, pages))
}

async fn fetch_sitemap(client: &Client, url: &str) -> Result<String, SourceError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| SourceError::Sitemap {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::SitemapStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|source| SourceError::Sitemap {
        url: url.to_string(),
        source,
    })
}

/// Parses sitemap XML into its `<loc>` entries
pub fn parse_sitemap(xml: &str) -> SitemapEntries {
    let document = Html::parse_document(xml);

    let is_index = Selector::parse("sitemapindex")
        .map(|selector| document.select(&selector).next().is_some())
        .unwrap_or(false);

    let entry_selector = if is_index { "sitemap > loc" } else { "url > loc" };
    let mut locations = select_text(&document, entry_selector);

    // Some generators omit the wrappers; fall back to any <loc>
    if locations.is_empty() {
        locations = select_text(&document, "loc");
    }

    if is_index {
        SitemapEntries::Index(locations)
    } else {
        SitemapEntries::Pages(locations)
    }
}

fn select_text(document: &Html, selector: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Resolves each entry against `base`, normalizes it and drops repeats
fn dedup_normalized(base: &Url, urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for raw in urls {
        let resolved = match base.join(&raw) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Skipping sitemap entry '{}': {}", raw, e);
                continue;
            }
        };
        match normalize_url(resolved.as_str()) {
            Ok(url) => {
                let url = url.to_string();
                if seen.insert(url.clone()) {
                    result.push(url);
                }
            }
            Err(e) => tracing::warn!("Skipping sitemap entry '{}': {}", raw, e),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_urlset() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/</loc><lastmod>2024-01-01</lastmod></url>
  <url><loc> https://example.com/docs </loc></url>
</urlset>"#;

        assert_eq!(
            parse_sitemap(xml),
            SitemapEntries::Pages(vec![
                "https://example.com/".to_string(),
                "https://example.com/docs".to_string(),
            ])
        );
    }

    #[test]
    fn test_parse_sitemap_index() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://example.com/sitemap-1.xml</loc></sitemap>
  <sitemap><loc>https://example.com/sitemap-2.xml</loc></sitemap>
</sitemapindex>"#;

        assert_eq!(
            parse_sitemap(xml),
            SitemapEntries::Index(vec![
                "https://example.com/sitemap-1.xml".to_string(),
                "https://example.com/sitemap-2.xml".to_string(),
            ])
        );
    }

    #[test]
    fn test_empty_sitemap() {
        assert_eq!(
            parse_sitemap("<urlset></urlset>"),
            SitemapEntries::Pages(vec![])
        );
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let urls = vec![
            "https://example.com/b".to_string(),
            "https://example.com/a".to_string(),
            "https://example.com/b#frag".to_string(),
            "ftp://example.com/c".to_string(),
        ];
        let base = Url::parse("https://example.com/sitemap.xml").unwrap();
        assert_eq!(
            dedup_normalized(&base, urls),
            vec![
                "https://example.com/b".to_string(),
                "https://example.com/a".to_string(),
            ]
        );
    }

    #[test]
    fn test_relative_entries_resolve_against_sitemap() {
        let urls = vec![
            "/docs/a".to_string(),
            "guide/b".to_string(),
            "https://example.com/docs/a".to_string(),
            "mailto:team@example.com".to_string(),
        ];
        let base = Url::parse("https://example.com/en/sitemap.xml").unwrap();
        assert_eq!(
            dedup_normalized(&base, urls),
            vec![
                "https://example.com/docs/a".to_string(),
                "https://example.com/en/guide/b".to_string(),
            ]
        );
    }
}
