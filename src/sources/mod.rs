//! Seed URL sources
//!
//! Resolves a crawl mode plus its base URL into the initial URL list:
//! the base URL itself, the pages a sitemap lists, or the lines of an
//! uploaded file.

mod sitemap;
mod upload;

pub use sitemap::{list_sitemap_urls, parse_sitemap, SitemapEntries};
pub use upload::{parse_url_list, read_url_list};

use crate::config::CrawlMode;
use crate::url::normalize_url;
use crate::{ConfigError, ConnectorError, UrlError};
use reqwest::Client;
use thiserror::Error;

/// Errors raised while loading seed URLs
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to fetch sitemap {url}: {source}")]
    Sitemap {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("sitemap {url} returned HTTP {status}")]
    SitemapStatus { url: String, status: u16 },

    #[error("failed to read URL list {path}: {source}")]
    UploadRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: UrlError,
    },
}

/// Resolves the seed URLs for a crawl
///
/// The returned list is in source order and never empty.
pub async fn seed_urls(
    mode: CrawlMode,
    base_url: &str,
    client: &Client,
) -> Result<Vec<String>, ConnectorError> {
    let seeds = match mode {
        CrawlMode::Recursive | CrawlMode::Single => vec![normalize_base(base_url)?],
        CrawlMode::Sitemap => {
            let sitemap_url = normalize_base(base_url)?;
            list_sitemap_urls(client, &sitemap_url).await?
        }
        CrawlMode::UploadList => read_url_list(base_url).await?,
    };

    if seeds.is_empty() {
        return Err(ConfigError::EmptySeedList(base_url.to_string()).into());
    }

    tracing::info!("Resolved {} seed URLs in {} mode", seeds.len(), mode);
    Ok(seeds)
}

fn normalize_base(base_url: &str) -> Result<String, SourceError> {
    normalize_url(base_url)
        .map(|url| url.to_string())
        .map_err(|source| SourceError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })
}
