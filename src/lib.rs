//! Web Connector: a browser-backed site crawler for indexing pipelines
//!
//! This crate walks a website (recursively, as a single page, from a sitemap,
//! or from an uploaded URL list), renders every page through a headless
//! browser, guards each request against SSRF targets, and hands the extracted
//! documents downstream in bounded batches.

pub mod browser;
pub mod capability;
pub mod config;
pub mod content;
pub mod crawler;
pub mod security;
pub mod sources;
pub mod url;

use thiserror::Error;

/// Fatal errors that abort a crawl run
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Failed to load seed URLs: {0}")]
    Source(#[from] sources::SourceError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("{}", no_valid_pages_message(.last_error))]
    NoValidPages { last_error: Option<String> },
}

fn no_valid_pages_message(last_error: &Option<String>) -> &str {
    last_error.as_deref().unwrap_or("No valid pages found.")
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unrecognized crawl mode: '{0}' (expected recursive, single, sitemap or upload)")]
    UnknownCrawlMode(String),

    #[error("No URLs to crawl for '{0}'")]
    EmptySeedList(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Errors confined to a single page
///
/// None of these abort the crawl: the loop records the message as the run's
/// last error and moves on to the next frontier entry.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Guard(#[from] security::GuardError),

    #[error(transparent)]
    Connectivity(#[from] security::ConnectivityError),

    #[error(transparent)]
    Browser(#[from] browser::BrowserError),

    #[error(transparent)]
    Pdf(#[from] content::PdfError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Result type alias for connector operations
pub type Result<T> = std::result::Result<T, ConnectorError>;

// Re-export commonly used types
pub use capability::Capability;
pub use config::{Config, CrawlMode};
pub use content::{Document, DocumentSource, Section};
pub use crawler::{CrawlStats, WebConnector};
