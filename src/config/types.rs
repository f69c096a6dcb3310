use crate::ConfigError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Default number of documents per emitted batch
pub const DEFAULT_BATCH_SIZE: usize = 16;

/// Main configuration structure for the web connector
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub connector: ConnectorConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub http: HttpConfig,
    /// Credentials are accepted for interface compatibility and never used
    #[serde(default)]
    pub credentials: BTreeMap<String, String>,
}

impl Config {
    /// Builds a configuration with default settings for everything but the
    /// crawl target
    pub fn new(base_url: impl Into<String>, crawl_mode: CrawlMode) -> Self {
        Self {
            connector: ConnectorConfig {
                base_url: base_url.into(),
                crawl_mode,
                clean_mode: false,
                batch_size: DEFAULT_BATCH_SIZE,
            },
            security: SecurityConfig::default(),
            browser: BrowserConfig::default(),
            http: HttpConfig::default(),
            credentials: BTreeMap::new(),
        }
    }
}

/// What to crawl and how to batch it
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectorConfig {
    /// Seed URL, sitemap URL, or path to an uploaded URL list depending on the mode
    #[serde(rename = "base-url")]
    pub base_url: String,

    #[serde(rename = "crawl-mode", default)]
    pub crawl_mode: CrawlMode,

    /// Use the stricter content cleanup variant
    #[serde(rename = "clean-mode", default)]
    pub clean_mode: bool,

    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,
}

/// Network safety policy
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Reject URLs that resolve to non-public addresses
    #[serde(rename = "ssrf-protection", default = "default_true")]
    pub ssrf_protection: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            ssrf_protection: true,
        }
    }
}

/// Headless browser settings
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Chrome/Chromium binary; auto-detected when absent
    #[serde(default)]
    pub executable: Option<String>,

    /// Upper bound for a single page navigation (seconds)
    #[serde(rename = "page-timeout-secs", default = "default_page_timeout")]
    pub page_timeout_secs: u64,

    /// Upper bound for a single DevTools protocol request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            page_timeout_secs: default_page_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Plain HTTP client settings (connectivity probe, PDFs, sitemaps)
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(rename = "probe-timeout-secs", default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            probe_timeout_secs: default_probe_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// How the initial frontier is populated and whether links are followed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlMode {
    /// Start at the base URL and follow internal links
    #[default]
    Recursive,
    /// Fetch only the base URL
    Single,
    /// Fetch every URL listed in the sitemap at the base URL
    Sitemap,
    /// Fetch every URL listed in the file at the base URL path
    #[serde(rename = "upload")]
    UploadList,
}

impl CrawlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recursive => "recursive",
            Self::Single => "single",
            Self::Sitemap => "sitemap",
            Self::UploadList => "upload",
        }
    }

    /// Returns true if internal links are pushed onto the frontier
    pub fn follows_links(&self) -> bool {
        matches!(self, Self::Recursive)
    }
}

impl fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CrawlMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recursive" => Ok(Self::Recursive),
            "single" => Ok(Self::Single),
            "sitemap" => Ok(Self::Sitemap),
            "upload" => Ok(Self::UploadList),
            _ => Err(ConfigError::UnknownCrawlMode(s.to_string())),
        }
    }
}

// Routed through FromStr so TOML and the command line accept the same
// mode names.
impl<'de> Deserialize<'de> for CrawlMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_true() -> bool {
    true
}

fn default_page_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    30
}

fn default_probe_timeout() -> u64 {
    3
}

fn default_user_agent() -> String {
    format!("web-connector/{}", env!("CARGO_PKG_VERSION"))
}
