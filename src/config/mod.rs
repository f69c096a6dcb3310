//! Configuration module for the web connector
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use web_connector::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("connector.toml")).unwrap();
//! println!("Crawling {} in {} mode", config.connector.base_url, config.connector.crawl_mode);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, Config, ConnectorConfig, CrawlMode, HttpConfig, SecurityConfig,
    DEFAULT_BATCH_SIZE,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

pub use validation::validate;
