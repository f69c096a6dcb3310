use crate::config::types::{BrowserConfig, Config, ConnectorConfig, HttpConfig};
use crate::ConfigError;

/// Largest batch the connector will hold in memory
const MAX_BATCH_SIZE: usize = 10_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_connector_config(&config.connector)?;
    validate_browser_config(&config.browser)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates crawl target and batching
fn validate_connector_config(config: &ConnectorConfig) -> Result<(), ConfigError> {
    if config.base_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "base_url cannot be empty".to_string(),
        ));
    }

    if config.batch_size < 1 || config.batch_size > MAX_BATCH_SIZE {
        return Err(ConfigError::Validation(format!(
            "batch_size must be between 1 and {}, got {}",
            MAX_BATCH_SIZE, config.batch_size
        )));
    }

    Ok(())
}

/// Validates browser settings
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.page_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "browser page_timeout_secs must be > 0".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "browser request_timeout_secs must be > 0".to_string(),
        ));
    }

    if let Some(executable) = &config.executable {
        if executable.trim().is_empty() {
            return Err(ConfigError::Validation(
                "browser executable cannot be an empty path".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates HTTP client settings
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.probe_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "probe_timeout_secs must be > 0".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "http request_timeout_secs must be > 0".to_string(),
        ));
    }

    Ok(())
}
