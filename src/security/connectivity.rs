//! Connectivity prober
//!
//! A cheap reachability request issued before every page fetch. It tells the
//! operator *why* a page could not be reached (HTTP status, TLS, plain network
//! failure) instead of surfacing a generic browser navigation error.

use reqwest::Client;
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

/// Why a URL could not be reached
#[derive(Debug, Error)]
pub enum ConnectivityError {
    #[error("HTTP {code} ({label}) returned by {url}")]
    HttpStatus {
        url: String,
        code: u16,
        label: &'static str,
    },

    #[error("SSL error when connecting to {url}: {reason}")]
    Tls { url: String, reason: String },

    #[error("Unable to connect to {url}: {reason}")]
    Network { url: String, reason: String },
}

/// Maps the common HTTP error codes to a human label
pub fn status_label(code: u16) -> &'static str {
    match code {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "HTTP Error",
    }
}

/// Issues short-timeout GET requests to check that a URL answers
#[derive(Debug, Clone)]
pub struct ConnectivityProber {
    client: Client,
    timeout: Duration,
}

impl ConnectivityProber {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Checks that `url` responds with a status below 400
    pub async fn probe(&self, url: &str) -> Result<(), ConnectivityError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| classify_transport_error(url, &e))?;

        let code = response.status().as_u16();
        if code >= 400 {
            return Err(ConnectivityError::HttpStatus {
                url: url.to_string(),
                code,
                label: status_label(code),
            });
        }

        tracing::trace!("Connectivity check passed for {} ({})", url, code);
        Ok(())
    }
}

fn classify_transport_error(url: &str, error: &reqwest::Error) -> ConnectivityError {
    match tls_failure_reason(error) {
        Some(reason) => ConnectivityError::Tls {
            url: url.to_string(),
            reason,
        },
        None => ConnectivityError::Network {
            url: url.to_string(),
            reason: error.to_string(),
        },
    }
}

/// Walks the source chain; if any layer mentions TLS or certificates the
/// innermost message is returned as the reason
fn tls_failure_reason(error: &(dyn StdError + 'static)) -> Option<String> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(error);
    let mut is_tls = false;
    let mut innermost = None;

    while let Some(err) = current {
        let message = err.to_string();
        let lower = message.to_lowercase();
        if lower.contains("certificate") || lower.contains("tls") || lower.contains("ssl") {
            is_tls = true;
        }
        innermost = Some(message);
        current = err.source();
    }

    if is_tls {
        innermost
    } else {
        None
    }
}
