//! Headless browser abstraction
//!
//! The crawler renders pages through a `BrowserHandle` obtained from a
//! `BrowserLauncher`. `ChromeLauncher` drives a real Chromium over CDP;
//! anything else implementing the two traits (a scripted fake in tests,
//! a remote browser service) can be swapped in.
//!
//! `BrowserSession` owns the lifecycle: lazy launch, idempotent close and
//! relaunch after a failure or a batch boundary.

mod chrome;
mod session;

pub use chrome::{ChromeHandle, ChromeLauncher};
pub use session::BrowserSession;

use async_trait::async_trait;
use thiserror::Error;

/// A page after the browser finished navigating to it
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    /// URL the browser ended up on after redirects
    pub final_url: String,
    /// HTTP status of the main document response, when the browser saw one
    pub status: Option<u16>,
    /// Raw `Last-Modified` header of the main document response
    pub last_modified: Option<String>,
    /// Rendered DOM serialized back to HTML
    pub html: String,
}

/// Errors raised by a browser backend
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("timed out loading {url}")]
    Timeout { url: String },

    #[error("browser protocol error: {0}")]
    Protocol(#[from] chromiumoxide::error::CdpError),
}

/// Starts browser instances
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserHandle>, BrowserError>;
}

/// A running browser instance
#[async_trait]
pub trait BrowserHandle: Send {
    /// Opens `url` in a fresh page and returns the rendered result
    async fn render(&mut self, url: &str) -> Result<RenderedPage, BrowserError>;

    /// Stops the browser. Calling it again is a no-op.
    async fn shutdown(&mut self) -> Result<(), BrowserError>;
}
