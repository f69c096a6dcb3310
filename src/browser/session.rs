use super::{BrowserError, BrowserHandle, BrowserLauncher, RenderedPage};
use std::sync::Arc;

/// Browser lifecycle owned by one crawl
///
/// At most one browser is alive at a time. `ensure` launches lazily,
/// `close` is idempotent, and dropping the session drops the handle,
/// which kills the browser process.
pub struct BrowserSession {
    launcher: Arc<dyn BrowserLauncher>,
    handle: Option<Box<dyn BrowserHandle>>,
    launches: usize,
}

impl BrowserSession {
    pub fn new(launcher: Arc<dyn BrowserLauncher>) -> Self {
        Self {
            launcher,
            handle: None,
            launches: 0,
        }
    }

    /// Launches a browser unless one is already running
    pub async fn ensure(&mut self) -> Result<(), BrowserError> {
        if self.handle.is_none() {
            tracing::debug!("Launching browser");
            let handle = self.launcher.launch().await?;
            self.handle = Some(handle);
            self.launches += 1;
        }
        Ok(())
    }

    /// Renders `url`, launching the browser first if needed
    pub async fn render(&mut self, url: &str) -> Result<RenderedPage, BrowserError> {
        self.ensure().await?;
        match self.handle.as_mut() {
            Some(handle) => handle.render(url).await,
            None => Err(BrowserError::Launch("browser not running".to_string())),
        }
    }

    /// Stops the running browser, if any
    ///
    /// Shutdown failures are logged; the handle is released either way so the
    /// next `ensure` starts clean.
    pub async fn close(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            if let Err(e) = handle.shutdown().await {
                tracing::warn!("Browser did not shut down cleanly: {}", e);
            }
        }
    }

    pub fn is_alive(&self) -> bool {
        self.handle.is_some()
    }

    /// Number of browsers started over the session's lifetime
    pub fn launches(&self) -> usize {
        self.launches
    }
}

impl std::fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserSession")
            .field("alive", &self.is_alive())
            .field("launches", &self.launches)
            .finish()
    }
}
