use super::{BrowserError, BrowserHandle, BrowserLauncher, RenderedPage};
use crate::config::Config;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{EventResponseReceived, ResourceType};
use chromiumoxide::Page;
use futures::{FutureExt, StreamExt};
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Launches local Chromium instances over the DevTools protocol
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    headless: bool,
    executable: Option<PathBuf>,
    page_timeout: Duration,
    request_timeout: Duration,
    user_agent: String,
}

impl ChromeLauncher {
    pub fn from_config(config: &Config) -> Self {
        Self {
            headless: config.browser.headless,
            executable: config.browser.executable.as_ref().map(PathBuf::from),
            page_timeout: Duration::from_secs(config.browser.page_timeout_secs),
            request_timeout: Duration::from_secs(config.browser.request_timeout_secs),
            user_agent: config.http.user_agent.clone(),
        }
    }

    fn cdp_config(&self) -> Result<CdpBrowserConfig, BrowserError> {
        let mut builder = CdpBrowserConfig::builder()
            .no_sandbox()
            .request_timeout(self.request_timeout)
            .arg(format!("--user-agent={}", self.user_agent))
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--no-first-run")
            .arg("--mute-audio");

        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &self.executable {
            builder = builder.chrome_executable(executable);
        }

        builder.build().map_err(BrowserError::Launch)
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserHandle>, BrowserError> {
        let config = self.cdp_config()?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler error: {:?}", e);
                }
            }
            tracing::debug!("Browser event handler finished");
        });

        tracing::info!("Browser launched (headless: {})", self.headless);

        Ok(Box::new(ChromeHandle {
            browser,
            handler,
            page_timeout: self.page_timeout,
            closed: false,
        }))
    }
}

/// A running Chromium plus the task pumping its protocol events
///
/// Dropping the handle aborts the event task; the `Browser` itself kills
/// the child process on drop.
pub struct ChromeHandle {
    browser: Browser,
    handler: JoinHandle<()>,
    page_timeout: Duration,
    closed: bool,
}

impl ChromeHandle {
    async fn render_on(&self, page: &Page, url: &str) -> Result<RenderedPage, BrowserError> {
        let mut responses = page.event_listener::<EventResponseReceived>().await?;

        match tokio::time::timeout(self.page_timeout, page.goto(url)).await {
            Err(_) => {
                return Err(BrowserError::Timeout {
                    url: url.to_string(),
                })
            }
            Ok(Err(e)) => {
                return Err(BrowserError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
            Ok(Ok(_)) => {}
        }

        let final_url = page.url().await?.unwrap_or_else(|| url.to_string());
        let html = page.content().await?;

        // Responses arrived during navigation; drain what is buffered
        let mut document = None;
        while let Some(Some(event)) = responses.next().now_or_never() {
            if !matches!(event.r#type, ResourceType::Document) {
                continue;
            }
            if event.response.url == final_url {
                document = Some(event);
                break;
            }
            if document.is_none() {
                document = Some(event);
            }
        }

        let (status, last_modified) = match document {
            Some(event) => (
                u16::try_from(event.response.status).ok(),
                header_value(event.response.headers.inner(), "last-modified"),
            ),
            None => (None, None),
        };

        Ok(RenderedPage {
            final_url,
            status,
            last_modified,
            html,
        })
    }
}

#[async_trait]
impl BrowserHandle for ChromeHandle {
    async fn render(&mut self, url: &str) -> Result<RenderedPage, BrowserError> {
        let page = self.browser.new_page("about:blank").await?;
        let result = self.render_on(&page, url).await;

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close page for {}: {}", url, e);
        }

        result
    }

    async fn shutdown(&mut self) -> Result<(), BrowserError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Failed to wait for browser exit: {}", e);
        }
        self.handler.abort();

        closed?;
        tracing::debug!("Browser shut down");
        Ok(())
    }
}

impl Drop for ChromeHandle {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// Case-insensitive lookup in a CDP header object
fn header_value(headers: &serde_json::Value, name: &str) -> Option<String> {
    headers
        .as_object()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, value)| value.as_str())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_header_value_case_insensitive() {
        let headers = json!({
            "Content-Type": "text/html",
            "Last-Modified": "Wed, 21 Oct 2015 07:28:00 GMT",
        });
        assert_eq!(
            header_value(&headers, "last-modified").as_deref(),
            Some("Wed, 21 Oct 2015 07:28:00 GMT")
        );
        assert_eq!(header_value(&headers, "etag"), None);
    }

    #[test]
    fn test_header_value_non_object() {
        assert_eq!(header_value(&json!(null), "last-modified"), None);
    }

    #[test]
    fn test_launcher_reads_config() {
        let mut config = Config::new("https://example.com", crate::CrawlMode::Single);
        config.browser.headless = false;
        config.browser.executable = Some("/usr/bin/chromium".to_string());
        config.browser.page_timeout_secs = 12;

        let launcher = ChromeLauncher::from_config(&config);
        assert!(!launcher.headless);
        assert_eq!(launcher.executable, Some(PathBuf::from("/usr/bin/chromium")));
        assert_eq!(launcher.page_timeout, Duration::from_secs(12));
    }
}
