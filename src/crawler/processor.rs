use crate::browser::BrowserSession;
use crate::content::{parse_last_modified, read_pdf, web_html_cleanup, Document};
use crate::crawler::frontier::Frontier;
use crate::security::{ConnectivityProber, SsrfGuard};
use crate::url::is_pdf_url;
use crate::PageError;
use reqwest::header::LAST_MODIFIED;
use reqwest::Client;
use scraper::Html;
use url::Url;

/// Result of processing one frontier entry
#[derive(Debug)]
pub enum PageOutcome {
    /// The page produced a document
    Indexed(Document),
    /// The page redirected to a URL this run already took
    AlreadyVisited { final_url: String },
    /// The page answered with an HTTP error status; holds the message to
    /// record as the run's last error
    Skipped(String),
}

/// Turns one URL into a document
///
/// Errors returned here are per-page: the crawl loop records them and
/// restarts the browser session before the next URL.
#[derive(Debug, Clone)]
pub struct PageProcessor {
    client: Client,
    prober: ConnectivityProber,
    guard: SsrfGuard,
    base_url: String,
    follow_links: bool,
    clean_mode: bool,
}

impl PageProcessor {
    pub fn new(
        client: Client,
        prober: ConnectivityProber,
        guard: SsrfGuard,
        base_url: String,
        follow_links: bool,
        clean_mode: bool,
    ) -> Self {
        Self {
            client,
            prober,
            guard,
            base_url,
            follow_links,
            clean_mode,
        }
    }

    pub async fn process(
        &self,
        url: &str,
        session: &mut BrowserSession,
        frontier: &mut Frontier,
    ) -> Result<PageOutcome, PageError> {
        self.prober.probe(url).await?;

        let parsed = Url::parse(url)?;
        if is_pdf_url(&parsed) {
            return self.process_pdf(url).await.map(PageOutcome::Indexed);
        }

        let page = session.render(url).await?;

        let mut current_url = url.to_string();
        if page.final_url != url {
            self.guard.validate(&page.final_url).await?;
            if !frontier.mark_visited(&page.final_url) {
                tracing::debug!("{} redirected to already visited {}", url, page.final_url);
                return Ok(PageOutcome::AlreadyVisited {
                    final_url: page.final_url,
                });
            }
            tracing::debug!("{} redirected to {}", url, page.final_url);
            current_url = page.final_url.clone();
        }

        let document = Html::parse_document(&page.html);

        // Links are taken before the status check, so error pages still
        // contribute to the frontier
        if self.follow_links {
            let current = Url::parse(&current_url)?;
            frontier.discover(&self.base_url, &current, &document);
        }

        if let Some(status) = page.status {
            if status >= 400 {
                return Ok(PageOutcome::Skipped(format!(
                    "Skipped indexing {} due to HTTP {} response",
                    current_url, status
                )));
            }
        }

        let parsed_html = web_html_cleanup(&document, self.clean_mode);
        let updated_at = page.last_modified.as_deref().and_then(parse_last_modified);

        Ok(PageOutcome::Indexed(Document::web_page(
            &current_url,
            parsed_html.title.as_deref(),
            parsed_html.cleaned_text,
            updated_at,
        )))
    }

    async fn process_pdf(&self, url: &str) -> Result<Document, PageError> {
        let http_error = |source| PageError::Http {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_error)?;

        let updated_at = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_last_modified);

        let bytes = response.bytes().await.map_err(http_error)?;
        let content = read_pdf(&bytes)?;

        tracing::debug!(
            "Extracted {} characters and {} metadata fields from {}",
            content.text.len(),
            content.metadata.len(),
            url
        );

        Ok(Document::pdf(url, content.text, content.metadata, updated_at))
    }
}
