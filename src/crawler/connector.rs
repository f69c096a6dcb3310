//! Crawl loop driving the frontier, the browser session and the batch emitter

use crate::browser::{BrowserLauncher, BrowserSession, ChromeLauncher};
use crate::capability::Capability;
use crate::config::{validate, Config, CrawlMode, HttpConfig};
use crate::content::Document;
use crate::crawler::batch::{BatchEmitter, CrawlOutcome};
use crate::crawler::frontier::Frontier;
use crate::crawler::processor::{PageOutcome, PageProcessor};
use crate::security::{ConnectivityProber, SsrfGuard};
use crate::url::normalize_url;
use crate::ConnectorError;
use futures::Stream;
use reqwest::redirect::Policy;
use reqwest::Client;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const CAPABILITIES: &[Capability] = &[Capability::BulkLoad];

/// Counters for one crawl run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    pub pages_visited: usize,
    pub documents_produced: usize,
    pub pages_skipped: usize,
    pub failures: usize,
    pub session_launches: usize,
}

impl fmt::Display for CrawlStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pages visited, {} documents, {} skipped, {} failures, {} browser launches",
            self.pages_visited,
            self.documents_produced,
            self.pages_skipped,
            self.failures,
            self.session_launches
        )
    }
}

const MAX_REDIRECTS: usize = 10;

/// Builds the HTTP client used for probes, PDFs and sitemaps
///
/// Every redirect hop goes through `guard` before it is followed.
pub fn build_http_client(config: &HttpConfig, guard: SsrfGuard) -> Result<Client, reqwest::Error> {
    let redirects = Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        match guard.validate_literal(attempt.url()) {
            Ok(()) => attempt.follow(),
            Err(e) => {
                tracing::warn!("Refusing redirect: {}", e);
                attempt.error(e)
            }
        }
    });

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(redirects)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Crawls a website and hands out its pages as batches of documents
///
/// Work happens only inside [`WebConnector::next_batch`]: each call resumes
/// the crawl where the previous one stopped and runs until a batch is full or
/// the frontier is exhausted. A connector is single use; once it returns
/// `None` or an error, every later call returns `None`.
pub struct WebConnector {
    mode: CrawlMode,
    base_url: String,
    client: Client,
    guard: SsrfGuard,
    processor: PageProcessor,
    session: BrowserSession,
    frontier: Frontier,
    seeded: bool,
    emitter: BatchEmitter,
    outcome: CrawlOutcome,
    stats: CrawlStats,
    finished: bool,
}

impl WebConnector {
    /// Creates a connector rendering pages with a local Chromium
    pub fn new(config: &Config) -> Result<Self, ConnectorError> {
        Self::with_launcher(config, Arc::new(ChromeLauncher::from_config(config)))
    }

    /// Creates a connector rendering pages with `launcher`
    pub fn with_launcher(
        config: &Config,
        launcher: Arc<dyn BrowserLauncher>,
    ) -> Result<Self, ConnectorError> {
        validate(config)?;

        if !config.credentials.is_empty() {
            tracing::warn!(
                "Ignoring {} credential entries; the web connector does not authenticate",
                config.credentials.len()
            );
        }

        let mode = config.connector.crawl_mode;
        let base_url = match mode {
            CrawlMode::UploadList => config.connector.base_url.clone(),
            _ => normalize_url(&config.connector.base_url)?.to_string(),
        };

        let guard = SsrfGuard::new(config.security.ssrf_protection);
        let client = build_http_client(&config.http, guard)?;
        let prober = ConnectivityProber::new(
            client.clone(),
            Duration::from_secs(config.http.probe_timeout_secs),
        );
        let processor = PageProcessor::new(
            client.clone(),
            prober,
            guard,
            base_url.clone(),
            mode.follows_links(),
            config.connector.clean_mode,
        );

        tracing::info!(
            "Web connector ready: {} in {} mode, batch size {}",
            base_url,
            mode,
            config.connector.batch_size
        );

        Ok(Self {
            mode,
            base_url,
            client,
            guard,
            processor,
            session: BrowserSession::new(launcher),
            frontier: Frontier::new(),
            seeded: false,
            emitter: BatchEmitter::new(config.connector.batch_size),
            outcome: CrawlOutcome::default(),
            stats: CrawlStats::default(),
            finished: false,
        })
    }

    /// What this connector can do for an indexing pipeline
    pub fn capabilities(&self) -> &'static [Capability] {
        CAPABILITIES
    }

    pub fn stats(&self) -> CrawlStats {
        CrawlStats {
            session_launches: self.session.launches(),
            ..self.stats
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Crawls until the next batch is ready
    ///
    /// Returns `Ok(None)` once the frontier is exhausted and everything has
    /// been handed out. A run that never produced a document ends with
    /// [`ConnectorError::NoValidPages`] instead.
    pub async fn next_batch(&mut self) -> crate::Result<Option<Vec<Document>>> {
        if self.finished {
            return Ok(None);
        }

        let result = self.crawl_until_batch().await;
        if !matches!(result, Ok(Some(_))) {
            self.finished = true;
            self.session.close().await;
            tracing::info!("Crawl finished: {}", self.stats());
        }
        result
    }

    /// Stops the crawl and shuts the browser down
    pub async fn close(&mut self) {
        self.finished = true;
        self.session.close().await;
    }

    /// Adapts the connector into a stream of batches
    pub fn into_batches(self) -> impl Stream<Item = Result<Vec<Document>, ConnectorError>> {
        futures::stream::try_unfold(self, |mut connector| async move {
            match connector.next_batch().await? {
                Some(batch) => Ok(Some((batch, connector))),
                None => Ok(None),
            }
        })
    }

    async fn crawl_until_batch(&mut self) -> crate::Result<Option<Vec<Document>>> {
        if !self.seeded {
            self.frontier = Frontier::seed(self.mode, &self.base_url, &self.client).await?;
            self.seeded = true;
            tracing::info!("Frontier seeded with {} URLs", self.frontier.pending());
        }

        while let Some(url) = self.frontier.pop() {
            self.stats.pages_visited += 1;
            tracing::info!("Visiting {}", url);

            if let Err(e) = self.guard.validate(&url).await {
                let message = e.to_string();
                tracing::warn!("Skipping {}: {}", url, message);
                self.outcome.record_error(message);
                self.stats.pages_skipped += 1;
                continue;
            }

            match self
                .processor
                .process(&url, &mut self.session, &mut self.frontier)
                .await
            {
                Ok(PageOutcome::Indexed(document)) => {
                    self.stats.documents_produced += 1;
                    if self.emitter.push(document) {
                        self.session.close().await;
                        let batch = self.emitter.take();
                        self.outcome.produced_any = true;
                        tracing::info!("Emitting batch of {} documents", batch.len());
                        return Ok(Some(batch));
                    }
                }
                Ok(PageOutcome::AlreadyVisited { final_url }) => {
                    tracing::debug!("Skipping {}: {} was already crawled", url, final_url);
                }
                Ok(PageOutcome::Skipped(message)) => {
                    tracing::warn!("{}", message);
                    self.outcome.record_error(message);
                    self.stats.pages_skipped += 1;
                }
                Err(e) => {
                    let message = format!("Failed to fetch '{}': {}", url, e);
                    tracing::error!("{}", message);
                    self.outcome.record_error(message);
                    self.stats.failures += 1;
                    self.session.close().await;
                }
            }
        }

        self.session.close().await;

        if let Some(batch) = self.emitter.remainder() {
            self.outcome.produced_any = true;
            tracing::info!("Emitting final batch of {} documents", batch.len());
            return Ok(Some(batch));
        }

        match self.outcome.terminal_error() {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for WebConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebConnector")
            .field("mode", &self.mode)
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .field("pending", &self.frontier.pending())
            .field("stats", &self.stats)
            .field("finished", &self.finished)
            .finish()
    }
}
