//! Web connector command-line entry point
//!
//! Crawls the site described by a TOML configuration file and writes every
//! produced document as one JSON line.

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use web_connector::config::{load_config_with_hash, validate, Config};
use web_connector::{CrawlMode, WebConnector};

/// Web connector: crawl a website into indexable documents
///
/// Pages are rendered in a headless browser, cleaned to readable text and
/// emitted in batches. Every request is checked against private and
/// reserved network ranges first.
#[derive(Parser, Debug)]
#[command(name = "web-connector")]
#[command(version)]
#[command(about = "Crawl a website into indexable documents", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the crawl mode (recursive, single, sitemap, upload)
    #[arg(long, value_name = "MODE")]
    mode: Option<CrawlMode>,

    /// Override the base URL (or URL list path in upload mode)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Override the number of documents per batch
    #[arg(long, value_name = "N")]
    batch_size: Option<usize>,

    /// Validate config and show the effective settings without crawling
    #[arg(long)]
    dry_run: bool,

    /// Write documents to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    apply_overrides(&mut config, &cli);
    validate(&config).context("invalid configuration after command-line overrides")?;

    if cli.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    let output: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    handle_crawl(&config, BufWriter::new(output)).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("web_connector=info,warn"),
            1 => EnvFilter::new("web_connector=debug,info"),
            2 => EnvFilter::new("web_connector=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Documents go to stdout, so logs stay on stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(mode) = cli.mode {
        config.connector.crawl_mode = mode;
    }
    if let Some(base_url) = &cli.base_url {
        config.connector.base_url = base_url.clone();
    }
    if let Some(batch_size) = cli.batch_size {
        config.connector.batch_size = batch_size;
    }
}

fn print_dry_run(config: &Config) {
    println!("=== Web Connector Dry Run ===\n");

    println!("Connector:");
    println!("  Base URL: {}", config.connector.base_url);
    println!("  Crawl mode: {}", config.connector.crawl_mode);
    println!("  Clean mode: {}", config.connector.clean_mode);
    println!("  Batch size: {}", config.connector.batch_size);

    println!("\nSecurity:");
    println!("  SSRF protection: {}", config.security.ssrf_protection);

    println!("\nBrowser:");
    println!("  Headless: {}", config.browser.headless);
    println!(
        "  Executable: {}",
        config.browser.executable.as_deref().unwrap_or("(auto-detect)")
    );
    println!("  Page timeout: {}s", config.browser.page_timeout_secs);

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Probe timeout: {}s", config.http.probe_timeout_secs);
    println!("  Request timeout: {}s", config.http.request_timeout_secs);

    if !config.credentials.is_empty() {
        println!(
            "\nCredentials: {} entries (ignored)",
            config.credentials.len()
        );
    }

    println!("\n✓ Configuration is valid");
}

async fn handle_crawl<W: Write>(config: &Config, mut out: W) -> Result<()> {
    let connector = WebConnector::new(config)?;
    let batches = connector.into_batches();
    futures::pin_mut!(batches);

    let mut batch_count = 0usize;
    let mut document_count = 0usize;

    while let Some(batch) = batches.next().await {
        let batch = batch?;
        batch_count += 1;
        document_count += batch.len();

        for document in &batch {
            serde_json::to_writer(&mut out, document)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
    }

    tracing::info!(
        "Wrote {} documents in {} batches",
        document_count,
        batch_count
    );
    Ok(())
}
