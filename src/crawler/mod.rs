//! Crawler module: the pull-based crawl loop and its parts
//!
//! - `frontier`: to-visit stack plus visited set
//! - `parser`: internal link extraction
//! - `processor`: one URL in, one document (or a skip) out
//! - `batch`: bounded batching and the end-of-run failure contract
//! - `connector`: `WebConnector`, tying the above to a browser session

mod batch;
mod connector;
mod frontier;
mod parser;
mod processor;

pub use batch::{BatchEmitter, CrawlOutcome};
pub use connector::{build_http_client, CrawlStats, WebConnector};
pub use frontier::Frontier;
pub use parser::internal_links;
pub use processor::{PageOutcome, PageProcessor};
