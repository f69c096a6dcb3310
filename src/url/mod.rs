//! URL handling module
//!
//! This module provides URL normalization and the same-site checks used to
//! decide which discovered links belong to a crawl.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, is_internal_link, same_site};
pub use normalize::{ensure_scheme, is_pdf_url, normalize_url};
