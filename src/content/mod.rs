//! Document content: the produced data types and the extractors that fill them
//!
//! - `document`: `Document`, `Section` and the `WEB` source tag
//! - `cleanup`: rendered HTML to title + readable text
//! - `pdf`: PDF bytes to text + metadata

mod cleanup;
mod document;
mod pdf;

pub use cleanup::{extract_title, web_html_cleanup, ParsedHtml};
pub use document::{parse_last_modified, Document, DocumentSource, Section};
pub use pdf::{read_pdf, PdfContent, PdfError};
