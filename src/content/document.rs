use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Origin tag carried by every document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentSource {
    Web,
}

/// A linked run of text inside a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub link: String,
    pub text: String,
}

/// A normalized unit of content handed to the indexing pipeline
///
/// Documents are immutable once built: fields are only exposed through
/// accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    id: String,
    sections: Vec<Section>,
    source: DocumentSource,
    semantic_identifier: String,
    metadata: BTreeMap<String, String>,
    updated_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Builds the document for a rendered HTML page
    ///
    /// The page title names the document; pages without one fall back to
    /// their URL.
    pub fn web_page(
        url: &str,
        title: Option<&str>,
        text: String,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        let semantic_identifier = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(url)
            .to_string();

        Self {
            id: url.to_string(),
            sections: vec![Section {
                link: url.to_string(),
                text,
            }],
            source: DocumentSource::Web,
            semantic_identifier,
            metadata: BTreeMap::new(),
            updated_at,
        }
    }

    /// Builds the document for a downloaded PDF, named after its file name
    pub fn pdf(
        url: &str,
        text: String,
        metadata: BTreeMap<String, String>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        let file_name = url
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or(url)
            .to_string();

        Self {
            id: url.to_string(),
            sections: vec![Section {
                link: url.to_string(),
                text,
            }],
            source: DocumentSource::Web,
            semantic_identifier: file_name,
            metadata,
            updated_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn source(&self) -> DocumentSource {
        self.source
    }

    pub fn semantic_identifier(&self) -> &str {
        &self.semantic_identifier
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

/// Parses a `Last-Modified` header value (HTTP-date, RFC 2822 family)
///
/// Unparsable values yield `None`; a bad header never fails a page.
pub fn parse_last_modified(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    let parsed = DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| dt.with_timezone(&Utc));

    match parsed {
        Ok(dt) => Some(dt),
        Err(e) => {
            tracing::debug!("Ignoring unparsable Last-Modified '{}': {}", value, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_web_page_uses_title() {
        let doc = Document::web_page("https://example.com/", Some("Home"), "hello".into(), None);
        assert_eq!(doc.id(), "https://example.com/");
        assert_eq!(doc.semantic_identifier(), "Home");
        assert_eq!(doc.sections().len(), 1);
        assert_eq!(doc.sections()[0].link, "https://example.com/");
        assert_eq!(doc.sections()[0].text, "hello");
        assert_eq!(doc.source(), DocumentSource::Web);
        assert!(doc.metadata().is_empty());
    }

    #[test]
    fn test_web_page_without_title_falls_back_to_url() {
        let doc = Document::web_page("https://example.com/a", Some("   "), String::new(), None);
        assert_eq!(doc.semantic_identifier(), "https://example.com/a");

        let doc = Document::web_page("https://example.com/b", None, String::new(), None);
        assert_eq!(doc.semantic_identifier(), "https://example.com/b");
    }

    #[test]
    fn test_pdf_named_after_file() {
        let mut metadata = BTreeMap::new();
        metadata.insert("Author".to_string(), "Jane".to_string());
        let doc = Document::pdf("https://example.com/files/report.pdf", "text".into(), metadata, None);
        assert_eq!(doc.semantic_identifier(), "report.pdf");
        assert_eq!(doc.metadata().get("Author").map(String::as_str), Some("Jane"));
    }

    #[test]
    fn test_serializes_source_tag() {
        let doc = Document::web_page("https://example.com/", None, String::new(), None);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["source"], "WEB");
        assert_eq!(json["sections"][0]["link"], "https://example.com/");
    }

    #[test]
    fn test_parse_http_date() {
        let parsed = parse_last_modified("Wed, 21 Oct 2015 07:28:00 GMT").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap());
    }

    #[test]
    fn test_parse_garbage_last_modified() {
        assert_eq!(parse_last_modified("yesterday-ish"), None);
    }
}
