use lopdf::Object;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised while reading a PDF
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to parse PDF: {0}")]
    Parse(#[from] lopdf::Error),
}

/// Text and document-information entries of a PDF
#[derive(Debug, Clone, Default)]
pub struct PdfContent {
    pub text: String,
    pub metadata: BTreeMap<String, String>,
}

/// Extracts page text and the Info dictionary from raw PDF bytes
///
/// A file that cannot be parsed at all is an error. A file that parses but
/// whose text cannot be decoded still yields its metadata with empty text.
pub fn read_pdf(bytes: &[u8]) -> Result<PdfContent, PdfError> {
    let document = lopdf::Document::load_mem(bytes)?;

    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    let text = if pages.is_empty() {
        String::new()
    } else {
        match document.extract_text(&pages) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Could not extract PDF text from {} pages: {}", pages.len(), e);
                String::new()
            }
        }
    };

    Ok(PdfContent {
        text: text.trim().to_string(),
        metadata: read_info(&document),
    })
}

fn read_info(document: &lopdf::Document) -> BTreeMap<String, String> {
    let info = match document.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => document.get_object(*id).and_then(Object::as_dict).ok(),
        Ok(Object::Dictionary(dict)) => Some(dict),
        _ => None,
    };

    let mut metadata = BTreeMap::new();
    if let Some(info) = info {
        for (key, value) in info.iter() {
            if let Some(text) = object_text(value) {
                metadata.insert(String::from_utf8_lossy(key).into_owned(), text);
            }
        }
    }
    metadata
}

fn object_text(object: &Object) -> Option<String> {
    let text = match object {
        Object::String(bytes, _) => decode_pdf_string(bytes),
        Object::Name(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Object::Integer(i) => i.to_string(),
        Object::Real(r) => r.to_string(),
        Object::Boolean(b) => b.to_string(),
        _ => return None,
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Decodes a PDF text string: UTF-16BE with a byte-order mark, otherwise
/// PDFDocEncoding (treated as Latin-1)
fn decode_pdf_string(bytes: &[u8]) -> String {
    match bytes.strip_prefix(&[0xFE, 0xFF]) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        None => bytes.iter().map(|&b| b as char).collect(),
    }
}
