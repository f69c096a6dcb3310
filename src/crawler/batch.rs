use crate::content::Document;
use crate::ConnectorError;

/// Accumulates documents into batches of at most `batch_size`
#[derive(Debug)]
pub struct BatchEmitter {
    batch_size: usize,
    buffer: Vec<Document>,
}

impl BatchEmitter {
    pub fn new(batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            batch_size,
            buffer: Vec::with_capacity(batch_size),
        }
    }

    /// Buffers a document; returns true once the batch is full
    pub fn push(&mut self, document: Document) -> bool {
        self.buffer.push(document);
        self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() >= self.batch_size
    }

    /// Takes the buffered documents, leaving the buffer empty
    pub fn take(&mut self) -> Vec<Document> {
        std::mem::replace(&mut self.buffer, Vec::with_capacity(self.batch_size))
    }

    /// Takes whatever is left once the frontier is exhausted
    pub fn remainder(&mut self) -> Option<Vec<Document>> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.take())
        }
    }
}

/// What a run has achieved so far
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    /// Message of the most recent per-page failure
    pub last_error: Option<String>,
    /// Whether any batch has been handed out
    pub produced_any: bool,
}

impl CrawlOutcome {
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    /// The error to raise when a run ends; None if it produced documents
    pub fn terminal_error(&self) -> Option<ConnectorError> {
        if self.produced_any {
            None
        } else {
            Some(ConnectorError::NoValidPages {
                last_error: self.last_error.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(n: usize) -> Document {
        let url = format!("https://example.com/{}", n);
        Document::web_page(&url, None, format!("page {}", n), None)
    }

    #[test]
    fn test_fills_to_batch_size() {
        let mut emitter = BatchEmitter::new(2);
        assert!(!emitter.push(doc(1)));
        assert!(emitter.push(doc(2)));

        let batch = emitter.take();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].id(), "https://example.com/1");
        assert!(!emitter.is_full());
        assert!(emitter.remainder().is_none());
    }

    #[test]
    fn test_remainder() {
        let mut emitter = BatchEmitter::new(3);
        assert!(emitter.remainder().is_none());

        emitter.push(doc(1));
        assert_eq!(emitter.remainder().map(|b| b.len()), Some(1));
        assert!(emitter.remainder().is_none());
    }

    #[test]
    fn test_zero_batch_size_clamped() {
        let mut emitter = BatchEmitter::new(0);
        assert!(emitter.push(doc(1)));
    }

    #[test]
    fn test_terminal_error_carries_last_error() {
        let mut outcome = CrawlOutcome::default();
        let err = outcome.terminal_error().unwrap();
        assert_eq!(err.to_string(), "No valid pages found.");

        outcome.record_error("Failed to fetch 'https://example.com/': timed out");
        let err = outcome.terminal_error().unwrap();
        assert_eq!(
            err.to_string(),
            "Failed to fetch 'https://example.com/': timed out"
        );

        outcome.produced_any = true;
        assert!(outcome.terminal_error().is_none());
    }
}
