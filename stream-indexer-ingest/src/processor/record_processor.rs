//! Record processor implementation.
//!
//! Projects stream records into documents for the index writer.

use crate::errors::IngestError;
use crate::processor::IdExtractor;
use stream_indexer_shared::{Document, Record};

/// Processor that turns records into documents for a single target index.
///
/// The payload is forwarded as the document body without modification.
#[derive(Debug, Clone)]
pub struct RecordProcessor {
    extractor: IdExtractor,
    target_index: String,
}

impl RecordProcessor {
    /// Create a new processor writing into `target_index`.
    pub fn new(extractor: IdExtractor, target_index: impl Into<String>) -> Self {
        Self {
            extractor,
            target_index: target_index.into(),
        }
    }

    /// The index every document is written to.
    pub fn target_index(&self) -> &str {
        &self.target_index
    }

    /// Build the document for one record.
    ///
    /// # Returns
    ///
    /// * `Ok(Document)` - The document to index
    /// * `Err(IngestError::MalformedPayload)` - If the record has no payload or no usable id
    pub fn process(&self, record: &Record) -> Result<Document, IngestError> {
        let payload = record
            .payload
            .as_deref()
            .ok_or_else(|| IngestError::malformed("record has no payload"))?;

        let id = self.extractor.extract_id(payload)?;

        Ok(Document::new(id, self.target_index.clone(), payload.to_vec()))
    }
}
