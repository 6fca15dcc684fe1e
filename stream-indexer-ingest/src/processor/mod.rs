//! Processor module for the stream indexer ingest.
//!
//! Turns stream records into documents keyed by a stable identifier.

mod id_extractor;
mod record_processor;

pub use id_extractor::{IdExtractor, DEFAULT_ID_FIELD};
pub use record_processor::RecordProcessor;
