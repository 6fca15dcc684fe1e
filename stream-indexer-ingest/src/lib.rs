//! # Stream Indexer Ingest
//!
//! This crate provides the ingest components for copying records from a
//! Kafka topic into a search index with at-least-once delivery.
//!
//! ## Architecture
//!
//! The ingest follows the Consumer-Processor-Loader pattern:
//!
//! 1. **Consumer**: Polls bounded batches from Kafka and owns the commit cursor
//! 2. **Processor**: Derives a stable document id from each record payload
//! 3. **Loader**: Writes one document at a time, retrying transient failures
//! 4. **Orchestrator**: Runs the poll/process/commit loop, committing a batch
//!    only after every record in it has been attempted

pub mod consumer;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;

#[cfg(test)]
pub(crate) mod test_support;

pub use errors::IngestError;
