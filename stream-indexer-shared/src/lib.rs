//! # Stream Indexer Shared
//!
//! Plain data types that flow between the stream indexer crates: records read
//! from the stream, the batches they arrive in, and the documents derived
//! from them.

mod batch;
mod document;
mod record;

pub use batch::Batch;
pub use document::Document;
pub use record::{Record, TopicPartition};
