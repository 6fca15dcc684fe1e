//! Error types for the stream indexer repository.

mod search_error;

pub use search_error::SearchError;
