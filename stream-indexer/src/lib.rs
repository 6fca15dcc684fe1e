//! # Stream Indexer
//!
//! Main library for the Kafka to OpenSearch stream indexer.
//!
//! This crate provides the configuration, dependency wiring and logging
//! setup for running the ingestion loop as a service.

pub mod config;
pub mod logging;

pub use config::{Dependencies, Settings};

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Ingest error.
    #[error("Ingest error: {0}")]
    IngestError(#[from] stream_indexer_ingest::IngestError),

    /// The search backend could not be reached or reported itself unhealthy.
    #[error("Search error: {0}")]
    SearchError(#[from] stream_indexer_repository::SearchError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Short stable name of the error kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            IndexingError::ConfigError(_) => "config",
            IndexingError::IngestError(e) => e.kind(),
            IndexingError::SearchError(e) => e.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stream_indexer_ingest::IngestError;
    use stream_indexer_repository::SearchError;

    #[test]
    fn test_kind_names_the_failing_layer() {
        assert_eq!(IndexingError::config("missing host").kind(), "config");
        assert_eq!(
            IndexingError::from(IngestError::commit("broker did not acknowledge")).kind(),
            "commit"
        );
        assert_eq!(
            IndexingError::from(SearchError::connection("refused")).kind(),
            SearchError::connection("refused").kind()
        );
    }
}
