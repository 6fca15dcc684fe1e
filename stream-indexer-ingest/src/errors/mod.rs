//! Error types for the stream indexer ingest.

use stream_indexer_repository::SearchError;
use thiserror::Error;

/// Errors that can occur in the stream indexer ingest.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The record payload is not JSON or has no usable identifier.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// The broker did not acknowledge an offset commit.
    #[error("Commit error: {0}")]
    CommitError(String),

    /// The stream client lost its connection to the broker.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Kafka client setup or subscription error.
    #[error("Kafka error: {0}")]
    KafkaError(String),

    /// Error from the search engine.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchError),

    /// Ingest was cancelled or interrupted.
    #[error("Ingest cancelled")]
    Cancelled,
}

impl IngestError {
    /// Create a malformed payload error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedPayload(msg.into())
    }

    /// Create a commit error.
    pub fn commit(msg: impl Into<String>) -> Self {
        Self::CommitError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a Kafka error.
    pub fn kafka(msg: impl Into<String>) -> Self {
        Self::KafkaError(msg.into())
    }

    /// Short stable name of the error kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::MalformedPayload(_) => "malformed_payload",
            IngestError::CommitError(_) => "commit",
            IngestError::ConnectionError(_) => "connection",
            IngestError::KafkaError(_) => "kafka",
            IngestError::SearchError(e) => e.kind(),
            IngestError::Cancelled => "cancelled",
        }
    }
}

impl From<rdkafka::error::KafkaError> for IngestError {
    fn from(err: rdkafka::error::KafkaError) -> Self {
        Self::KafkaError(err.to_string())
    }
}
