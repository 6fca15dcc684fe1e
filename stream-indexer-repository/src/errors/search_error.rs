//! Search error types.
//!
//! This module defines the error types that can occur while writing to the
//! search engine.

use thiserror::Error;

/// Errors that can occur during search engine operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Failed to reach the search engine (DNS, refused connection, TLS, timeout).
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The backend failed in a way that may succeed on retry (5xx, 408, 429).
    #[error("Transient index error: {0}")]
    TransientIndexError(String),

    /// The backend refused the document (4xx). Retrying will not help.
    #[error("Rejected document: {0}")]
    RejectedDocument(String),

    /// Failed to parse a response from the search engine.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The cluster health check could not be completed.
    #[error("Health check error: {0}")]
    HealthCheckError(String),
}

impl SearchError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a transient index error.
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::TransientIndexError(msg.into())
    }

    /// Create a rejected document error.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::RejectedDocument(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Classify a non-success HTTP status returned for an index request.
    ///
    /// `408`, `429` and every 5xx are transient; any other status is a
    /// rejection of the document itself.
    pub fn from_status(status: u16, body: &str) -> Self {
        let msg = format!("status {}: {}", status, body);
        match status {
            408 | 429 | 500..=599 => Self::TransientIndexError(msg),
            _ => Self::RejectedDocument(msg),
        }
    }

    /// Whether the failed operation may succeed if repeated.
    pub fn is_retryable(&self) -> bool {
        match self {
            SearchError::ConnectionError(_) | SearchError::TransientIndexError(_) => true,
            SearchError::RejectedDocument(_)
            | SearchError::ParseError(_)
            | SearchError::HealthCheckError(_) => false,
        }
    }

    /// Short stable name of the error kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::ConnectionError(_) => "connection",
            SearchError::TransientIndexError(_) => "transient",
            SearchError::RejectedDocument(_) => "rejected",
            SearchError::ParseError(_) => "parse",
            SearchError::HealthCheckError(_) => "health_check",
        }
    }
}
