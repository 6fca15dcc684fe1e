//! Search engine client trait definition.
//!
//! This module defines the abstract interface for search engine operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;

use crate::errors::SearchError;
use crate::types::IndexOutcome;
use stream_indexer_shared::Document;

/// Abstract interface for search engine operations.
///
/// Implementations can be swapped for different backends (OpenSearch, mock, etc.)
/// enabling easy testing.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, SearchError>`. Callers use
/// [`SearchError::is_retryable`] to decide whether to repeat a write.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Write a single document, keyed by its identifier.
    ///
    /// The write is an upsert: a document with the same identifier in the
    /// same index is replaced, so repeating the call with the same document
    /// leaves the index in the same state.
    ///
    /// # Arguments
    ///
    /// * `document` - The document to write
    ///
    /// # Returns
    ///
    /// * `Ok(IndexOutcome)` - The backend-assigned id and whether the document was created or updated
    /// * `Err(SearchError::TransientIndexError)` - The backend failed temporarily
    /// * `Err(SearchError::RejectedDocument)` - The backend refused the document
    /// * `Err(SearchError::ConnectionError)` - The backend could not be reached
    async fn index_document(&self, document: &Document) -> Result<IndexOutcome, SearchError>;

    /// Check if the search engine is reachable and not in a failed state.
    async fn health_check(&self) -> Result<bool, SearchError>;
}
