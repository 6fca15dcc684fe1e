//! Loader module for the stream indexer ingest.
//!
//! Writes documents into the search index one at a time.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use stream_indexer_repository::{IndexOutcome, SearchEngineClient, SearchError};
use stream_indexer_shared::Document;

/// Configuration for the index writer.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Maximum number of retry attempts for failed indexing operations.
    pub max_retries: u32,
    /// Initial retry delay in milliseconds.
    pub initial_retry_delay_ms: u64,
    /// Maximum retry delay in milliseconds.
    pub max_retry_delay_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_retry_delay_ms: 100,
            max_retry_delay_ms: 5000,
        }
    }
}

/// Writer that indexes documents into the search engine.
///
/// There is no batching: each call writes exactly one document, so a failure
/// only ever affects the record it came from. Retryable failures are repeated
/// with exponential backoff; everything else is returned immediately.
pub struct IndexWriter {
    client: Arc<dyn SearchEngineClient>,
    config: LoaderConfig,
}

impl IndexWriter {
    /// Create a new index writer with the given client.
    pub fn new(client: Arc<dyn SearchEngineClient>) -> Self {
        Self {
            client,
            config: LoaderConfig::default(),
        }
    }

    /// Create a new index writer with custom configuration.
    pub fn with_config(client: Arc<dyn SearchEngineClient>, config: LoaderConfig) -> Self {
        Self { client, config }
    }

    /// Write one document, retrying transient and connection failures.
    ///
    /// # Returns
    ///
    /// * `Ok(IndexOutcome)` - The document was created or updated
    /// * `Err(SearchError)` - The last error, once it is not retryable or retries are exhausted
    pub async fn write(&self, document: &Document) -> Result<IndexOutcome, SearchError> {
        let mut delay_ms = self.config.initial_retry_delay_ms;
        let mut attempt = 0;

        loop {
            match self.client.index_document(document).await {
                Ok(outcome) => {
                    if attempt > 0 {
                        debug!(
                            attempt = attempt,
                            document_id = %document.id,
                            "Document index succeeded after retry"
                        );
                    }
                    return Ok(outcome);
                }
                Err(e) => {
                    if !e.is_retryable() {
                        debug!(error = %e, "Non-retryable error encountered");
                        return Err(e);
                    }

                    // Don't wait after the last attempt
                    if attempt >= self.config.max_retries {
                        return Err(e);
                    }

                    attempt += 1;
                    warn!(
                        attempt = attempt,
                        max_retries = self.config.max_retries,
                        delay_ms = delay_ms,
                        document_id = %document.id,
                        error = %e,
                        "Document index failed, retrying"
                    );

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;

                    delay_ms = std::cmp::min(delay_ms * 2, self.config.max_retry_delay_ms);
                }
            }
        }
    }

    /// Check if the search engine is healthy.
    pub async fn health_check(&self) -> Result<bool, SearchError> {
        self.client.health_check().await
    }
}
