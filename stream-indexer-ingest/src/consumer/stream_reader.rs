//! Stream reader trait definition.

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::IngestError;
use stream_indexer_shared::{Batch, Record};

/// Abstract interface over the message stream.
///
/// The reader owns the commit cursor. The ingestion loop acknowledges each
/// record once its indexing attempt has finished and calls [`commit`] to
/// persist everything acknowledged so far. Nothing is committed implicitly.
///
/// [`commit`]: StreamReader::commit
#[async_trait]
pub trait StreamReader: Send + Sync {
    /// Subscribe to the configured topic. Called once before the first poll.
    fn subscribe(&mut self) -> Result<(), IngestError>;

    /// Wait up to `timeout` for at least one record.
    ///
    /// Returns an empty batch on timeout. Broker errors surface as
    /// `IngestError::ConnectionError`.
    async fn poll(&mut self, timeout: Duration) -> Result<Batch, IngestError>;

    /// Advance the commit cursor past `record`.
    fn acknowledge(&mut self, record: &Record);

    /// Whether acknowledged positions are waiting to be committed.
    fn has_pending_commit(&self) -> bool;

    /// Persist the commit cursor, blocking until the broker acknowledges.
    ///
    /// A no-op when nothing new has been acknowledged.
    async fn commit(&mut self) -> Result<(), IngestError>;
}
