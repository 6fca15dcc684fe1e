//! Kafka stream reader implementation.
//!
//! Polls bounded batches of records from a single topic and commits offsets
//! only when the ingestion loop asks for it.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use futures::FutureExt;
use rdkafka::{
    config::ClientConfig,
    consumer::{CommitMode, Consumer, StreamConsumer},
    message::Message as KafkaMessage,
    Offset, TopicPartitionList,
};
use tracing::{debug, info, instrument, warn};

use crate::consumer::{CommitCursor, StreamReader};
use crate::errors::IngestError;
use stream_indexer_shared::{Batch, Record};

/// Configuration for the Kafka stream reader.
#[derive(Debug, Clone)]
pub struct KafkaReaderConfig {
    /// Kafka broker addresses (comma-separated).
    pub brokers: String,
    /// Consumer group ID.
    pub group_id: String,
    /// Topic to consume.
    pub topic: String,
    /// Maximum number of records returned by one poll.
    pub max_poll_records: usize,
    /// Consumer session timeout in milliseconds.
    pub session_timeout_ms: u32,
}

impl Default for KafkaReaderConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            group_id: "stream-indexer".to_string(),
            topic: "twitter_tweets".to_string(),
            max_poll_records: 10,
            session_timeout_ms: 6000,
        }
    }
}

/// Kafka-backed stream reader.
///
/// Auto-commit is disabled and new consumer groups start from the earliest
/// offset. Offsets are committed synchronously from the reader's
/// [`CommitCursor`].
pub struct KafkaStreamReader {
    consumer: StreamConsumer,
    topic: String,
    max_poll_records: usize,
    cursor: CommitCursor,
    /// Broker error hit while draining the previous batch.
    deferred_error: Option<IngestError>,
}

impl KafkaStreamReader {
    /// Create a new Kafka stream reader.
    ///
    /// # Arguments
    ///
    /// * `config` - Brokers, group, topic, and batch cap
    ///
    /// # Returns
    ///
    /// * `Ok(KafkaStreamReader)` - A new reader instance
    /// * `Err(IngestError)` - If consumer creation fails
    pub fn new(config: &KafkaReaderConfig) -> Result<Self, IngestError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", config.session_timeout_ms.to_string())
            .create()
            .map_err(|e| IngestError::kafka(e.to_string()))?;

        info!(
            brokers = %config.brokers,
            group_id = %config.group_id,
            topic = %config.topic,
            max_poll_records = config.max_poll_records,
            "Created Kafka consumer"
        );

        Ok(Self {
            consumer,
            topic: config.topic.clone(),
            max_poll_records: config.max_poll_records.max(1),
            cursor: CommitCursor::new(),
            deferred_error: None,
        })
    }

    /// Copy a Kafka message into an owned record.
    fn to_record<M: KafkaMessage>(msg: &M) -> Record {
        let mut record = Record::new(
            msg.topic(),
            msg.partition(),
            msg.offset(),
            msg.payload().map(<[u8]>::to_vec),
        );

        if let Some(key) = msg.key() {
            record = record.with_key(key);
        }
        let timestamp = msg
            .timestamp()
            .to_millis()
            .and_then(DateTime::from_timestamp_millis);
        if let Some(timestamp) = timestamp {
            record = record.with_timestamp(timestamp);
        }
        record
    }
}

/// Append already-available results to `records` until it holds `cap`
/// records or `next` has nothing ready.
///
/// A broker error stops the drain and is handed back so it can be reported
/// on the next poll instead of discarding the records gathered so far.
fn drain_buffered<F>(records: &mut Vec<Record>, cap: usize, mut next: F) -> Option<IngestError>
where
    F: FnMut() -> Option<Result<Record, IngestError>>,
{
    while records.len() < cap {
        match next() {
            Some(Ok(record)) => records.push(record),
            Some(Err(e)) => return Some(e),
            None => break,
        }
    }
    None
}

#[async_trait]
impl StreamReader for KafkaStreamReader {
    fn subscribe(&mut self) -> Result<(), IngestError> {
        self.consumer
            .subscribe(&[self.topic.as_str()])
            .map_err(|e| IngestError::kafka(e.to_string()))?;

        info!(topic = %self.topic, "Subscribed to Kafka topic");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn poll(&mut self, timeout: Duration) -> Result<Batch, IngestError> {
        if let Some(e) = self.deferred_error.take() {
            return Err(e);
        }

        let first = match tokio::time::timeout(timeout, self.consumer.recv()).await {
            Err(_) => return Ok(Batch::empty()),
            Ok(Err(e)) => return Err(IngestError::connection(e.to_string())),
            Ok(Ok(msg)) => Self::to_record(&msg),
        };

        let mut records = vec![first];

        // Drain what the client already buffered without waiting again.
        let consumer = &self.consumer;
        let deferred = drain_buffered(&mut records, self.max_poll_records, || {
            consumer.recv().now_or_never().map(|received| {
                received
                    .map(|msg| Self::to_record(&msg))
                    .map_err(|e| IngestError::connection(e.to_string()))
            })
        });

        if let Some(e) = deferred {
            warn!(
                count = records.len(),
                error = %e,
                "Kafka error while draining batch, reporting it on the next poll"
            );
            self.deferred_error = Some(e);
        }

        debug!(count = records.len(), "Polled records");
        Ok(Batch::new(records))
    }

    fn acknowledge(&mut self, record: &Record) {
        self.cursor.acknowledge(record);
    }

    fn has_pending_commit(&self) -> bool {
        self.cursor.has_pending()
    }

    async fn commit(&mut self) -> Result<(), IngestError> {
        let pending = self.cursor.pending();
        if pending.is_empty() {
            debug!("Nothing to commit");
            return Ok(());
        }

        let mut tpl = TopicPartitionList::new();
        for (tp, offset) in &pending {
            tpl.add_partition_offset(&tp.topic, tp.partition, Offset::Offset(*offset))
                .map_err(|e| IngestError::commit(e.to_string()))?;
        }

        let consumer = &self.consumer;
        tokio::task::block_in_place(|| consumer.commit(&tpl, CommitMode::Sync))
            .map_err(|e| IngestError::commit(e.to_string()))?;

        self.cursor.mark_committed(&pending);

        for (tp, offset) in &pending {
            debug!(topic = %tp.topic, partition = tp.partition, offset = offset, "Committed offset");
        }
        Ok(())
    }
}
