//! Orchestrator module for the stream indexer ingest.
//!
//! Coordinates the consumer, processor, and loader components in a single
//! sequential loop. A batch is committed only after every record in it has
//! been attempted, which gives at-least-once delivery: a crash before the
//! commit re-delivers the batch, and re-indexing it is an idempotent upsert.

mod shutdown;
mod state;

pub use shutdown::ShutdownHandle;
pub use state::{BatchSummary, LoopState, RecordOutcome, RunSummary};

use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::consumer::StreamReader;
use crate::errors::IngestError;
use crate::loader::IndexWriter;
use crate::processor::RecordProcessor;
use shutdown::{sleep_or_cancel, wait_for_shutdown};
use stream_indexer_repository::SearchError;
use stream_indexer_shared::{Batch, Record};

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// How long a poll waits for the first record.
    pub poll_timeout: Duration,
    /// Pause after an empty poll.
    pub idle_delay: Duration,
    /// Pause between records, throttling the write rate.
    pub record_delay: Duration,
    /// Commit retries before the failure is treated as fatal.
    pub commit_max_retries: u32,
    /// Pause between commit attempts.
    pub commit_retry_delay: Duration,
    /// Consecutive poll connection failures tolerated before giving up.
    pub connection_max_retries: u32,
    /// Initial backoff after a poll connection failure. Doubles per failure.
    pub connection_backoff: Duration,
    /// Upper bound for the poll connection backoff.
    pub max_connection_backoff: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(100),
            idle_delay: Duration::from_millis(1000),
            record_delay: Duration::from_millis(10),
            commit_max_retries: 3,
            commit_retry_delay: Duration::from_millis(200),
            connection_max_retries: 5,
            connection_backoff: Duration::from_millis(500),
            max_connection_backoff: Duration::from_secs(30),
        }
    }
}

/// Orchestrator that runs the ingestion loop.
///
/// The orchestrator:
/// - Polls bounded batches from the stream reader
/// - Indexes every record of a batch in order, isolating per-record failures
/// - Commits the batch once every record has been attempted
/// - Stops on a fatal error or when its [`ShutdownHandle`] is triggered
pub struct Orchestrator {
    reader: Box<dyn StreamReader>,
    processor: RecordProcessor,
    writer: IndexWriter,
    config: OrchestratorConfig,
    shutdown: ShutdownHandle,
    shutdown_rx: watch::Receiver<bool>,
    poll_failures: u32,
    summary: RunSummary,
}

impl Orchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(
        reader: Box<dyn StreamReader>,
        processor: RecordProcessor,
        writer: IndexWriter,
    ) -> Self {
        Self::with_config(reader, processor, writer, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        reader: Box<dyn StreamReader>,
        processor: RecordProcessor,
        writer: IndexWriter,
        config: OrchestratorConfig,
    ) -> Self {
        let shutdown = ShutdownHandle::new();
        let shutdown_rx = shutdown.subscribe();

        Self {
            reader,
            processor,
            writer,
            config,
            shutdown,
            shutdown_rx,
            poll_failures: 0,
            summary: RunSummary::default(),
        }
    }

    /// Use an existing shutdown handle instead of the orchestrator's own.
    pub fn with_shutdown_handle(mut self, handle: ShutdownHandle) -> Self {
        self.shutdown_rx = handle.subscribe();
        self.shutdown = handle;
        self
    }

    /// A handle that stops this orchestrator when triggered.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Trigger a graceful shutdown.
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Run the ingestion loop.
    ///
    /// Runs until shutdown is requested, then commits whatever has been
    /// acknowledged and returns the run counters. Returns an error only for
    /// fatal conditions: an exhausted commit, an unreachable broker, or an
    /// unreachable search backend. Nothing is committed after a fatal error,
    /// so the records since the last commit are delivered again on restart.
    #[instrument(skip(self))]
    pub async fn run(&mut self) -> Result<RunSummary, IngestError> {
        info!(
            target_index = %self.processor.target_index(),
            "Starting ingestion loop"
        );

        self.reader.subscribe()?;

        let mut state = LoopState::Polling;
        let stopped_by = loop {
            if self.shutdown.is_shutdown() {
                break IngestError::Cancelled;
            }

            debug!(state = %state, "Entering state");
            match self.step(state).await {
                Ok(next) => state = next,
                Err(e) => break e,
            }
        };

        match stopped_by {
            IngestError::Cancelled => {
                info!("Shutdown requested, stopping ingestion loop");
                self.final_commit().await;
                info!(
                    batches = self.summary.batches,
                    indexed = self.summary.indexed,
                    skipped = self.summary.skipped,
                    dropped = self.summary.dropped,
                    commits = self.summary.commits,
                    "Ingestion loop stopped"
                );
                Ok(self.summary)
            }
            e => {
                error!(error = %e, kind = e.kind(), "Ingestion loop stopped on fatal error");
                Err(e)
            }
        }
    }

    /// Execute one state and return the next.
    async fn step(&mut self, state: LoopState) -> Result<LoopState, IngestError> {
        match state {
            LoopState::Polling => self.poll_batch().await,
            LoopState::Processing(batch) => {
                self.process_batch(batch).await?;
                Ok(LoopState::Committing)
            }
            LoopState::Committing => {
                self.commit_with_retry().await?;
                Ok(LoopState::Polling)
            }
        }
    }

    /// Poll the next batch, backing off on connection failures.
    async fn poll_batch(&mut self) -> Result<LoopState, IngestError> {
        let polled = tokio::select! {
            biased;
            _ = wait_for_shutdown(&mut self.shutdown_rx) => return Err(IngestError::Cancelled),
            result = self.reader.poll(self.config.poll_timeout) => result,
        };

        match polled {
            Ok(batch) if batch.is_empty() => {
                self.poll_failures = 0;
                debug!("No records received");
                sleep_or_cancel(&mut self.shutdown_rx, self.config.idle_delay).await?;
                Ok(LoopState::Polling)
            }
            Ok(batch) => {
                self.poll_failures = 0;
                info!(count = batch.len(), "Received records");
                Ok(LoopState::Processing(batch))
            }
            Err(e @ IngestError::ConnectionError(_)) => {
                self.poll_failures += 1;
                if self.poll_failures > self.config.connection_max_retries {
                    error!(
                        failures = self.poll_failures,
                        error = %e,
                        "Stream connection failed too many times"
                    );
                    return Err(e);
                }

                let delay = self.connection_backoff();
                warn!(
                    attempt = self.poll_failures,
                    max_retries = self.config.connection_max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Poll failed, retrying"
                );
                sleep_or_cancel(&mut self.shutdown_rx, delay).await?;
                Ok(LoopState::Polling)
            }
            Err(e) => Err(e),
        }
    }

    fn connection_backoff(&self) -> Duration {
        let exponent = self.poll_failures.saturating_sub(1).min(16);
        self.config
            .connection_backoff
            .saturating_mul(1 << exponent)
            .min(self.config.max_connection_backoff)
    }

    /// Index every record of the batch in order, acknowledging each one.
    #[instrument(skip(self, batch), fields(batch_size = batch.len()))]
    async fn process_batch(&mut self, batch: Batch) -> Result<(), IngestError> {
        let (first_offset, last_offset) = batch.offset_range().unwrap_or_default();
        let total = batch.len();
        let mut batch_summary = BatchSummary::default();
        self.summary.batches += 1;

        for (position, record) in batch.into_iter().enumerate() {
            let outcome = self.process_record(&record).await?;

            self.reader.acknowledge(&record);
            batch_summary.record(outcome);
            self.summary.record(outcome);

            if position + 1 < total {
                sleep_or_cancel(&mut self.shutdown_rx, self.config.record_delay).await?;
            }
        }

        info!(
            first_offset = first_offset,
            last_offset = last_offset,
            indexed = batch_summary.indexed,
            skipped = batch_summary.skipped,
            dropped = batch_summary.dropped,
            attempted = batch_summary.attempted(),
            "Batch processed"
        );
        Ok(())
    }

    /// Extract, index, and classify the result for one record.
    ///
    /// Only an unreachable search backend is returned as an error; every
    /// other failure is logged and reported as an outcome.
    async fn process_record(&self, record: &Record) -> Result<RecordOutcome, IngestError> {
        let document = match self.processor.process(record) {
            Ok(document) => document,
            Err(e) => {
                warn!(
                    topic = %record.topic,
                    partition = record.partition,
                    offset = record.offset,
                    key = ?record.key_text(),
                    timestamp = ?record.timestamp,
                    kind = e.kind(),
                    error = %e,
                    "Skipping malformed record"
                );
                return Ok(RecordOutcome::Skipped);
            }
        };

        match self.writer.write(&document).await {
            Ok(outcome) => {
                info!(
                    partition = record.partition,
                    offset = record.offset,
                    key = ?record.key_text(),
                    timestamp = ?record.timestamp,
                    document_id = %outcome.id,
                    status = ?outcome.status,
                    "Indexed document"
                );
                Ok(RecordOutcome::Indexed)
            }
            Err(e @ SearchError::ConnectionError(_)) => {
                error!(
                    partition = record.partition,
                    offset = record.offset,
                    key = ?record.key_text(),
                    timestamp = ?record.timestamp,
                    document_id = %document.id,
                    error = %e,
                    "Search backend unreachable"
                );
                Err(e.into())
            }
            Err(e @ SearchError::TransientIndexError(_)) => {
                error!(
                    partition = record.partition,
                    offset = record.offset,
                    key = ?record.key_text(),
                    timestamp = ?record.timestamp,
                    document_id = %document.id,
                    kind = e.kind(),
                    error = %e,
                    "Dropping record after exhausting retries"
                );
                Ok(RecordOutcome::Dropped)
            }
            Err(e) => {
                warn!(
                    partition = record.partition,
                    offset = record.offset,
                    key = ?record.key_text(),
                    timestamp = ?record.timestamp,
                    document_id = %document.id,
                    kind = e.kind(),
                    error = %e,
                    "Skipping rejected document"
                );
                Ok(RecordOutcome::Skipped)
            }
        }
    }

    /// Commit the cursor, retrying a bounded number of times.
    async fn commit_with_retry(&mut self) -> Result<(), IngestError> {
        info!("Committing offsets");
        let mut attempt = 0;

        loop {
            match self.reader.commit().await {
                Ok(()) => {
                    self.summary.commits += 1;
                    info!("Offsets committed");
                    return Ok(());
                }
                Err(e) => {
                    if attempt >= self.config.commit_max_retries {
                        error!(
                            attempts = attempt + 1,
                            error = %e,
                            "Commit failed, giving up"
                        );
                        return Err(e);
                    }

                    attempt += 1;
                    warn!(
                        attempt = attempt,
                        max_retries = self.config.commit_max_retries,
                        error = %e,
                        "Commit failed, retrying"
                    );
                    tokio::time::sleep(self.config.commit_retry_delay).await;
                }
            }
        }
    }

    /// One best-effort commit of everything acknowledged before shutdown.
    async fn final_commit(&mut self) {
        if !self.reader.has_pending_commit() {
            debug!("No acknowledged offsets to commit");
            return;
        }

        match self.reader.commit().await {
            Ok(()) => {
                self.summary.commits += 1;
                info!("Committed acknowledged offsets before shutdown");
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "Final commit failed, records since the last commit will be re-delivered"
                );
            }
        }
    }
}
