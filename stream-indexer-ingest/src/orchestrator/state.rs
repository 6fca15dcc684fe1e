//! Loop states and run counters.

use std::fmt;

use stream_indexer_shared::Batch;

/// States of the ingestion loop.
///
/// The loop cycles `Polling -> Processing -> Committing -> Polling`. An empty
/// poll goes straight back to `Polling`.
#[derive(Debug)]
pub enum LoopState {
    /// Waiting for the next batch.
    Polling,
    /// Indexing the records of a batch, in order.
    Processing(Batch),
    /// Persisting the commit cursor after every record of the batch was attempted.
    Committing,
}

impl LoopState {
    /// Name of the state, used as a log field.
    pub fn name(&self) -> &'static str {
        match self {
            LoopState::Polling => "polling",
            LoopState::Processing(_) => "processing",
            LoopState::Committing => "committing",
        }
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What happened to a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The document was written.
    Indexed,
    /// The record was malformed or the backend rejected it.
    Skipped,
    /// Transient failures outlasted the retries.
    Dropped,
}

/// Counters for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Records whose document was written.
    pub indexed: usize,
    /// Records skipped as malformed or rejected.
    pub skipped: usize,
    /// Records dropped after exhausting retries.
    pub dropped: usize,
}

impl BatchSummary {
    /// Count one record outcome.
    pub fn record(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Indexed => self.indexed += 1,
            RecordOutcome::Skipped => self.skipped += 1,
            RecordOutcome::Dropped => self.dropped += 1,
        }
    }

    /// Total records attempted.
    pub fn attempted(&self) -> usize {
        self.indexed + self.skipped + self.dropped
    }
}

/// Counters accumulated over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Non-empty batches processed.
    pub batches: usize,
    /// Records whose document was written.
    pub indexed: usize,
    /// Records skipped as malformed or rejected.
    pub skipped: usize,
    /// Records dropped after exhausting retries.
    pub dropped: usize,
    /// Successful commits.
    pub commits: usize,
}

impl RunSummary {
    /// Count one record outcome.
    pub fn record(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Indexed => self.indexed += 1,
            RecordOutcome::Skipped => self.skipped += 1,
            RecordOutcome::Dropped => self.dropped += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_summary_counts() {
        let mut batch = BatchSummary::default();
        batch.record(RecordOutcome::Indexed);
        batch.record(RecordOutcome::Indexed);
        batch.record(RecordOutcome::Skipped);
        batch.record(RecordOutcome::Dropped);

        assert_eq!(batch.attempted(), 4);
        assert_eq!(batch.indexed, 2);
        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.dropped, 1);
    }
}
