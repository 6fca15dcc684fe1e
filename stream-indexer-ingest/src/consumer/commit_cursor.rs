//! Per-partition commit cursor.

use std::collections::BTreeMap;

use stream_indexer_shared::{Record, TopicPartition};

/// Tracks how far each partition has been processed and committed.
///
/// Positions are stored as the *next* offset to consume (last acknowledged
/// offset + 1), which is the value the broker expects on commit. The cursor
/// only moves forward and only through [`CommitCursor::acknowledge`], so it
/// can never run ahead of the records the ingestion loop has attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitCursor {
    acknowledged: BTreeMap<TopicPartition, i64>,
    committed: BTreeMap<TopicPartition, i64>,
}

impl CommitCursor {
    /// Create an empty cursor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a record as fully processed.
    ///
    /// Returns `true` if the partition's position moved forward. Records at or
    /// below the current position leave the cursor unchanged.
    pub fn acknowledge(&mut self, record: &Record) -> bool {
        let next = record.offset + 1;
        let tp = record.topic_partition();

        match self.acknowledged.get_mut(&tp) {
            Some(position) if *position >= next => false,
            Some(position) => {
                *position = next;
                true
            }
            None => {
                self.acknowledged.insert(tp, next);
                true
            }
        }
    }

    /// Next offset to consume for a partition, as acknowledged by the loop.
    pub fn position(&self, tp: &TopicPartition) -> Option<i64> {
        self.acknowledged.get(tp).copied()
    }

    /// Last position the broker confirmed for a partition.
    pub fn committed(&self, tp: &TopicPartition) -> Option<i64> {
        self.committed.get(tp).copied()
    }

    /// Acknowledged positions that have not been committed yet.
    pub fn pending(&self) -> Vec<(TopicPartition, i64)> {
        self.acknowledged
            .iter()
            .filter(|(tp, offset)| self.committed.get(*tp) != Some(*offset))
            .map(|(tp, offset)| (tp.clone(), *offset))
            .collect()
    }

    /// Whether any acknowledged position is ahead of the committed one.
    pub fn has_pending(&self) -> bool {
        self.acknowledged
            .iter()
            .any(|(tp, offset)| self.committed.get(tp) != Some(offset))
    }

    /// Record positions the broker has confirmed.
    pub fn mark_committed(&mut self, positions: &[(TopicPartition, i64)]) {
        for (tp, offset) in positions {
            self.committed.insert(tp.clone(), *offset);
        }
    }
}
