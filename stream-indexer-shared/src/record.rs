//! Stream record types.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Utc};

/// A topic/partition pair identifying one ordered log in the stream.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TopicPartition {
    /// Topic name.
    pub topic: String,
    /// Partition number within the topic.
    pub partition: i32,
}

impl TopicPartition {
    /// Create a new topic/partition pair.
    pub fn new(topic: impl Into<String>, partition: i32) -> Self {
        Self {
            topic: topic.into(),
            partition,
        }
    }
}

impl fmt::Display for TopicPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.topic, self.partition)
    }
}

/// One message read from the stream.
///
/// Records are immutable once produced by the stream reader. The payload is
/// kept as raw bytes so it can be forwarded to the search backend unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Topic the record was read from.
    pub topic: String,
    /// Partition the record was read from.
    pub partition: i32,
    /// Offset assigned by the broker, monotonic per partition.
    pub offset: i64,
    /// Optional message key.
    pub key: Option<Vec<u8>>,
    /// Message payload. `None` for tombstones.
    pub payload: Option<Vec<u8>>,
    /// Broker timestamp, when the broker provided one.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Record {
    /// Create a new record without key or timestamp.
    pub fn new(
        topic: impl Into<String>,
        partition: i32,
        offset: i64,
        payload: Option<Vec<u8>>,
    ) -> Self {
        Self {
            topic: topic.into(),
            partition,
            offset,
            key: None,
            payload,
            timestamp: None,
        }
    }

    /// Set the message key.
    pub fn with_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the broker timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// The key as text for log context. Non-UTF-8 bytes are replaced.
    pub fn key_text(&self) -> Option<Cow<'_, str>> {
        self.key.as_deref().map(String::from_utf8_lossy)
    }

    /// The topic/partition this record belongs to.
    pub fn topic_partition(&self) -> TopicPartition {
        TopicPartition::new(self.topic.clone(), self.partition)
    }
}
