//! Consumer module for the stream indexer ingest.
//!
//! Provides the stream reader abstraction, its Kafka implementation, and the
//! commit cursor the reader owns.

mod commit_cursor;
mod kafka_reader;
mod stream_reader;

pub use commit_cursor::CommitCursor;
pub use kafka_reader::{KafkaReaderConfig, KafkaStreamReader};
pub use stream_reader::StreamReader;
