//! Configuration for the stream indexer.
//!
//! Settings are read from environment variables once at startup. A `.env`
//! file is loaded into the environment first by the binary.

mod dependencies;

pub use dependencies::Dependencies;

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::IndexingError;
use stream_indexer_ingest::consumer::KafkaReaderConfig;
use stream_indexer_ingest::orchestrator::OrchestratorConfig;
use stream_indexer_ingest::processor::DEFAULT_ID_FIELD;
use stream_indexer_repository::SearchCredentials;

/// Default Kafka broker address.
const DEFAULT_KAFKA_BROKER: &str = "localhost:9092";

/// Default Kafka consumer group ID.
const DEFAULT_KAFKA_GROUP_ID: &str = "stream-indexer";

/// Default source topic.
const DEFAULT_KAFKA_TOPIC: &str = "twitter_tweets";

/// Default cap on records per poll.
const DEFAULT_MAX_POLL_RECORDS: usize = 10;

/// Default target index.
const DEFAULT_SEARCH_INDEX: &str = "twitter";

const DEFAULT_POLL_TIMEOUT_MS: u64 = 100;
const DEFAULT_IDLE_DELAY_MS: u64 = 1000;
const DEFAULT_RECORD_DELAY_MS: u64 = 10;

/// Everything the indexer needs to start.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Kafka connection and batching.
    pub kafka: KafkaReaderConfig,
    /// Search backend location and authentication.
    pub credentials: SearchCredentials,
    /// Index every document is written to.
    pub index: String,
    /// Payload field holding the document identifier.
    pub id_field: String,
    /// Loop timing and retry policy.
    pub orchestrator: OrchestratorConfig,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `KAFKA_BROKER`: Kafka broker address (default: localhost:9092)
    /// - `KAFKA_GROUP_ID`: Consumer group ID (default: stream-indexer)
    /// - `KAFKA_TOPIC`: Source topic (default: twitter_tweets)
    /// - `KAFKA_MAX_POLL_RECORDS`: Records per poll (default: 10)
    /// - `SEARCH_HOSTNAME`: Search host, reached over HTTPS on port 443
    /// - `SEARCH_URL`: Full search URL, overrides `SEARCH_HOSTNAME`
    /// - `SEARCH_USERNAME` / `SEARCH_PASSWORD`: Basic auth (both or neither)
    /// - `SEARCH_INDEX`: Target index (default: twitter)
    /// - `ID_FIELD`: Identifier field in the payload (default: id)
    /// - `POLL_TIMEOUT_MS`, `IDLE_DELAY_MS`, `RECORD_DELAY_MS`: Loop timings
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let max_poll_records = parse_or(&get, "KAFKA_MAX_POLL_RECORDS", DEFAULT_MAX_POLL_RECORDS)?;
        if max_poll_records == 0 {
            return Err(IndexingError::config(
                "KAFKA_MAX_POLL_RECORDS must be at least 1",
            ));
        }

        let kafka = KafkaReaderConfig {
            brokers: get("KAFKA_BROKER").unwrap_or_else(|| DEFAULT_KAFKA_BROKER.to_string()),
            group_id: get("KAFKA_GROUP_ID").unwrap_or_else(|| DEFAULT_KAFKA_GROUP_ID.to_string()),
            topic: get("KAFKA_TOPIC").unwrap_or_else(|| DEFAULT_KAFKA_TOPIC.to_string()),
            max_poll_records,
            ..Default::default()
        };

        let credentials = match (get("SEARCH_URL"), get("SEARCH_HOSTNAME")) {
            (Some(url), _) => SearchCredentials::from_url(url),
            (None, Some(hostname)) => SearchCredentials::from_hostname(&hostname),
            (None, None) => {
                return Err(IndexingError::config(
                    "SEARCH_HOSTNAME or SEARCH_URL must be set",
                ))
            }
        };

        let credentials = match (get("SEARCH_USERNAME"), get("SEARCH_PASSWORD")) {
            (Some(username), Some(password)) => credentials.with_basic_auth(username, password),
            (None, None) => credentials,
            _ => {
                return Err(IndexingError::config(
                    "SEARCH_USERNAME and SEARCH_PASSWORD must be set together",
                ))
            }
        };

        let orchestrator = OrchestratorConfig {
            poll_timeout: millis(&get, "POLL_TIMEOUT_MS", DEFAULT_POLL_TIMEOUT_MS)?,
            idle_delay: millis(&get, "IDLE_DELAY_MS", DEFAULT_IDLE_DELAY_MS)?,
            record_delay: millis(&get, "RECORD_DELAY_MS", DEFAULT_RECORD_DELAY_MS)?,
            ..Default::default()
        };

        Ok(Self {
            kafka,
            credentials,
            index: get("SEARCH_INDEX").unwrap_or_else(|| DEFAULT_SEARCH_INDEX.to_string()),
            id_field: get("ID_FIELD").unwrap_or_else(|| DEFAULT_ID_FIELD.to_string()),
            orchestrator,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, IndexingError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| IndexingError::config(format!("Invalid {}={:?}: {}", key, raw, e))),
        None => Ok(default),
    }
}

fn millis<G>(get: &G, key: &str, default: u64) -> Result<Duration, IndexingError>
where
    G: Fn(&str) -> Option<String>,
{
    parse_or(get, key, default).map(Duration::from_millis)
}
