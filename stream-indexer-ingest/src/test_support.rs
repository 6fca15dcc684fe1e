//! Mock collaborators shared by the ingest unit tests.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::consumer::{CommitCursor, StreamReader};
use crate::errors::IngestError;
use crate::orchestrator::ShutdownHandle;
use stream_indexer_repository::{IndexOutcome, IndexStatus, SearchEngineClient, SearchError};
use stream_indexer_shared::{Batch, Document, Record, TopicPartition};

/// Something a collaborator observed, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Index(String),
    Commit(Vec<(TopicPartition, i64)>),
}

pub(crate) type EventLog = Arc<Mutex<Vec<Event>>>;

pub(crate) fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Build a record on partition 0 of the test topic.
pub(crate) fn record(offset: i64, payload: &str) -> Record {
    Record::new("tweets", 0, offset, Some(payload.as_bytes().to_vec()))
}

#[derive(Default)]
struct MockIndexState {
    documents: BTreeMap<(String, String), Vec<u8>>,
    failures: HashMap<String, VecDeque<SearchError>>,
    index_calls: usize,
    unhealthy: bool,
}

/// In-memory search backend with upsert semantics and scripted failures.
pub(crate) struct MockSearchClient {
    state: Mutex<MockIndexState>,
    events: EventLog,
}

impl MockSearchClient {
    pub(crate) fn new() -> Self {
        Self::with_events(event_log())
    }

    pub(crate) fn with_events(events: EventLog) -> Self {
        Self {
            state: Mutex::new(MockIndexState::default()),
            events,
        }
    }

    /// Make the next write of `id` fail with `error`. Calls queue up.
    pub(crate) fn fail_next(&self, id: &str, error: SearchError) {
        self.state
            .lock()
            .unwrap()
            .failures
            .entry(id.to_string())
            .or_default()
            .push_back(error);
    }

    /// Report the cluster as unhealthy from now on.
    pub(crate) fn set_unhealthy(&self) {
        self.state.lock().unwrap().unhealthy = true;
    }

    pub(crate) fn index_calls(&self) -> usize {
        self.state.lock().unwrap().index_calls
    }

    pub(crate) fn document_count(&self) -> usize {
        self.state.lock().unwrap().documents.len()
    }

    pub(crate) fn documents(&self) -> BTreeMap<(String, String), Vec<u8>> {
        self.state.lock().unwrap().documents.clone()
    }
}

#[async_trait]
impl SearchEngineClient for MockSearchClient {
    async fn index_document(&self, document: &Document) -> Result<IndexOutcome, SearchError> {
        self.events
            .lock()
            .unwrap()
            .push(Event::Index(document.id.clone()));

        let mut state = self.state.lock().unwrap();
        state.index_calls += 1;

        if let Some(error) = state
            .failures
            .get_mut(&document.id)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }

        let key = (document.index.clone(), document.id.clone());
        let status = match state.documents.insert(key, document.body.clone()) {
            Some(_) => IndexStatus::Updated,
            None => IndexStatus::Created,
        };

        Ok(IndexOutcome::new(document.id.clone(), status))
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        Ok(!self.state.lock().unwrap().unhealthy)
    }
}

/// What a mock reader was asked to do.
#[derive(Debug, Default)]
pub(crate) struct ReaderStats {
    pub(crate) subscribed: bool,
    pub(crate) polls: usize,
    pub(crate) commit_calls: usize,
    pub(crate) committed: Vec<Vec<(TopicPartition, i64)>>,
}

/// Stream reader that replays scripted poll results.
///
/// Once the script is exhausted it requests shutdown (when given a handle)
/// and keeps returning empty batches.
pub(crate) struct MockStreamReader {
    polls: VecDeque<Result<Batch, IngestError>>,
    cursor: CommitCursor,
    commit_failures: usize,
    on_exhausted: Option<ShutdownHandle>,
    stats: Arc<Mutex<ReaderStats>>,
    events: EventLog,
}

impl MockStreamReader {
    pub(crate) fn new(polls: Vec<Result<Batch, IngestError>>, events: EventLog) -> Self {
        Self {
            polls: polls.into(),
            cursor: CommitCursor::new(),
            commit_failures: 0,
            on_exhausted: None,
            stats: Arc::new(Mutex::new(ReaderStats::default())),
            events,
        }
    }

    /// Fail the next `count` commit calls.
    pub(crate) fn failing_commits(mut self, count: usize) -> Self {
        self.commit_failures = count;
        self
    }

    pub(crate) fn shutdown_when_exhausted(mut self, handle: ShutdownHandle) -> Self {
        self.on_exhausted = Some(handle);
        self
    }

    pub(crate) fn stats(&self) -> Arc<Mutex<ReaderStats>> {
        self.stats.clone()
    }
}

#[async_trait]
impl StreamReader for MockStreamReader {
    fn subscribe(&mut self) -> Result<(), IngestError> {
        self.stats.lock().unwrap().subscribed = true;
        Ok(())
    }

    async fn poll(&mut self, _timeout: Duration) -> Result<Batch, IngestError> {
        self.stats.lock().unwrap().polls += 1;

        match self.polls.pop_front() {
            Some(result) => result,
            None => {
                if let Some(handle) = &self.on_exhausted {
                    handle.shutdown();
                }
                Ok(Batch::empty())
            }
        }
    }

    fn acknowledge(&mut self, record: &Record) {
        self.cursor.acknowledge(record);
    }

    fn has_pending_commit(&self) -> bool {
        self.cursor.has_pending()
    }

    async fn commit(&mut self) -> Result<(), IngestError> {
        self.stats.lock().unwrap().commit_calls += 1;

        if self.commit_failures > 0 {
            self.commit_failures -= 1;
            return Err(IngestError::commit("broker did not acknowledge"));
        }

        let pending = self.cursor.pending();
        if pending.is_empty() {
            return Ok(());
        }

        self.cursor.mark_committed(&pending);
        self.events
            .lock()
            .unwrap()
            .push(Event::Commit(pending.clone()));
        self.stats.lock().unwrap().committed.push(pending);
        Ok(())
    }
}
