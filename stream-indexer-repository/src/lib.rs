//! # Stream Indexer Repository
//!
//! This crate provides the trait and implementation for writing documents to
//! the search engine. It includes the error taxonomy for index writes, the
//! connection credentials, and a concrete implementation for OpenSearch.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use config::{BasicAuth, SearchCredentials};
pub use errors::SearchError;
pub use interfaces::SearchEngineClient;
pub use opensearch::OpenSearchClient;
pub use types::{IndexOutcome, IndexStatus};
