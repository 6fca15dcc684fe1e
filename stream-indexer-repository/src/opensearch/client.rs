//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! using the OpenSearch Rust client.

use std::time::Duration;

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    cluster::ClusterHealthParts,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    IndexParts, OpenSearch,
};
use serde::Deserialize;
use serde_json::{value::RawValue, Value};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::SearchCredentials;
use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::types::{IndexOutcome, IndexStatus};
use stream_indexer_shared::Document;

/// Per-request timeout applied by the transport.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The subset of an index response the writer cares about.
#[derive(Debug, Deserialize)]
struct IndexResponseBody {
    #[serde(rename = "_id")]
    id: String,
    result: IndexStatus,
}

/// OpenSearch client implementation.
///
/// Writes documents with `PUT /{index}/_doc/{id}`, which creates the document
/// or replaces it if the id already exists.
///
/// # Example
///
/// ```ignore
/// use stream_indexer_repository::{OpenSearchClient, SearchCredentials, SearchEngineClient};
/// use stream_indexer_shared::Document;
///
/// let credentials = SearchCredentials::from_hostname("my-cluster.example.com")
///     .with_basic_auth("user", "password");
/// let client = OpenSearchClient::new(&credentials)?;
///
/// let doc = Document::new("1234", "twitter", br#"{"id":"1234","text":"hello"}"#.to_vec());
/// let outcome = client.index_document(&doc).await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client for the given credentials.
    ///
    /// # Arguments
    ///
    /// * `credentials` - The cluster URL and optional basic authentication
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchError)` - If the URL is invalid or the transport cannot be built
    pub fn new(credentials: &SearchCredentials) -> Result<Self, SearchError> {
        let parsed_url =
            Url::parse(&credentials.url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(REQUEST_TIMEOUT);

        if let Some(auth) = &credentials.basic_auth {
            builder = builder.auth(Credentials::Basic(
                auth.username.clone(),
                auth.password.clone(),
            ));
        }

        let transport = builder
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        info!(
            url = %credentials.url,
            basic_auth = credentials.basic_auth.is_some(),
            "Created OpenSearch client"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
        })
    }

    /// Parse a successful index response into an outcome.
    fn parse_index_response(requested_id: &str, body: &str) -> Result<IndexOutcome, SearchError> {
        let parsed: IndexResponseBody = serde_json::from_str(body)
            .map_err(|e| SearchError::parse(format!("Invalid index response: {}", e)))?;

        if parsed.id != requested_id {
            warn!(
                requested_id = %requested_id,
                assigned_id = %parsed.id,
                "Backend assigned a different document id"
            );
        }

        Ok(IndexOutcome::new(parsed.id, parsed.result))
    }

    /// A cluster is usable unless it reports `red`.
    fn is_healthy_status(body: &Value) -> bool {
        matches!(
            body.get("status").and_then(Value::as_str),
            Some("green") | Some("yellow")
        )
    }
}

#[async_trait]
impl SearchEngineClient for OpenSearchClient {
    #[instrument(skip(self, document), fields(index = %document.index, document_id = %document.id))]
    async fn index_document(&self, document: &Document) -> Result<IndexOutcome, SearchError> {
        // Forward the payload verbatim; RawValue only checks that it is JSON.
        let body: &RawValue = serde_json::from_slice(&document.body)
            .map_err(|e| SearchError::rejected(format!("Body is not valid JSON: {}", e)))?;

        let response = self
            .client
            .index(IndexParts::IndexId(&document.index, &document.id))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status_code();
        let text = response
            .text()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        if !status.is_success() {
            error!(status = %status, body = %text, "Index request failed");
            return Err(SearchError::from_status(status.as_u16(), &text));
        }

        let outcome = Self::parse_index_response(&document.id, &text)?;
        debug!(status = ?outcome.status, "Document indexed");
        Ok(outcome)
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(SearchError::HealthCheckError(format!(
                "Health check returned status {}",
                status
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        Ok(Self::is_healthy_status(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_index_response_created() {
        let body = r#"{"_index":"twitter","_id":"1234","_version":1,"result":"created"}"#;

        let outcome = OpenSearchClient::parse_index_response("1234", body).unwrap();

        assert_eq!(outcome, IndexOutcome::new("1234", IndexStatus::Created));
    }

    #[test]
    fn test_parse_index_response_updated() {
        let body = r#"{"_index":"twitter","_id":"1234","_version":2,"result":"updated"}"#;

        let outcome = OpenSearchClient::parse_index_response("1234", body).unwrap();

        assert_eq!(outcome.status, IndexStatus::Updated);
    }

    #[test]
    fn test_parse_index_response_keeps_assigned_id() {
        let body = r#"{"_id":"other","result":"created"}"#;

        let outcome = OpenSearchClient::parse_index_response("1234", body).unwrap();

        assert_eq!(outcome.id, "other");
    }

    #[test]
    fn test_parse_index_response_invalid() {
        let result = OpenSearchClient::parse_index_response("1", r#"{"acknowledged":true}"#);
        assert!(matches!(result, Err(SearchError::ParseError(_))));
    }

    #[test]
    fn test_healthy_status() {
        assert!(OpenSearchClient::is_healthy_status(&json!({"status": "green"})));
        assert!(OpenSearchClient::is_healthy_status(&json!({"status": "yellow"})));
        assert!(!OpenSearchClient::is_healthy_status(&json!({"status": "red"})));
        assert!(!OpenSearchClient::is_healthy_status(&json!({})));
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let result = OpenSearchClient::new(&SearchCredentials::from_url("not a url"));
        assert!(matches!(result, Err(SearchError::ConnectionError(_))));
    }

    #[test]
    fn test_new_with_basic_auth() {
        let credentials =
            SearchCredentials::from_hostname("cluster.example.com").with_basic_auth("user", "pass");
        assert!(OpenSearchClient::new(&credentials).is_ok());
    }
}
