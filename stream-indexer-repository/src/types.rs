//! Response types for index operations.

use serde::Deserialize;

/// Result reported by the backend for a single write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexStatus {
    /// The document did not exist and was created.
    Created,
    /// An existing document was overwritten.
    Updated,
    /// The document was already identical.
    Noop,
}

/// Outcome of a successful index write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOutcome {
    /// Identifier assigned by the backend. Equals the requested id for upserts.
    pub id: String,
    /// Whether the document was created or updated.
    pub status: IndexStatus,
}

impl IndexOutcome {
    /// Create a new outcome.
    pub fn new(id: impl Into<String>, status: IndexStatus) -> Self {
        Self {
            id: id.into(),
            status,
        }
    }
}
