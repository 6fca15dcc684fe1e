//! Indexable documents.

/// The indexable projection of a record.
///
/// The body is the record payload, forwarded to the backend unmodified. The
/// identifier is derived from the payload so that re-indexing the same record
/// overwrites the same document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Stable document identifier.
    pub id: String,
    /// Target index name.
    pub index: String,
    /// Raw JSON body.
    pub body: Vec<u8>,
}

impl Document {
    /// Create a new document.
    pub fn new(id: impl Into<String>, index: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            index: index.into(),
            body: body.into(),
        }
    }
}
