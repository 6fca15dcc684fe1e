//! Stable document identifier extraction.

use serde_json::Value;

use crate::errors::IngestError;

/// Default name of the top-level identifier field.
pub const DEFAULT_ID_FIELD: &str = "id";

/// Derives a document identifier from a JSON payload.
///
/// The identifier is the value of one top-level field, rendered as text.
/// Extraction is a pure function of the payload, so re-delivered records map
/// onto the document they produced the first time.
#[derive(Debug, Clone)]
pub struct IdExtractor {
    field: String,
}

impl IdExtractor {
    /// Create an extractor reading the given top-level field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Extract the identifier from a raw payload.
    ///
    /// Strings are used verbatim, numbers and booleans as their JSON text.
    /// Anything else, a missing field, a non-object payload or invalid JSON is
    /// `IngestError::MalformedPayload`.
    pub fn extract_id(&self, payload: &[u8]) -> Result<String, IngestError> {
        let value: Value = serde_json::from_slice(payload)
            .map_err(|e| IngestError::malformed(format!("invalid JSON: {}", e)))?;

        let object = value
            .as_object()
            .ok_or_else(|| IngestError::malformed("payload is not a JSON object"))?;

        let id = match object.get(&self.field) {
            None => {
                return Err(IngestError::malformed(format!(
                    "missing field `{}`",
                    self.field
                )))
            }
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(other) => {
                return Err(IngestError::malformed(format!(
                    "field `{}` is not a scalar: {}",
                    self.field, other
                )))
            }
        };

        if id.is_empty() {
            return Err(IngestError::malformed(format!(
                "field `{}` is empty",
                self.field
            )));
        }

        Ok(id)
    }
}

impl Default for IdExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_ID_FIELD)
    }
}
