//! Translation between [`PatientRecord`] and stored documents.

use crate::record::PatientRecord;
use crate::{PatientError, PatientResult};
use hrs_docstore::Document;
use serde_json::Value;

/// Patient document operations.
///
/// Zero-sized type used for namespacing; all methods are associated functions.
pub struct PatientDocument;

impl PatientDocument {
    /// Decode the document stored under `key`.
    ///
    /// Uses `serde_path_to_error` so a schema mismatch names the offending field
    /// (for example `medical.blood_type`).
    ///
    /// # Errors
    ///
    /// Returns `PatientError::CorruptDocument` if the document does not match the record
    /// schema, or if its `id` field disagrees with the key it is stored under.
    pub fn parse(key: &str, document: Document) -> PatientResult<PatientRecord> {
        let record: PatientRecord =
            serde_path_to_error::deserialize(Value::Object(document)).map_err(|err| {
                let path = err.path().to_string();
                let path = if path.is_empty() || path == "." {
                    "<root>".to_string()
                } else {
                    path
                };
                PatientError::CorruptDocument {
                    id: key.to_string(),
                    reason: format!("schema mismatch at {path}: {}", err.into_inner()),
                }
            })?;

        if record.id != key {
            return Err(PatientError::CorruptDocument {
                id: key.to_string(),
                reason: format!("document id '{}' does not match its key", record.id),
            });
        }

        Ok(record)
    }

    /// Encode a record as a document with every field present.
    pub fn render(record: &PatientRecord) -> PatientResult<Document> {
        match serde_json::to_value(record).map_err(PatientError::Serialization)? {
            Value::Object(document) => Ok(document),
            other => Err(PatientError::CorruptDocument {
                id: record.id.clone(),
                reason: format!("record encoded as {other} instead of an object"),
            }),
        }
    }
}
