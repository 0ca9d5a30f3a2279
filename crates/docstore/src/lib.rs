//! Keyed JSON document storage.
//!
//! A document store holds schemaless JSON objects addressed by a collection name and a
//! string key, in the manner of a hosted document database:
//!
//! ```text
//! <collection>/<key>  ->  { "field": value, ... }
//! ```
//!
//! The store knows nothing about the shape of the documents it holds. Callers that need a
//! schema (for example the patient record store in `hrs-core`) enforce it on top.
//!
//! Two implementations are provided:
//!
//! - [`InMemoryDocumentStore`]: `BTreeMap`-backed, for tests and demo runs
//! - [`FileDocumentStore`]: one JSON file per document under a sharded directory tree
//!
//! ## Example
//!
//! ```
//! use hrs_docstore::{Document, DocumentStore, InMemoryDocumentStore};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), hrs_docstore::StoreError> {
//! let store = InMemoryDocumentStore::new();
//! let mut doc = Document::new();
//! doc.insert("name".into(), json!("Alice"));
//!
//! store.set("patients", "P1", doc)?;
//! assert!(store.get("patients", "P1")?.is_some());
//! # Ok(())
//! # }
//! ```

mod file;
mod in_memory;

use std::sync::Arc;

pub use file::FileDocumentStore;
pub use in_memory::InMemoryDocumentStore;

/// A stored document: a JSON object.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Errors returned by document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The targeted document does not exist
    #[error("document not found: {collection}/{key}")]
    NotFound { collection: String, key: String },

    /// The store cannot serve requests (misconfigured root, poisoned lock, ...)
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The collection name cannot be used to address documents
    #[error("invalid collection name '{name}': {source}")]
    InvalidCollection {
        name: String,
        #[source]
        source: hrs_types::TextError,
    },

    /// I/O error while reading or writing a document
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A document could not be encoded or decoded
    #[error("document serialisation error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for document store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Abstract keyed document storage.
///
/// Every call is a single request against the backing store. There are no
/// multi-document transactions and no locking between callers: the last write to a key
/// wins.
pub trait DocumentStore: Send + Sync {
    /// Get a document by key. Returns `None` if it does not exist.
    fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>>;

    /// Create or overwrite the document at `key`.
    fn set(&self, collection: &str, key: &str, document: Document) -> StoreResult<()>;

    /// Merge `fields` into the existing document at `key`.
    ///
    /// Each top-level field in `fields` replaces the stored value of that field. Fails with
    /// [`StoreError::NotFound`] if the document does not exist.
    fn update(&self, collection: &str, key: &str, fields: Document) -> StoreResult<()>;

    /// Delete the document at `key`. Returns true if it existed.
    fn delete(&self, collection: &str, key: &str) -> StoreResult<bool>;

    /// All `(key, document)` pairs in `collection`, ordered by key.
    fn list_all(&self, collection: &str) -> StoreResult<Vec<(String, Document)>>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        (**self).get(collection, key)
    }

    fn set(&self, collection: &str, key: &str, document: Document) -> StoreResult<()> {
        (**self).set(collection, key, document)
    }

    fn update(&self, collection: &str, key: &str, fields: Document) -> StoreResult<()> {
        (**self).update(collection, key, fields)
    }

    fn delete(&self, collection: &str, key: &str) -> StoreResult<bool> {
        (**self).delete(collection, key)
    }

    fn list_all(&self, collection: &str) -> StoreResult<Vec<(String, Document)>> {
        (**self).list_all(collection)
    }
}

/// Validates a collection name against the same rules as a document key.
pub(crate) fn check_collection(name: &str) -> StoreResult<()> {
    hrs_types::RecordKey::parse(name)
        .map(|_| ())
        .map_err(|source| StoreError::InvalidCollection {
            name: name.to_owned(),
            source,
        })
}

/// Merge top-level `fields` into `target`.
pub(crate) fn merge_fields(target: &mut Document, fields: Document) {
    for (field, value) in fields {
        target.insert(field, value);
    }
}
