//! Patient record storage.
//!
//! [`PatientRecordStore`] enforces the patient record schema on top of a schemaless
//! [`DocumentStore`]. Each record is one document in the configured collection, keyed by
//! the patient ID:
//!
//! ```text
//! patients/
//!   P1  ->  { "id": "P1", "name": "Alice", ..., "insurance": { ... } }
//!   P2  ->  { ... }
//! ```
//!
//! Every operation is a single validate → store call → result sequence. There are no
//! retries and no locking between callers, so concurrent writers to the same ID race and
//! the last write wins.
//!
//! ## Pure Data Operations
//!
//! No API concerns live here. Parsing user input and rendering results belong to
//! `api-rest` and `hrs-cli`.

use crate::config::{default_collection, ConflictPolicy, CoreConfig};
use crate::document::PatientDocument;
use crate::error::{PatientError, PatientResult};
use crate::record::{PatientRecord, PatientRecordSummary};
use crate::validation::{validate_patient_id, validate_record};
use hrs_docstore::{Document, DocumentStore};
use hrs_types::RecordKey;

/// Schema-enforcing wrapper around a keyed document store.
///
/// The store handle is injected rather than created here, so tests can hand in an
/// in-memory store and the server can share one handle across requests.
#[derive(Clone, Debug)]
pub struct PatientRecordStore<S> {
    store: S,
    collection: RecordKey,
    conflict_policy: ConflictPolicy,
}

impl<S: DocumentStore> PatientRecordStore<S> {
    /// Wraps `store` using the default `patients` collection and reject-on-conflict.
    pub fn new(store: S) -> Self {
        Self {
            store,
            collection: default_collection(),
            conflict_policy: ConflictPolicy::Reject,
        }
    }

    /// Wraps `store` using the collection and conflict policy from `cfg`.
    pub fn with_config(store: S, cfg: &CoreConfig) -> Self {
        Self {
            store,
            collection: cfg.collection().clone(),
            conflict_policy: cfg.conflict_policy(),
        }
    }

    pub fn with_conflict_policy(mut self, conflict_policy: ConflictPolicy) -> Self {
        self.conflict_policy = conflict_policy;
        self
    }

    pub fn collection(&self) -> &RecordKey {
        &self.collection
    }

    pub fn conflict_policy(&self) -> ConflictPolicy {
        self.conflict_policy
    }

    /// Creates a new patient record keyed by `record.id`.
    ///
    /// # Errors
    ///
    /// Returns `PatientError` if:
    /// - the ID or name is empty, or the age is out of range ([`PatientError::Validation`])
    /// - a record with the same ID exists and the policy is
    ///   [`ConflictPolicy::Reject`] ([`PatientError::Conflict`])
    /// - the backing store fails ([`PatientError::StoreUnavailable`])
    ///
    /// Validation failures return before the store is touched.
    pub fn create(&self, record: &PatientRecord) -> PatientResult<()> {
        let key = validate_record(record)?;
        let document = PatientDocument::render(record)?;

        if self.conflict_policy == ConflictPolicy::Reject
            && self.store.get(self.collection.as_str(), key.as_str())?.is_some()
        {
            tracing::warn!("rejected create for existing patient {}", key);
            return Err(PatientError::Conflict(key.to_string()));
        }

        self.store
            .set(self.collection.as_str(), key.as_str(), document)?;
        tracing::info!("created patient {}", key);
        Ok(())
    }

    /// Reads the record stored under `id`.
    ///
    /// # Errors
    ///
    /// - [`PatientError::NotFound`] if no record has this ID
    /// - [`PatientError::Validation`] if `id` cannot be a record key at all
    /// - [`PatientError::CorruptDocument`] if the stored document does not match the schema
    pub fn read(&self, id: &str) -> PatientResult<PatientRecord> {
        let key = validate_patient_id(id)?;
        let document = self.fetch(&key)?;
        PatientDocument::parse(key.as_str(), document)
    }

    /// Replaces every field of the existing record under `id`.
    ///
    /// This is a full replacement: the stored document is overwritten as a whole, so no
    /// field of the old document survives, including fields outside the schema. The key
    /// is immutable, so `record.id` must equal `id`.
    ///
    /// # Errors
    ///
    /// - [`PatientError::Validation`] if the record is invalid or its ID differs from `id`
    /// - [`PatientError::NotFound`] if no record has this ID
    pub fn update(&self, id: &str, record: &PatientRecord) -> PatientResult<()> {
        let key = validate_patient_id(id)?;
        if record.id != key.as_str() {
            return Err(PatientError::Validation(format!(
                "Patient ID cannot be changed (record '{}' submitted for '{}')",
                record.id, key
            )));
        }
        validate_record(record)?;
        let document = PatientDocument::render(record)?;

        self.fetch(&key)?;
        self.store
            .set(self.collection.as_str(), key.as_str(), document)?;
        tracing::info!("updated patient {}", key);
        Ok(())
    }

    /// Deletes the record under `id`, returning the removed record.
    ///
    /// # Errors
    ///
    /// - [`PatientError::NotFound`] if no record has this ID
    /// - [`PatientError::CorruptDocument`] if the stored document cannot be decoded; the
    ///   document is left in place
    pub fn delete(&self, id: &str) -> PatientResult<PatientRecord> {
        let key = validate_patient_id(id)?;
        let snapshot = PatientDocument::parse(key.as_str(), self.fetch(&key)?)?;

        if !self.store.delete(self.collection.as_str(), key.as_str())? {
            return Err(PatientError::NotFound(key.to_string()));
        }
        tracing::info!("deleted patient {}", key);
        Ok(snapshot)
    }

    /// Lists a summary of every stored record, ordered by ID.
    ///
    /// The returned iterator decodes documents as it is advanced and cannot be restarted.
    /// Documents that do not match the schema are skipped with a warning. An empty store
    /// yields an empty iterator.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::StoreUnavailable`] if the documents cannot be fetched.
    pub fn list(&self) -> PatientResult<Summaries> {
        let documents = self.store.list_all(self.collection.as_str())?;
        Ok(Summaries {
            documents: documents.into_iter(),
        })
    }

    fn fetch(&self, key: &RecordKey) -> PatientResult<Document> {
        self.store
            .get(self.collection.as_str(), key.as_str())?
            .ok_or_else(|| PatientError::NotFound(key.to_string()))
    }
}

/// Iterator over patient summaries returned by [`PatientRecordStore::list`].
///
/// Each document is decoded against the key it is stored under, so a listed ID can always
/// be read back.
#[derive(Debug)]
pub struct Summaries {
    documents: std::vec::IntoIter<(String, Document)>,
}

impl Iterator for Summaries {
    type Item = PatientRecordSummary;

    fn next(&mut self) -> Option<Self::Item> {
        for (key, document) in self.documents.by_ref() {
            match PatientDocument::parse(&key, document) {
                Ok(record) => return Some(record.summary()),
                Err(e) => tracing::warn!("skipping patient document: {}", e),
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.documents.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreBackend;
    use crate::record::{BloodType, Gender};
    use hrs_docstore::{FileDocumentStore, InMemoryDocumentStore, StoreError, StoreResult};
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn alice() -> PatientRecord {
        let mut record = PatientRecord::new("P1", "Alice");
        record.age = 30;
        record.gender = Gender::Female;
        record.contact.phone = "555-0100".into();
        record.contact.email = "alice@example.com".into();
        record.contact.address = "1 Main St".into();
        record.medical.blood_type = BloodType::OPositive;
        record.medical.allergies = "Penicillin".into();
        record.insurance.provider = "Acme Health".into();
        record.insurance.id = "ACME-42".into();
        record
    }

    fn test_store() -> PatientRecordStore<InMemoryDocumentStore> {
        PatientRecordStore::new(InMemoryDocumentStore::new())
    }

    /// A store whose every call fails, standing in for an unreachable backend.
    struct UnreachableStore;

    impl DocumentStore for UnreachableStore {
        fn get(&self, _: &str, _: &str) -> StoreResult<Option<Document>> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        fn set(&self, _: &str, _: &str, _: Document) -> StoreResult<()> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        fn update(&self, _: &str, _: &str, _: Document) -> StoreResult<()> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        fn delete(&self, _: &str, _: &str) -> StoreResult<bool> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        fn list_all(&self, _: &str) -> StoreResult<Vec<(String, Document)>> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    #[test]
    fn test_create_then_read_returns_identical_record() {
        let store = test_store();
        store.create(&alice()).expect("create should succeed");
        assert_eq!(store.read("P1").expect("read should succeed"), alice());
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let store = test_store();
        let err = store.read("never-created").unwrap_err();
        assert!(matches!(err, PatientError::NotFound(ref id) if id == "never-created"));
    }

    #[test]
    fn test_create_with_empty_id_or_name_never_touches_store() {
        let backing = InMemoryDocumentStore::new();
        let store = PatientRecordStore::new(backing.clone());

        for record in [PatientRecord::new("", "Alice"), PatientRecord::new("P1", "")] {
            let err = store.create(&record).unwrap_err();
            assert!(matches!(err, PatientError::Validation(_)));
        }

        assert!(backing.list_all("patients").unwrap().is_empty());
    }

    #[test]
    fn test_create_rejects_existing_id_by_default() {
        let store = test_store();
        store.create(&alice()).unwrap();

        let mut impostor = PatientRecord::new("P1", "Mallory");
        impostor.age = 99;
        let err = store.create(&impostor).unwrap_err();

        assert!(matches!(err, PatientError::Conflict(ref id) if id == "P1"));
        assert_eq!(store.read("P1").unwrap(), alice(), "original must be untouched");
    }

    #[test]
    fn test_create_overwrites_with_overwrite_policy() {
        let store = test_store().with_conflict_policy(ConflictPolicy::Overwrite);
        store.create(&alice()).unwrap();

        let replacement = PatientRecord::new("P1", "Alicia");
        store.create(&replacement).unwrap();

        assert_eq!(store.read("P1").unwrap(), replacement);
    }

    #[test]
    fn test_update_is_full_replacement() {
        let store = test_store();
        store.create(&alice()).unwrap();

        let replacement = PatientRecord::new("P1", "Alice Smith");
        store.update("P1", &replacement).unwrap();

        let loaded = store.read("P1").unwrap();
        assert_eq!(loaded, replacement);
        assert!(loaded.contact.phone.is_empty(), "old fields must not survive");
        assert!(loaded.medical.allergies.is_empty());
    }

    #[test]
    fn test_update_drops_stray_fields_from_stored_document() {
        let backing = InMemoryDocumentStore::new();
        let store = PatientRecordStore::new(backing.clone());

        let mut legacy = PatientDocument::render(&alice()).unwrap();
        legacy.insert("legacy".into(), json!("x"));
        backing.set("patients", "P1", legacy).unwrap();
        assert!(matches!(
            store.read("P1"),
            Err(PatientError::CorruptDocument { .. })
        ));

        let replacement = PatientRecord::new("P1", "Alice Smith");
        store.update("P1", &replacement).unwrap();

        assert_eq!(store.read("P1").unwrap(), replacement);
        let stored = backing.get("patients", "P1").unwrap().unwrap();
        assert!(!stored.contains_key("legacy"));
    }

    #[test]
    fn test_update_missing_is_not_found_and_creates_nothing() {
        let store = test_store();
        let err = store
            .update("P9", &PatientRecord::new("P9", "Nobody"))
            .unwrap_err();
        assert!(matches!(err, PatientError::NotFound(_)));
        assert!(matches!(store.read("P9"), Err(PatientError::NotFound(_))));
    }

    #[test]
    fn test_update_cannot_change_id() {
        let store = test_store();
        store.create(&alice()).unwrap();

        let err = store
            .update("P1", &PatientRecord::new("P2", "Alice"))
            .unwrap_err();
        assert!(matches!(err, PatientError::Validation(_)));
        assert!(matches!(store.read("P2"), Err(PatientError::NotFound(_))));
        assert_eq!(store.read("P1").unwrap(), alice());
    }

    #[test]
    fn test_update_validates_fields() {
        let store = test_store();
        store.create(&alice()).unwrap();

        let mut invalid = alice();
        invalid.name = " ".into();
        assert!(matches!(
            store.update("P1", &invalid),
            Err(PatientError::Validation(_))
        ));
    }

    #[test]
    fn test_delete_returns_snapshot_and_removes_record() {
        let store = test_store();
        store.create(&alice()).unwrap();

        let deleted = store.delete("P1").unwrap();
        assert_eq!(deleted, alice());
        assert!(matches!(store.read("P1"), Err(PatientError::NotFound(_))));
        assert!(matches!(store.delete("P1"), Err(PatientError::NotFound(_))));
    }

    #[test]
    fn test_list_empty_store_is_empty() {
        let store = test_store();
        assert_eq!(store.list().unwrap().count(), 0);
    }

    #[test]
    fn test_list_returns_ordered_summaries() {
        let store = test_store();
        let mut bob = PatientRecord::new("P2", "Bob");
        bob.age = 45;
        store.create(&bob).unwrap();
        store.create(&alice()).unwrap();

        let summaries: Vec<_> = store.list().unwrap().collect();
        assert_eq!(summaries, vec![alice().summary(), bob.summary()]);
    }

    #[test]
    fn test_list_skips_corrupt_documents() {
        let backing = InMemoryDocumentStore::new();
        let store = PatientRecordStore::new(backing.clone());
        store.create(&alice()).unwrap();

        let mut corrupt = Document::new();
        corrupt.insert("id".into(), json!("P0"));
        corrupt.insert("name".into(), json!("Half written"));
        backing.set("patients", "P0", corrupt).unwrap();

        let summaries: Vec<_> = store.list().unwrap().collect();
        assert_eq!(summaries, vec![alice().summary()]);
        assert!(matches!(
            store.read("P0"),
            Err(PatientError::CorruptDocument { .. })
        ));
    }

    #[test]
    fn test_list_skips_documents_stored_under_another_key() {
        let backing = InMemoryDocumentStore::new();
        let store = PatientRecordStore::new(backing.clone());

        let misfiled = PatientDocument::render(&alice()).unwrap();
        backing.set("patients", "P0", misfiled).unwrap();

        assert_eq!(store.list().unwrap().count(), 0);
        assert!(matches!(store.read("P1"), Err(PatientError::NotFound(_))));
        assert!(matches!(
            store.read("P0"),
            Err(PatientError::CorruptDocument { .. })
        ));
    }

    #[test]
    fn test_listed_ids_can_be_read_back() {
        let store = test_store();
        store.create(&alice()).unwrap();
        store.create(&PatientRecord::new("P2", "Bob")).unwrap();

        for summary in store.list().unwrap() {
            assert_eq!(store.read(&summary.id).unwrap().summary(), summary);
        }
    }

    #[test]
    fn test_unreachable_store_surfaces_store_unavailable() {
        let store = PatientRecordStore::new(UnreachableStore);

        assert!(matches!(
            store.create(&alice()),
            Err(PatientError::StoreUnavailable(_))
        ));
        assert!(matches!(
            store.read("P1"),
            Err(PatientError::StoreUnavailable(_))
        ));
        assert!(matches!(
            store.list(),
            Err(PatientError::StoreUnavailable(_))
        ));
    }

    #[test]
    fn test_with_config_uses_configured_collection() {
        let backing = InMemoryDocumentStore::new();
        let cfg = CoreConfig::new(
            StoreBackend::Memory,
            PathBuf::new(),
            "people",
            ConflictPolicy::Overwrite,
        )
        .unwrap();
        let store = PatientRecordStore::with_config(backing.clone(), &cfg);

        store.create(&alice()).unwrap();
        assert_eq!(store.conflict_policy(), ConflictPolicy::Overwrite);
        assert!(backing.get("people", "P1").unwrap().is_some());
        assert!(backing.get("patients", "P1").unwrap().is_none());
    }

    #[test]
    fn test_alice_lifecycle_on_file_store() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let backing = FileDocumentStore::open(temp_dir.path()).expect("open should succeed");
        let store = PatientRecordStore::new(backing);

        let mut record = PatientRecord::new("P1", "Alice");
        record.age = 30;
        record.gender = Gender::Female;
        record.medical.blood_type = BloodType::OPositive;

        store.create(&record).unwrap();
        assert_eq!(store.read("P1").unwrap(), record);

        record.age = 31;
        store.update("P1", &record).unwrap();
        assert_eq!(store.read("P1").unwrap().age, 31);

        store.delete("P1").unwrap();
        assert!(matches!(store.read("P1"), Err(PatientError::NotFound(_))));
    }
}
