//! InMemoryDocumentStore - BTreeMap-backed document store for tests and demo runs.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{check_collection, merge_fields, Document, DocumentStore, StoreError, StoreResult};

type Collections = BTreeMap<String, BTreeMap<String, Document>>;

/// In-memory document store.
///
/// Clone-friendly via `Arc`: clones share the same storage.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    storage: Arc<RwLock<Collections>>,
}

impl InMemoryDocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Collections>> {
        self.storage
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Collections>> {
        self.storage
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        check_collection(collection)?;
        let storage = self.read()?;
        Ok(storage
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    fn set(&self, collection: &str, key: &str, document: Document) -> StoreResult<()> {
        check_collection(collection)?;
        let mut storage = self.write()?;
        storage
            .entry(collection.to_owned())
            .or_default()
            .insert(key.to_owned(), document);
        Ok(())
    }

    fn update(&self, collection: &str, key: &str, fields: Document) -> StoreResult<()> {
        check_collection(collection)?;
        let mut storage = self.write()?;
        let existing = storage
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(key))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_owned(),
                key: key.to_owned(),
            })?;
        merge_fields(existing, fields);
        Ok(())
    }

    fn delete(&self, collection: &str, key: &str) -> StoreResult<bool> {
        check_collection(collection)?;
        let mut storage = self.write()?;
        Ok(storage
            .get_mut(collection)
            .map(|docs| docs.remove(key).is_some())
            .unwrap_or(false))
    }

    fn list_all(&self, collection: &str) -> StoreResult<Vec<(String, Document)>> {
        check_collection(collection)?;
        let storage = self.read()?;
        Ok(storage
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(key, document)| (key.clone(), document.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance;
    use serde_json::json;

    #[test]
    fn satisfies_document_store_contract() {
        conformance::run_all(InMemoryDocumentStore::new);
    }

    #[test]
    fn clone_shares_storage() {
        let store = InMemoryDocumentStore::new();
        let clone = store.clone();

        let mut doc = Document::new();
        doc.insert("name".into(), json!("Alice"));
        store.set("patients", "P1", doc.clone()).unwrap();

        assert_eq!(clone.get("patients", "P1").unwrap(), Some(doc));
    }

    #[test]
    fn works_behind_a_trait_object() {
        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
        store.set("patients", "P1", Document::new()).unwrap();
        assert_eq!(store.list_all("patients").unwrap().len(), 1);
    }
}
