//! Filesystem-backed document store.
//!
//! Each document lives in its own JSON file. Keys are arbitrary strings, so the file name
//! is derived from the SHA-256 digest of the key rather than the key itself, and the files
//! are sharded on the first four hex characters of that digest:
//!
//! ```text
//! <root>/
//! └── <collection>/
//!     └── ab/
//!         └── 3f/
//!             └── ab3f9e….json    # {"key": "P1", "document": {...}}
//! ```
//!
//! The original key is stored alongside the document so that listing can order results
//! by key without reversing the digest.
//!
//! Writes go to a uniquely named temporary file in the shard directory, which is then
//! renamed over the target. Concurrent writers to one key never share a temporary file, so
//! a reader sees one complete version or another and the last rename wins.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::{check_collection, merge_fields, Document, DocumentStore, StoreError, StoreResult};

const DOCUMENT_EXTENSION: &str = "json";

/// On-disk envelope for a single document.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoredDocument {
    key: String,
    document: Document,
}

/// Document store persisting one JSON file per document under a root directory.
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    root: PathBuf,
}

impl FileDocumentStore {
    /// Opens a store rooted at an existing directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if `root` does not exist, is not a directory, or
    /// cannot be canonicalised.
    pub fn open(root: &Path) -> StoreResult<Self> {
        if !root.is_dir() {
            return Err(StoreError::Unavailable(format!(
                "data directory does not exist or is not a directory: {}",
                root.display()
            )));
        }

        let root = root.canonicalize().map_err(|e| {
            StoreError::Unavailable(format!(
                "cannot canonicalise data directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(Self { root })
    }

    /// Creates `root` (and any parents) if needed, then opens it.
    pub fn create(root: &Path) -> StoreResult<Self> {
        fs::create_dir_all(root)?;
        Self::open(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }

    /// Returns `<root>/<collection>/<h[0..2]>/<h[2..4]>/<h>.json` for the key digest `h`.
    fn document_path(&self, collection: &str, key: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(key.as_bytes()));
        self.collection_dir(collection)
            .join(&digest[0..2])
            .join(&digest[2..4])
            .join(format!("{digest}.{DOCUMENT_EXTENSION}"))
    }

    fn read_stored(path: &Path) -> StoreResult<Option<StoredDocument>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_stored(path: &Path, stored: &StoredDocument) -> StoreResult<()> {
        let shard = path.parent().ok_or_else(|| {
            StoreError::Unavailable(format!("document path has no parent: {}", path.display()))
        })?;
        fs::create_dir_all(shard)?;

        // Temp names carry no `.json` extension, so listing never picks them up.
        let mut tmp = NamedTempFile::new_in(shard)?;
        tmp.write_all(&serde_json::to_vec_pretty(stored)?)?;
        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }

    /// Collects every document file under the two shard levels of `dir`.
    fn document_files(dir: &Path) -> StoreResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        let s1_iter = match fs::read_dir(dir) {
            Ok(it) => it,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(e.into()),
        };

        for s1 in s1_iter.flatten() {
            let s1_path = s1.path();
            if !s1_path.is_dir() {
                continue;
            }
            for s2 in fs::read_dir(&s1_path)?.flatten() {
                let s2_path = s2.path();
                if !s2_path.is_dir() {
                    continue;
                }
                for entry in fs::read_dir(&s2_path)?.flatten() {
                    let path = entry.path();
                    let is_document = path.is_file()
                        && path.extension().and_then(|e| e.to_str()) == Some(DOCUMENT_EXTENSION);
                    if is_document {
                        files.push(path);
                    }
                }
            }
        }

        Ok(files)
    }
}

impl DocumentStore for FileDocumentStore {
    fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        check_collection(collection)?;
        let path = self.document_path(collection, key);
        Ok(Self::read_stored(&path)?.map(|stored| stored.document))
    }

    fn set(&self, collection: &str, key: &str, document: Document) -> StoreResult<()> {
        check_collection(collection)?;
        let path = self.document_path(collection, key);
        Self::write_stored(
            &path,
            &StoredDocument {
                key: key.to_owned(),
                document,
            },
        )
    }

    fn update(&self, collection: &str, key: &str, fields: Document) -> StoreResult<()> {
        check_collection(collection)?;
        let path = self.document_path(collection, key);
        let mut stored = Self::read_stored(&path)?.ok_or_else(|| StoreError::NotFound {
            collection: collection.to_owned(),
            key: key.to_owned(),
        })?;
        merge_fields(&mut stored.document, fields);
        Self::write_stored(&path, &stored)
    }

    fn delete(&self, collection: &str, key: &str) -> StoreResult<bool> {
        check_collection(collection)?;
        let path = self.document_path(collection, key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list_all(&self, collection: &str) -> StoreResult<Vec<(String, Document)>> {
        check_collection(collection)?;
        let mut entries = Vec::new();

        for path in Self::document_files(&self.collection_dir(collection))? {
            match Self::read_stored(&path) {
                Ok(Some(stored)) => entries.push((stored.key, stored.document)),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("skipping unreadable document {}: {}", path.display(), e);
                }
            }
        }

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }
}
