//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into core services. The
//! binaries read environment variables and hand the raw values to the `*_from_env_value`
//! helpers here; nothing in the core reads the environment during request handling.

use crate::constants::{DEFAULT_COLLECTION, DEFAULT_PATIENT_DATA_DIR};
use crate::{PatientError, PatientResult};
use hrs_docstore::{DocumentStore, FileDocumentStore, InMemoryDocumentStore};
use hrs_types::RecordKey;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Which document store implementation backs the patient records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local storage; records are lost on exit.
    Memory,
    /// One JSON file per record under the data directory.
    #[default]
    File,
}

impl FromStr for StoreBackend {
    type Err = PatientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "file" => Ok(StoreBackend::File),
            other => Err(PatientError::Validation(format!(
                "store backend must be 'memory' or 'file', got '{other}'"
            ))),
        }
    }
}

/// What `create` does when a record with the same ID already exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Fail with `PatientError::Conflict` and leave the stored record untouched.
    #[default]
    Reject,
    /// Replace the stored record (upsert).
    Overwrite,
}

impl FromStr for ConflictPolicy {
    type Err = PatientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(ConflictPolicy::Reject),
            "overwrite" => Ok(ConflictPolicy::Overwrite),
            other => Err(PatientError::Validation(format!(
                "conflict policy must be 'reject' or 'overwrite', got '{other}'"
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    store_backend: StoreBackend,
    patient_data_dir: PathBuf,
    collection: RecordKey,
    conflict_policy: ConflictPolicy,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::Validation` if `collection` is not a legal collection name.
    pub fn new(
        store_backend: StoreBackend,
        patient_data_dir: PathBuf,
        collection: &str,
        conflict_policy: ConflictPolicy,
    ) -> PatientResult<Self> {
        let collection = RecordKey::parse(collection).map_err(|e| {
            PatientError::Validation(format!("collection name '{collection}' is invalid: {e}"))
        })?;

        Ok(Self {
            store_backend,
            patient_data_dir,
            collection,
            conflict_policy,
        })
    }

    /// Build a config from raw environment values, applying defaults for unset or blank
    /// values.
    pub fn from_env_values(
        store_backend: Option<String>,
        patient_data_dir: Option<String>,
        collection: Option<String>,
        conflict_policy: Option<String>,
    ) -> PatientResult<Self> {
        let store_backend = parse_or_default::<StoreBackend>(store_backend)?;
        let conflict_policy = parse_or_default::<ConflictPolicy>(conflict_policy)?;
        let patient_data_dir = non_blank(patient_data_dir)
            .unwrap_or_else(|| DEFAULT_PATIENT_DATA_DIR.into())
            .into();
        let collection = non_blank(collection).unwrap_or_else(|| DEFAULT_COLLECTION.into());

        Self::new(store_backend, patient_data_dir, &collection, conflict_policy)
    }

    pub fn store_backend(&self) -> StoreBackend {
        self.store_backend
    }

    pub fn patient_data_dir(&self) -> &Path {
        &self.patient_data_dir
    }

    pub fn collection(&self) -> &RecordKey {
        &self.collection
    }

    pub fn conflict_policy(&self) -> ConflictPolicy {
        self.conflict_policy
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            store_backend: StoreBackend::default(),
            patient_data_dir: PathBuf::from(DEFAULT_PATIENT_DATA_DIR),
            collection: default_collection(),
            conflict_policy: ConflictPolicy::default(),
        }
    }
}

pub(crate) fn default_collection() -> RecordKey {
    // DEFAULT_COLLECTION is a constant known to satisfy the key rules.
    RecordKey::parse(DEFAULT_COLLECTION).unwrap_or_else(|_| unreachable!())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or_default<T>(value: Option<String>) -> PatientResult<T>
where
    T: FromStr<Err = PatientError> + Default,
{
    Ok(non_blank(value)
        .map(|v| v.parse::<T>())
        .transpose()?
        .unwrap_or_default())
}

/// Open the configured document store.
///
/// The handle is created once per process and injected into services.
///
/// # Arguments
///
/// * `create_missing` - create the data directory when it does not exist, instead of
///   failing. Only meaningful for [`StoreBackend::File`].
///
/// # Errors
///
/// Returns `PatientError::StoreUnavailable` if the data directory is missing (and
/// `create_missing` is false) or cannot be created.
pub fn open_store(
    cfg: &CoreConfig,
    create_missing: bool,
) -> PatientResult<Arc<dyn DocumentStore>> {
    match cfg.store_backend() {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory patient store; records will not persist");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
        StoreBackend::File => {
            let dir = cfg.patient_data_dir();
            let store = if create_missing {
                FileDocumentStore::create(dir)
            } else {
                FileDocumentStore::open(dir)
            }
            .map_err(PatientError::StoreUnavailable)?;
            tracing::info!("patient store opened at {}", store.root().display());
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn from_env_values_applies_defaults() {
        let cfg = CoreConfig::from_env_values(None, None, None, Some("  ".into())).unwrap();
        assert_eq!(cfg.store_backend(), StoreBackend::File);
        assert_eq!(cfg.patient_data_dir(), Path::new(DEFAULT_PATIENT_DATA_DIR));
        assert_eq!(cfg.collection().as_str(), DEFAULT_COLLECTION);
        assert_eq!(cfg.conflict_policy(), ConflictPolicy::Reject);
    }

    #[test]
    fn from_env_values_parses_overrides() {
        let cfg = CoreConfig::from_env_values(
            Some("Memory".into()),
            Some("/tmp/records".into()),
            Some("people".into()),
            Some("overwrite".into()),
        )
        .unwrap();
        assert_eq!(cfg.store_backend(), StoreBackend::Memory);
        assert_eq!(cfg.patient_data_dir(), Path::new("/tmp/records"));
        assert_eq!(cfg.collection().as_str(), "people");
        assert_eq!(cfg.conflict_policy(), ConflictPolicy::Overwrite);
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(matches!(
            CoreConfig::from_env_values(Some("postgres".into()), None, None, None),
            Err(PatientError::Validation(_))
        ));
        assert!(matches!(
            CoreConfig::from_env_values(None, None, None, Some("merge".into())),
            Err(PatientError::Validation(_))
        ));
        assert!(matches!(
            CoreConfig::from_env_values(None, None, Some("a/b".into()), None),
            Err(PatientError::Validation(_))
        ));
    }

    #[test]
    fn open_store_requires_existing_directory_unless_creating() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join("patient_data");
        let cfg = CoreConfig::new(
            StoreBackend::File,
            data_dir.clone(),
            DEFAULT_COLLECTION,
            ConflictPolicy::Reject,
        )
        .unwrap();

        match open_store(&cfg, false) {
            Err(err @ PatientError::StoreUnavailable(_)) => {
                assert!(err.to_string().contains("does not exist"), "{err}");
            }
            other => panic!("expected StoreUnavailable, got {:?}", other.map(|_| ())),
        }
        assert!(!data_dir.exists(), "opening must not create the directory");
        assert!(open_store(&cfg, true).is_ok());
        assert!(data_dir.is_dir());
        assert!(open_store(&cfg, false).is_ok());
    }

    #[test]
    fn open_store_memory_backend_needs_no_directory() {
        let cfg = CoreConfig::new(
            StoreBackend::Memory,
            PathBuf::from("/definitely/not/here"),
            DEFAULT_COLLECTION,
            ConflictPolicy::Reject,
        )
        .unwrap();
        let store = open_store(&cfg, false).unwrap();
        assert!(store.list_all(DEFAULT_COLLECTION).unwrap().is_empty());
    }
}
