use hrs_docstore::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("patient not found: {0}")]
    NotFound(String),
    #[error("patient already exists: {0}")]
    Conflict(String),
    #[error("patient store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),
    #[error("stored patient document {id} is invalid: {reason}")]
    CorruptDocument { id: String, reason: String },
    #[error("failed to serialize patient: {0}")]
    Serialization(serde_json::Error),
}

impl From<StoreError> for PatientError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { key, .. } => PatientError::NotFound(key),
            StoreError::InvalidCollection { name, source } => {
                PatientError::Validation(format!("collection '{name}': {source}"))
            }
            other => PatientError::StoreUnavailable(other),
        }
    }
}

pub type PatientResult<T> = std::result::Result<T, PatientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_maps_to_not_found() {
        let err: PatientError = StoreError::NotFound {
            collection: "patients".into(),
            key: "P1".into(),
        }
        .into();
        assert!(matches!(err, PatientError::NotFound(ref id) if id == "P1"));
    }

    #[test]
    fn store_failures_map_to_unavailable() {
        let err: PatientError = StoreError::Unavailable("lock poisoned".into()).into();
        assert!(matches!(err, PatientError::StoreUnavailable(_)));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: PatientError = StoreError::Io(io).into();
        assert!(matches!(err, PatientError::StoreUnavailable(_)));
    }
}
