//! Input validation for patient records.
//!
//! Validation runs before any store call, so a rejected record never touches the store.

use crate::constants::MAX_AGE;
use crate::record::PatientRecord;
use crate::{PatientError, PatientResult};
use hrs_types::{RecordKey, TextError};

/// Validates a patient identifier for use as a document key.
///
/// The identifier is used verbatim, so surrounding whitespace is rejected rather than
/// trimmed away.
///
/// # Errors
///
/// Returns `PatientError::Validation` if the identifier is empty, padded with whitespace,
/// or not a legal document key.
pub fn validate_patient_id(id: &str) -> PatientResult<RecordKey> {
    let key = RecordKey::parse(id).map_err(|e| match e {
        TextError::Empty => PatientError::Validation("Patient ID is required".into()),
        other => PatientError::Validation(format!("Patient ID is invalid: {other}")),
    })?;

    if key.as_str() != id {
        return Err(PatientError::Validation(
            "Patient ID must not start or end with whitespace".into(),
        ));
    }

    Ok(key)
}

/// Validates every field rule of a record, returning its document key.
///
/// Gender and blood type are closed enums and need no runtime check here.
pub fn validate_record(record: &PatientRecord) -> PatientResult<RecordKey> {
    let key = validate_patient_id(&record.id)?;

    if record.name.trim().is_empty() {
        return Err(PatientError::Validation("Full Name is required".into()));
    }

    if record.age > MAX_AGE {
        return Err(PatientError::Validation(format!(
            "age must be between 0 and {MAX_AGE}, got {}",
            record.age
        )));
    }

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_minimal_record() {
        let record = PatientRecord::new("P1", "Alice");
        assert_eq!(validate_record(&record).unwrap().as_str(), "P1");
    }

    #[test]
    fn rejects_empty_id_and_name() {
        for (id, name) in [("", "Alice"), ("P1", ""), ("  ", "Alice"), ("P1", "   ")] {
            let err = validate_record(&PatientRecord::new(id, name)).unwrap_err();
            assert!(
                matches!(err, PatientError::Validation(_)),
                "({id:?}, {name:?}) should fail validation"
            );
        }
    }

    #[test]
    fn rejects_padded_or_reserved_ids() {
        assert!(validate_patient_id(" P1").is_err());
        assert!(validate_patient_id("ward/P1").is_err());
        assert!(validate_patient_id("..").is_err());
    }

    #[test]
    fn age_is_bounded() {
        let mut record = PatientRecord::new("P1", "Alice");
        record.age = MAX_AGE;
        assert!(validate_record(&record).is_ok());

        record.age = MAX_AGE + 1;
        let err = validate_record(&record).unwrap_err();
        assert!(err.to_string().contains("age"));
    }
}
