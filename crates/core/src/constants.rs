//! Constants used throughout the health record core crate.

/// Default directory for the file-backed store when no directory is configured.
pub const DEFAULT_PATIENT_DATA_DIR: &str = "patient_data";

/// Default collection holding patient documents.
pub const DEFAULT_COLLECTION: &str = "patients";

/// Maximum accepted patient age in years (inclusive).
pub const MAX_AGE: u8 = 120;
