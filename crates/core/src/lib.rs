//! # Health Record Core
//!
//! Core business logic for the health record system.
//!
//! This crate contains pure data operations:
//! - The patient record schema ([`PatientRecord`]) and its validation rules
//! - [`PatientRecordStore`], which maps records onto a keyed document store
//! - Startup configuration and store construction
//!
//! **No API concerns**: HTTP servers, CLI parsing and output formatting belong in
//! `api-rest`, `api-shared` or `hrs-cli`.

pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod record;
pub mod repositories;
pub mod validation;

pub use config::{open_store, ConflictPolicy, CoreConfig, StoreBackend};
pub use constants::DEFAULT_PATIENT_DATA_DIR;
pub use error::{PatientError, PatientResult};
pub use record::{
    BloodType, Contact, Gender, Insurance, Medical, PatientRecord, PatientRecordSummary,
};
pub use repositories::patients::{PatientRecordStore, Summaries};

pub use hrs_docstore::{DocumentStore, FileDocumentStore, InMemoryDocumentStore};
pub use hrs_types::{RecordKey, TextError};
