//! Repository services.
//!
//! Each service enforces a record schema on top of the injected document store.

pub mod patients;
