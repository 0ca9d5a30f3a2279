//! # API Shared
//!
//! Shared definitions for the health record APIs.
//!
//! Contains:
//! - JSON request/response bodies with OpenAPI schemas (`dto` module)
//! - `HealthService`
//! - API key checking
//!
//! Used by `api-rest` and the `hrs-run` server binary.

pub mod auth;
pub mod dto;
pub mod health;

pub use auth::{validate_api_key, AuthError, API_KEY_HEADER};
pub use dto::*;
pub use health::HealthService;
