//! # Matrícula Core
//!
//! Core types, errors, and utilities for the Matrícula API.
//!
//! This crate provides foundational types used throughout the application:
//!
//! - [`errors`]: Application error type, field-level validation errors and the
//!   JSON error envelope
//! - [`response`]: The JSON success envelope
//! - [`pagination`]: Page/limit pagination for list endpoints
//! - [`password`]: Password hashing and verification
//! - [`serde`]: Custom serde deserialization helpers
//!
//! # Example
//!
//! ```ignore
//! use matricula_core::errors::{AppError, FieldError};
//! use matricula_core::password::{hash_password, verify_password};
//!
//! // A validation failure carrying field-level details
//! let error = AppError::validation(vec![FieldError::new("email", "Email inválido")]);
//!
//! // A missing resource
//! let error = AppError::resource_not_found("Estudante");
//!
//! // Hash a password
//! let hash = hash_password("Secret123")?;
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod response;
pub mod serde;

// Re-export commonly used types at crate root
pub use errors::{AppError, FieldError};
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
pub use response::ApiResponse;
