//! Enrollment data models and DTOs.
//!
//! Re-exported from the `matricula-models` crate.

pub use matricula_models::enrollments::*;
pub use matricula_models::ids::EnrollmentId;
