//! Student data models and DTOs.
//!
//! Re-exported from the `matricula-models` crate.

pub use matricula_models::ids::StudentId;
pub use matricula_models::students::*;
