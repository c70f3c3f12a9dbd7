//! Course group data models and DTOs.
//!
//! Re-exported from the `matricula-models` crate.

pub use matricula_models::course_groups::*;
pub use matricula_models::ids::CourseGroupId;
