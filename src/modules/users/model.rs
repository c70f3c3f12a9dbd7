//! User data models and DTOs.
//!
//! Re-exported from the `matricula-models` crate.

pub use matricula_models::ids::UserId;
pub use matricula_models::users::*;
