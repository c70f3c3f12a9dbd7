//! Feature modules.
//!
//! Each module keeps the same layout: `model` (re-exported from
//! `matricula-models`), `repository` (storage trait and its PostgreSQL
//! implementation), `service` (business rules), `controller` (HTTP handlers)
//! and `router`.

pub mod auth;
pub mod course_groups;
pub mod enrollments;
pub mod students;
pub mod users;
