//! # Matrícula Models
//!
//! Domain models, request DTOs and payload validators shared by the API
//! server and the CLI.
//!
//! - [`ids`]: strongly-typed ID newtypes
//! - [`students`], [`course_groups`], [`enrollments`], [`users`]: entities,
//!   DTOs, filters and allow-listed change sets
//! - [`auth`]: login and password-change payloads
//! - [`validation`]: shared format checks (email, CPF, dates, password policy)
//!
//! Validators never touch storage. They return the ordered list of
//! [`FieldError`](matricula_core::FieldError)s for a payload; uniqueness and
//! cross-record rules live in the server's services.

pub mod auth;
pub mod course_groups;
pub mod enrollments;
pub mod ids;
pub mod students;
pub mod users;
pub mod validation;

pub use ids::{CourseGroupId, EnrollmentId, StudentId, UserId};
