//! Student domain models, DTOs and validation.

use chrono::{DateTime, Utc};
use matricula_core::serde::deserialize_present;
use matricula_core::{FieldError, PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::enrollments::{Enrollment, EnrollmentWithCourseGroup};
use crate::ids::{CourseGroupId, StudentId};
use crate::validation::{is_missing, is_valid_cpf, is_valid_email, present};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    /// Academic registration number, immutable
    pub ra: String,
    /// Digits only, immutable
    pub cpf: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The student fields embedded in enrollment listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StudentSummary {
    pub id: StudentId,
    pub name: String,
    pub email: String,
}

impl From<&Student> for StudentSummary {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id,
            name: student.name.clone(),
            email: student.email.clone(),
        }
    }
}

/// A row of the student listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentListItem {
    #[serde(flatten)]
    pub student: Student,
    pub enrollments: Vec<EnrollmentWithCourseGroup>,
    /// Number of enrollments in `active` status
    #[serde(rename = "activeCourseCount")]
    pub active_course_count: i64,
}

/// A student with every enrollment and its course group.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentWithEnrollments {
    #[serde(flatten)]
    pub student: Student,
    pub enrollments: Vec<EnrollmentWithCourseGroup>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateStudentDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub ra: Option<String>,
    /// Formatting characters are accepted and stripped
    #[serde(default)]
    pub cpf: Option<String>,
    /// Course groups to enroll the new student in
    #[serde(default, rename = "courseGroupIds", alias = "course_group_ids")]
    pub course_group_ids: Option<Vec<CourseGroupId>>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateStudentDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Rejected whenever present
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub ra: Option<Value>,
    /// Rejected whenever present
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub cpf: Option<Value>,
    /// Course groups to add; pairs that already exist are skipped
    #[serde(default, rename = "courseGroupIds", alias = "course_group_ids")]
    pub course_group_ids: Option<Vec<CourseGroupId>>,
}

impl UpdateStudentDto {
    /// `ra` and `cpf` cannot change, whatever value is sent.
    pub fn immutable_field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.ra.is_some() {
            errors.push(FieldError::new("ra", "O RA não pode ser alterado"));
        }
        if self.cpf.is_some() {
            errors.push(FieldError::new("cpf", "O CPF não pode ser alterado"));
        }
        errors
    }
}

/// Borrowed view over the validated fields of a student payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct StudentFields<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub ra: Option<&'a str>,
    pub cpf: Option<&'a str>,
}

impl CreateStudentDto {
    pub fn fields(&self) -> StudentFields<'_> {
        StudentFields {
            name: self.name.as_deref(),
            email: self.email.as_deref(),
            ra: self.ra.as_deref(),
            cpf: self.cpf.as_deref(),
        }
    }
}

impl UpdateStudentDto {
    pub fn fields(&self) -> StudentFields<'_> {
        StudentFields {
            name: self.name.as_deref(),
            email: self.email.as_deref(),
            ra: None,
            cpf: None,
        }
    }
}

/// Shape and format checks for a student payload.
///
/// On create every field is required. Email and CPF formats are checked
/// whenever a value is given. Uniqueness is checked by the service.
pub fn validate_student(data: &StudentFields<'_>, is_update: bool) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if is_missing(data.name, is_update) {
        errors.push(FieldError::new("name", "Nome é obrigatório"));
    }
    if is_missing(data.email, is_update) {
        errors.push(FieldError::new("email", "Email é obrigatório"));
    }
    if is_missing(data.ra, is_update) {
        errors.push(FieldError::new("ra", "RA é obrigatório"));
    }
    if is_missing(data.cpf, is_update) {
        errors.push(FieldError::new("cpf", "CPF é obrigatório"));
    }

    if let Some(email) = present(data.email) {
        if !is_valid_email(email) {
            errors.push(FieldError::new("email", "Email inválido"));
        }
    }
    if let Some(cpf) = present(data.cpf) {
        if !is_valid_cpf(cpf) {
            errors.push(FieldError::new("cpf", "CPF inválido"));
        }
    }

    errors
}

/// Values written on insert.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub ra: String,
    pub cpf: String,
}

/// Allow-listed columns a student update may touch.
#[derive(Debug, Clone, Default)]
pub struct StudentChanges {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl StudentChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentFilterParams {
    /// Case-insensitive substring
    pub name: Option<String>,
    /// Case-insensitive substring
    pub email: Option<String>,
    /// Case-insensitive substring
    pub ra: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedStudentsResponse {
    pub students: Vec<StudentListItem>,
    #[serde(flatten)]
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedStudentResponse {
    pub student: Student,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollments: Option<Vec<Enrollment>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UpdatedStudentResponse {
    pub student: Student,
    #[serde(rename = "newEnrollments", skip_serializing_if = "Option::is_none")]
    pub new_enrollments: Option<Vec<Enrollment>>,
}
