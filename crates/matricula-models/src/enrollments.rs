//! Enrollment models.
//!
//! An enrollment links one student to one course group. There is at most
//! one row per pair, whatever its status, so a cancelled enrollment also
//! blocks enrolling the same student in the same group again.

use chrono::{DateTime, Utc};
use matricula_core::{AppError, FieldError, PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;

use crate::course_groups::CourseGroupSummary;
use crate::ids::{CourseGroupId, EnrollmentId, StudentId};
use crate::students::StudentSummary;
use crate::validation::REQUIRED_FIELD_MESSAGE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "enrollment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Active,
    Cancelled,
    /// Reserved, nothing transitions into it yet
    Completed,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub course_group_id: CourseGroupId,
    pub enrollment_date: DateTime<Utc>,
    pub status: EnrollmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An enrollment as listed under a student.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnrollmentWithCourseGroup {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    #[serde(rename = "courseGroup")]
    pub course_group: CourseGroupSummary,
}

/// An enrollment as listed under a course group.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnrollmentWithStudent {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub student: StudentSummary,
}

/// An enrollment with both sides of the relation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnrollmentDetail {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub student: StudentSummary,
    #[serde(rename = "courseGroup")]
    pub course_group: CourseGroupSummary,
}

impl From<EnrollmentDetail> for EnrollmentWithCourseGroup {
    fn from(detail: EnrollmentDetail) -> Self {
        Self {
            enrollment: detail.enrollment,
            course_group: detail.course_group,
        }
    }
}

impl From<EnrollmentDetail> for EnrollmentWithStudent {
    fn from(detail: EnrollmentDetail) -> Self {
        Self {
            enrollment: detail.enrollment,
            student: detail.student,
        }
    }
}

/// Body of the enroll and cancel operations.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EnrollmentRequest {
    #[serde(default)]
    pub student_id: Option<StudentId>,
    #[serde(default)]
    pub course_group_id: Option<CourseGroupId>,
}

impl EnrollmentRequest {
    /// Both ids, or a validation error naming each missing one.
    pub fn into_pair(self) -> Result<(StudentId, CourseGroupId), AppError> {
        match (self.student_id, self.course_group_id) {
            (Some(student_id), Some(course_group_id)) => Ok((student_id, course_group_id)),
            (student_id, course_group_id) => {
                let mut errors = Vec::new();
                if student_id.is_none() {
                    errors.push(FieldError::new("student_id", REQUIRED_FIELD_MESSAGE));
                }
                if course_group_id.is_none() {
                    errors.push(FieldError::new("course_group_id", REQUIRED_FIELD_MESSAGE));
                }
                Err(AppError::validation(errors))
            }
        }
    }
}

/// Values written on insert. New rows are always `active`.
#[derive(Debug, Clone, Copy)]
pub struct NewEnrollment {
    pub student_id: StudentId,
    pub course_group_id: CourseGroupId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrollmentFilterParams {
    pub status: Option<EnrollmentStatus>,
    #[serde(alias = "studentId")]
    pub student_id: Option<StudentId>,
    #[serde(alias = "courseGroupId")]
    pub course_group_id: Option<CourseGroupId>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedEnrollmentsResponse {
    pub enrollments: Vec<EnrollmentDetail>,
    #[serde(flatten)]
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&EnrollmentStatus::Cancelled).unwrap(),
            r#""cancelled""#
        );
        let parsed: EnrollmentStatus = serde_json::from_str(r#""active""#).unwrap();
        assert_eq!(parsed, EnrollmentStatus::Active);
        assert_eq!(EnrollmentStatus::Completed.to_string(), "completed");
    }

    #[test]
    fn test_request_reports_each_missing_id() {
        let error = EnrollmentRequest::default().into_pair().unwrap_err();
        assert_eq!(
            error.errors,
            vec![
                FieldError::new("student_id", "Campo obrigatório"),
                FieldError::new("course_group_id", "Campo obrigatório"),
            ]
        );

        let partial = EnrollmentRequest {
            student_id: Some(StudentId::new()),
            course_group_id: None,
        };
        let error = partial.into_pair().unwrap_err();
        assert_eq!(error.errors.len(), 1);
        assert_eq!(error.errors[0].field, "course_group_id");
    }

    #[test]
    fn test_request_with_both_ids() {
        let student_id = StudentId::new();
        let course_group_id = CourseGroupId::new();
        let body = format!(r#"{{"student_id":"{student_id}","course_group_id":"{course_group_id}"}}"#);
        let request: EnrollmentRequest = serde_json::from_str(&body).unwrap();

        assert_eq!(request.into_pair().unwrap(), (student_id, course_group_id));
    }

    #[test]
    fn test_detail_nests_both_sides() {
        let now = Utc::now();
        let student_id = StudentId::new();
        let course_group_id = CourseGroupId::new();
        let detail = EnrollmentDetail {
            enrollment: Enrollment {
                id: EnrollmentId::new(),
                student_id,
                course_group_id,
                enrollment_date: now,
                status: EnrollmentStatus::Active,
                created_at: now,
                updated_at: now,
            },
            student: StudentSummary {
                id: student_id,
                name: "Maria".to_string(),
                email: "maria@escola.com".to_string(),
            },
            course_group: CourseGroupSummary {
                id: course_group_id,
                name: "Turma A".to_string(),
                start_date: now,
                end_date: now,
            },
        };
        let value = serde_json::to_value(&detail).unwrap();

        assert_eq!(value["status"], "active");
        assert_eq!(value["student"]["name"], "Maria");
        assert_eq!(value["courseGroup"]["name"], "Turma A");
        assert_eq!(value["student_id"], student_id.to_string());
    }
}
