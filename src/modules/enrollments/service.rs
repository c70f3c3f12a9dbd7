//! Enrollment lifecycle.
//!
//! ```text
//! enroll ──> active ──cancel──> cancelled
//!              │                    │
//!              └──── delete ────────┴──> (removed)
//! ```
//!
//! `completed` is a reserved status nothing transitions into. A pair can
//! only ever have one row, so a cancelled enrollment is never reactivated.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::modules::course_groups::repository::CourseGroupRepository;
use crate::modules::enrollments::model::{
    Enrollment, EnrollmentDetail, EnrollmentFilterParams, EnrollmentId, EnrollmentRequest,
    EnrollmentStatus, NewEnrollment, PaginatedEnrollmentsResponse,
};
use crate::modules::enrollments::repository::EnrollmentRepository;
use crate::modules::students::repository::StudentRepository;
use matricula_core::{AppError, PaginationMeta};

#[cfg(feature = "observability")]
use matricula_observability::metrics;

#[derive(Clone)]
pub struct EnrollmentService {
    enrollments: Arc<dyn EnrollmentRepository>,
    students: Arc<dyn StudentRepository>,
    course_groups: Arc<dyn CourseGroupRepository>,
}

impl EnrollmentService {
    pub fn new(
        enrollments: Arc<dyn EnrollmentRepository>,
        students: Arc<dyn StudentRepository>,
        course_groups: Arc<dyn CourseGroupRepository>,
    ) -> Self {
        Self {
            enrollments,
            students,
            course_groups,
        }
    }

    #[instrument(skip(self), fields(db.table = "enrollments"))]
    pub async fn get_enrollments(
        &self,
        filters: EnrollmentFilterParams,
    ) -> Result<PaginatedEnrollmentsResponse, AppError> {
        let (enrollments, total) = self.enrollments.find_all(&filters).await?;

        Ok(PaginatedEnrollmentsResponse {
            enrollments,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(self), fields(enrollment.id = %id))]
    pub async fn get_enrollment(&self, id: EnrollmentId) -> Result<EnrollmentDetail, AppError> {
        self.enrollments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::resource_not_found("Matrícula"))
    }

    #[instrument(skip(self, request), fields(db.operation = "INSERT", db.table = "enrollments"))]
    pub async fn enroll_student(&self, request: EnrollmentRequest) -> Result<Enrollment, AppError> {
        let (student_id, course_group_id) = request.into_pair()?;

        if self.students.find_by_id(student_id).await?.is_none() {
            return Err(AppError::resource_not_found("Estudante"));
        }
        if self.course_groups.find_by_id(course_group_id).await?.is_none() {
            return Err(AppError::resource_not_found("Turma"));
        }

        if let Some(existing) = self
            .enrollments
            .find_by_pair(student_id, course_group_id)
            .await?
        {
            warn!(
                student.id = %student_id,
                course_group.id = %course_group_id,
                enrollment.status = %existing.status,
                "Student already has an enrollment for this course group"
            );
            return Err(AppError::field(
                "enrollment",
                "Estudante já está matriculado nesta turma",
            ));
        }

        let enrollment = self
            .enrollments
            .create(NewEnrollment {
                student_id,
                course_group_id,
            })
            .await?;

        #[cfg(feature = "observability")]
        metrics::track_enrollment_created();

        info!(
            enrollment.id = %enrollment.id,
            student.id = %student_id,
            course_group.id = %course_group_id,
            "Student enrolled successfully"
        );
        Ok(enrollment)
    }

    #[instrument(skip(self, request), fields(db.operation = "UPDATE", db.table = "enrollments"))]
    pub async fn cancel_enrollment(
        &self,
        request: EnrollmentRequest,
    ) -> Result<Enrollment, AppError> {
        let (student_id, course_group_id) = request.into_pair()?;

        let enrollment = self
            .enrollments
            .find_by_pair(student_id, course_group_id)
            .await?
            .ok_or_else(|| AppError::resource_not_found("Matrícula"))?;

        if enrollment.status == EnrollmentStatus::Cancelled {
            return Err(AppError::field("status", "Esta matrícula já está cancelada"));
        }

        let cancelled = self
            .enrollments
            .update_status(enrollment.id, EnrollmentStatus::Cancelled)
            .await?
            .ok_or_else(|| AppError::resource_not_found("Matrícula"))?;

        #[cfg(feature = "observability")]
        metrics::track_enrollment_cancelled();

        info!(enrollment.id = %cancelled.id, "Enrollment cancelled");
        Ok(cancelled)
    }

    /// Hard delete, whatever the status.
    #[instrument(skip(self), fields(enrollment.id = %id, db.operation = "DELETE", db.table = "enrollments"))]
    pub async fn delete_enrollment(&self, id: EnrollmentId) -> Result<(), AppError> {
        if !self.enrollments.delete(id).await? {
            return Err(AppError::resource_not_found("Matrícula"));
        }

        info!(enrollment.id = %id, "Enrollment deleted");
        Ok(())
    }
}
