use std::sync::Arc;

use anyhow::anyhow;
use tracing::{info, instrument, warn};

use crate::modules::course_groups::model::{
    CourseGroup, CourseGroupChanges, CourseGroupDto, CourseGroupFilterParams, CourseGroupFilters,
    CourseGroupId, DATE_RANGE_MESSAGE, NewCourseGroup, PaginatedCourseGroupsResponse,
    validate_course_group,
};
use crate::modules::course_groups::repository::CourseGroupRepository;
use crate::modules::enrollments::model::EnrollmentWithStudent;
use crate::modules::enrollments::repository::EnrollmentRepository;
use matricula_core::{AppError, PaginationMeta};

#[cfg(feature = "observability")]
use matricula_observability::metrics;

const NAME_TAKEN_MESSAGE: &str = "Uma turma com este nome já existe";
const HAS_ENROLLMENTS_MESSAGE: &str = "Não é possível excluir uma turma com matrículas ativas";

#[derive(Clone)]
pub struct CourseGroupService {
    course_groups: Arc<dyn CourseGroupRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
}

impl CourseGroupService {
    pub fn new(
        course_groups: Arc<dyn CourseGroupRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
    ) -> Self {
        Self {
            course_groups,
            enrollments,
        }
    }

    #[instrument(skip(self), fields(db.table = "course_groups"))]
    pub async fn get_course_groups(
        &self,
        params: CourseGroupFilterParams,
    ) -> Result<PaginatedCourseGroupsResponse, AppError> {
        let filters = CourseGroupFilters::try_from(params)?;
        let (course_groups, total) = self.course_groups.find_all(&filters).await?;

        Ok(PaginatedCourseGroupsResponse {
            course_groups,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(self), fields(course_group.id = %id))]
    pub async fn get_course_group(&self, id: CourseGroupId) -> Result<CourseGroup, AppError> {
        self.course_groups
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::resource_not_found("Turma"))
    }

    #[instrument(skip(self), fields(course_group.id = %id))]
    pub async fn get_course_group_enrollments(
        &self,
        id: CourseGroupId,
    ) -> Result<Vec<EnrollmentWithStudent>, AppError> {
        self.get_course_group(id).await?;

        Ok(self
            .enrollments
            .find_by_course_group(id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn ensure_name_available(&self, name: &str) -> Result<(), AppError> {
        if self.course_groups.find_by_name(name).await?.is_some() {
            warn!(course_group.name = %name, "Attempted to use an existing course group name");
            return Err(AppError::field("name", NAME_TAKEN_MESSAGE));
        }
        Ok(())
    }

    #[instrument(skip(self, dto), fields(db.operation = "INSERT", db.table = "course_groups"))]
    pub async fn create_course_group(&self, dto: CourseGroupDto) -> Result<CourseGroup, AppError> {
        let errors = validate_course_group(&dto, false);
        if !errors.is_empty() {
            return Err(AppError::validation(errors));
        }

        if let Some(name) = dto.name.as_deref() {
            self.ensure_name_available(name).await?;
        }

        let new_group = NewCourseGroup::from_dto(dto)?;
        if new_group.start_date >= new_group.end_date {
            return Err(AppError::field("date_range", DATE_RANGE_MESSAGE));
        }

        let group = self.course_groups.create(new_group).await?;

        #[cfg(feature = "observability")]
        metrics::track_course_group_created();

        info!(course_group.id = %group.id, course_group.name = %group.name, "Course group created successfully");
        Ok(group)
    }

    #[instrument(skip(self, dto), fields(course_group.id = %id, db.operation = "UPDATE", db.table = "course_groups"))]
    pub async fn update_course_group(
        &self,
        id: CourseGroupId,
        dto: CourseGroupDto,
    ) -> Result<CourseGroup, AppError> {
        let errors = validate_course_group(&dto, true);
        if !errors.is_empty() {
            return Err(AppError::validation(errors));
        }

        let current = self.get_course_group(id).await?;

        if let Some(name) = dto.name.as_deref().filter(|n| !n.is_empty()) {
            if name != current.name {
                self.ensure_name_available(name).await?;
            }
        }

        let changes = CourseGroupChanges::from_dto(dto)?;

        // A changed bound is checked against the other bound, new or persisted.
        if changes.start_date.is_some() || changes.end_date.is_some() {
            let start = changes.start_date.unwrap_or(current.start_date);
            let end = changes.end_date.unwrap_or(current.end_date);
            if start >= end {
                return Err(AppError::field("date_range", DATE_RANGE_MESSAGE));
            }
        }

        if changes.is_empty() {
            return Ok(current);
        }

        let group = self
            .course_groups
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::resource_not_found("Turma"))?;

        info!(course_group.id = %group.id, "Course group updated successfully");
        Ok(group)
    }

    /// Refused while any enrollment, whatever its status, references the group.
    #[instrument(skip(self), fields(course_group.id = %id, db.operation = "DELETE", db.table = "course_groups"))]
    pub async fn delete_course_group(&self, id: CourseGroupId) -> Result<(), AppError> {
        self.get_course_group(id).await?;

        let enrollment_count = self.enrollments.count_by_course_group(id).await?;
        if enrollment_count > 0 {
            warn!(course_group.id = %id, enrollment_count, "Refusing to delete course group with enrollments");
            return Err(AppError::bad_request(anyhow!(HAS_ENROLLMENTS_MESSAGE)));
        }

        if !self.course_groups.delete(id).await? {
            return Err(AppError::resource_not_found("Turma"));
        }

        info!(course_group.id = %id, "Course group deleted successfully");
        Ok(())
    }
}
