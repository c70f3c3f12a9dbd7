use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use crate::modules::course_groups::model::{
    CourseGroup, CourseGroupDto, CourseGroupFilterParams, CourseGroupId,
    PaginatedCourseGroupsResponse,
};
use crate::modules::enrollments::model::EnrollmentWithStudent;
use crate::state::AppState;
use crate::validator::{AppJson, AppQuery, PathId};
use matricula_core::errors::ErrorResponse;
use matricula_core::{ApiResponse, AppError};

const OBJECT: &str = "courseGroup";

#[utoipa::path(
    get,
    path = "/api/course-groups",
    params(
        ("name" = Option<String>, Query, description = "Case-insensitive name substring"),
        ("startDate" = Option<String>, Query, description = "Groups starting on or after this date"),
        ("endDate" = Option<String>, Query, description = "Groups ending on or before this date"),
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (1-100, default: 10)")
    ),
    responses(
        (status = 200, description = "List of course groups", body = PaginatedCourseGroupsResponse),
        (status = 400, description = "Invalid date filter", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Course Groups"
)]
#[instrument(skip(state))]
pub async fn get_course_groups(
    State(state): State<AppState>,
    AppQuery(filters): AppQuery<CourseGroupFilterParams>,
) -> Result<ApiResponse<PaginatedCourseGroupsResponse>, AppError> {
    let course_groups = state.course_groups.get_course_groups(filters).await?;
    Ok(ApiResponse::success(OBJECT, "Lista de turmas", course_groups))
}

#[utoipa::path(
    get,
    path = "/api/course-groups/{id}",
    params(
        ("id" = String, Path, description = "Course group ID")
    ),
    responses(
        (status = 200, description = "Course group details", body = CourseGroup),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Course group not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Course Groups"
)]
#[instrument(skip(state), fields(course_group.id = %id))]
pub async fn get_course_group(
    State(state): State<AppState>,
    PathId(id): PathId<CourseGroupId>,
) -> Result<ApiResponse<CourseGroup>, AppError> {
    let course_group = state.course_groups.get_course_group(id).await?;
    Ok(ApiResponse::success(OBJECT, "Turma encontrada", course_group))
}

#[utoipa::path(
    get,
    path = "/api/course-groups/{id}/enrollments",
    params(
        ("id" = String, Path, description = "Course group ID")
    ),
    responses(
        (status = 200, description = "Enrollments of the course group with their students", body = [EnrollmentWithStudent]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Course group not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Course Groups"
)]
#[instrument(skip(state), fields(course_group.id = %id))]
pub async fn get_course_group_enrollments(
    State(state): State<AppState>,
    PathId(id): PathId<CourseGroupId>,
) -> Result<ApiResponse<Vec<EnrollmentWithStudent>>, AppError> {
    let enrollments = state.course_groups.get_course_group_enrollments(id).await?;
    Ok(ApiResponse::success(
        "enrollment",
        "Matrículas da turma",
        enrollments,
    ))
}

#[utoipa::path(
    post,
    path = "/api/course-groups",
    request_body = CourseGroupDto,
    responses(
        (status = 201, description = "Course group created", body = CourseGroup),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Course Groups"
)]
#[instrument(skip(state, dto))]
pub async fn create_course_group(
    State(state): State<AppState>,
    AppJson(dto): AppJson<CourseGroupDto>,
) -> Result<(StatusCode, ApiResponse<CourseGroup>), AppError> {
    let course_group = state.course_groups.create_course_group(dto).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success(OBJECT, "Turma criada com sucesso", course_group),
    ))
}

#[utoipa::path(
    put,
    path = "/api/course-groups/{id}",
    params(
        ("id" = String, Path, description = "Course group ID")
    ),
    request_body = CourseGroupDto,
    responses(
        (status = 200, description = "Course group updated", body = CourseGroup),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Course group not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Course Groups"
)]
#[instrument(skip(state, dto), fields(course_group.id = %id))]
pub async fn update_course_group(
    State(state): State<AppState>,
    PathId(id): PathId<CourseGroupId>,
    AppJson(dto): AppJson<CourseGroupDto>,
) -> Result<ApiResponse<CourseGroup>, AppError> {
    let course_group = state.course_groups.update_course_group(id, dto).await?;
    Ok(ApiResponse::success(
        OBJECT,
        "Turma atualizada com sucesso",
        course_group,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/course-groups/{id}",
    params(
        ("id" = String, Path, description = "Course group ID")
    ),
    responses(
        (status = 204, description = "Course group deleted"),
        (status = 400, description = "Course group still has enrollments", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Course group not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Course Groups"
)]
#[instrument(skip(state), fields(course_group.id = %id))]
pub async fn delete_course_group(
    State(state): State<AppState>,
    PathId(id): PathId<CourseGroupId>,
) -> Result<StatusCode, AppError> {
    state.course_groups.delete_course_group(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
