use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use crate::modules::enrollments::model::{
    Enrollment, EnrollmentDetail, EnrollmentFilterParams, EnrollmentId, EnrollmentRequest,
    PaginatedEnrollmentsResponse,
};
use crate::state::AppState;
use crate::validator::{AppJson, AppQuery, PathId};
use matricula_core::errors::ErrorResponse;
use matricula_core::{ApiResponse, AppError};

const OBJECT: &str = "enrollment";

#[utoipa::path(
    post,
    path = "/api/enrollments/enroll",
    request_body = EnrollmentRequest,
    responses(
        (status = 201, description = "Student enrolled", body = Enrollment),
        (status = 400, description = "Missing ids or already enrolled", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Student or course group not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Enrollments"
)]
#[instrument(skip(state, request))]
pub async fn enroll_student(
    State(state): State<AppState>,
    AppJson(request): AppJson<EnrollmentRequest>,
) -> Result<(StatusCode, ApiResponse<Enrollment>), AppError> {
    let enrollment = state.enrollments.enroll_student(request).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success(OBJECT, "Estudante matriculado com sucesso", enrollment),
    ))
}

#[utoipa::path(
    put,
    path = "/api/enrollments/cancel",
    request_body = EnrollmentRequest,
    responses(
        (status = 200, description = "Enrollment cancelled", body = Enrollment),
        (status = 400, description = "Missing ids or already cancelled", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Enrollments"
)]
#[instrument(skip(state, request))]
pub async fn cancel_enrollment(
    State(state): State<AppState>,
    AppJson(request): AppJson<EnrollmentRequest>,
) -> Result<ApiResponse<Enrollment>, AppError> {
    let enrollment = state.enrollments.cancel_enrollment(request).await?;
    Ok(ApiResponse::success(
        OBJECT,
        "Matrícula cancelada com sucesso",
        enrollment,
    ))
}

#[utoipa::path(
    get,
    path = "/api/enrollments",
    params(
        ("status" = Option<String>, Query, description = "active, cancelled or completed"),
        ("student_id" = Option<String>, Query, description = "Only enrollments of this student"),
        ("course_group_id" = Option<String>, Query, description = "Only enrollments in this course group"),
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (1-100, default: 10)")
    ),
    responses(
        (status = 200, description = "List of enrollments", body = PaginatedEnrollmentsResponse),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Enrollments"
)]
#[instrument(skip(state))]
pub async fn get_enrollments(
    State(state): State<AppState>,
    AppQuery(filters): AppQuery<EnrollmentFilterParams>,
) -> Result<ApiResponse<PaginatedEnrollmentsResponse>, AppError> {
    let enrollments = state.enrollments.get_enrollments(filters).await?;
    Ok(ApiResponse::success(OBJECT, "Lista de matrículas", enrollments))
}

#[utoipa::path(
    get,
    path = "/api/enrollments/{id}",
    params(
        ("id" = String, Path, description = "Enrollment ID")
    ),
    responses(
        (status = 200, description = "Enrollment with student and course group", body = EnrollmentDetail),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Enrollments"
)]
#[instrument(skip(state), fields(enrollment.id = %id))]
pub async fn get_enrollment(
    State(state): State<AppState>,
    PathId(id): PathId<EnrollmentId>,
) -> Result<ApiResponse<EnrollmentDetail>, AppError> {
    let enrollment = state.enrollments.get_enrollment(id).await?;
    Ok(ApiResponse::success(OBJECT, "Matrícula encontrada", enrollment))
}

#[utoipa::path(
    delete,
    path = "/api/enrollments/{id}",
    params(
        ("id" = String, Path, description = "Enrollment ID")
    ),
    responses(
        (status = 204, description = "Enrollment deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Enrollments"
)]
#[instrument(skip(state), fields(enrollment.id = %id))]
pub async fn delete_enrollment(
    State(state): State<AppState>,
    PathId(id): PathId<EnrollmentId>,
) -> Result<StatusCode, AppError> {
    state.enrollments.delete_enrollment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
