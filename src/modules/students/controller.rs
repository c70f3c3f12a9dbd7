use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use crate::modules::students::model::{
    CreateStudentDto, CreatedStudentResponse, PaginatedStudentsResponse, StudentFilterParams,
    StudentId, StudentWithEnrollments, UpdateStudentDto, UpdatedStudentResponse,
};
use crate::state::AppState;
use crate::validator::{AppJson, AppQuery, PathId};
use matricula_core::errors::ErrorResponse;
use matricula_core::{ApiResponse, AppError};

const OBJECT: &str = "student";

#[utoipa::path(
    get,
    path = "/api/students",
    params(
        ("name" = Option<String>, Query, description = "Case-insensitive name substring"),
        ("email" = Option<String>, Query, description = "Case-insensitive email substring"),
        ("ra" = Option<String>, Query, description = "Case-insensitive RA substring"),
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (1-100, default: 10)")
    ),
    responses(
        (status = 200, description = "List of students", body = PaginatedStudentsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_students(
    State(state): State<AppState>,
    AppQuery(filters): AppQuery<StudentFilterParams>,
) -> Result<ApiResponse<PaginatedStudentsResponse>, AppError> {
    let students = state.students.get_students(filters).await?;
    Ok(ApiResponse::success(OBJECT, "Lista de estudantes", students))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(
        ("id" = String, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student with enrollments", body = StudentWithEnrollments),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state), fields(student.id = %id))]
pub async fn get_student(
    State(state): State<AppState>,
    PathId(id): PathId<StudentId>,
) -> Result<ApiResponse<StudentWithEnrollments>, AppError> {
    let student = state.students.get_student_with_enrollments(id).await?;
    Ok(ApiResponse::success(OBJECT, "Estudante encontrado", student))
}

/// Same payload as [`get_student`], kept for clients that list a student's
/// enrollments explicitly.
#[utoipa::path(
    get,
    path = "/api/students/{id}/enrollments",
    params(
        ("id" = String, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student with enrollments", body = StudentWithEnrollments),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state), fields(student.id = %id))]
pub async fn get_student_enrollments(
    State(state): State<AppState>,
    PathId(id): PathId<StudentId>,
) -> Result<ApiResponse<StudentWithEnrollments>, AppError> {
    let student = state.students.get_student_with_enrollments(id).await?;
    Ok(ApiResponse::success(OBJECT, "Estudante encontrado", student))
}

#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateStudentDto,
    responses(
        (status = 201, description = "Student created, enrolled in the given course groups", body = CreatedStudentResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Course group not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn create_student(
    State(state): State<AppState>,
    AppJson(dto): AppJson<CreateStudentDto>,
) -> Result<(StatusCode, ApiResponse<CreatedStudentResponse>), AppError> {
    let created = state.students.create_student(dto).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success(OBJECT, "Estudante criado com sucesso", created),
    ))
}

#[utoipa::path(
    put,
    path = "/api/students/{id}",
    params(
        ("id" = String, Path, description = "Student ID")
    ),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated", body = UpdatedStudentResponse),
        (status = 400, description = "Validation error, ra and cpf are immutable", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Student or course group not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state, dto), fields(student.id = %id))]
pub async fn update_student(
    State(state): State<AppState>,
    PathId(id): PathId<StudentId>,
    AppJson(dto): AppJson<UpdateStudentDto>,
) -> Result<ApiResponse<UpdatedStudentResponse>, AppError> {
    let updated = state.students.update_student(id, dto).await?;
    Ok(ApiResponse::success(
        OBJECT,
        "Estudante atualizado com sucesso",
        updated,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(
        ("id" = String, Path, description = "Student ID")
    ),
    responses(
        (status = 204, description = "Student and their enrollments deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state), fields(student.id = %id))]
pub async fn delete_student(
    State(state): State<AppState>,
    PathId(id): PathId<StudentId>,
) -> Result<StatusCode, AppError> {
    state.students.delete_student(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
