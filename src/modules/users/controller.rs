use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::users::model::{
    CreateUserDto, PaginatedUsersResponse, UpdateProfileDto, UpdateUserDto, User,
    UserFilterParams, UserId,
};
use crate::state::AppState;
use crate::validator::{AppJson, AppQuery, PathId};
use matricula_core::errors::ErrorResponse;
use matricula_core::{ApiResponse, AppError};

/// Get the profile of the authenticated user
#[utoipa::path(
    get,
    path = "/api/users/profile",
    responses(
        (status = 200, description = "User profile", body = User),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip(state), fields(user.id = %auth_user.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<ApiResponse<User>, AppError> {
    let user = state.users.get_user(auth_user.id).await?;
    Ok(ApiResponse::success("user", "Perfil do usuário", user))
}

/// Update name and email of the authenticated user
#[utoipa::path(
    put,
    path = "/api/users/profile",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip(state, dto), fields(user.id = %auth_user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(dto): AppJson<UpdateProfileDto>,
) -> Result<ApiResponse<User>, AppError> {
    let user = state.users.update_profile(auth_user.id, dto).await?;
    Ok(ApiResponse::success(
        "user",
        "Perfil atualizado com sucesso",
        user,
    ))
}

/// List users (admin only)
#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("name" = Option<String>, Query, description = "Case-insensitive name substring"),
        ("email" = Option<String>, Query, description = "Exact email"),
        ("role" = Option<String>, Query, description = "admin or student"),
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (1-100, default: 10)")
    ),
    responses(
        (status = 200, description = "List of users", body = PaginatedUsersResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_users(
    State(state): State<AppState>,
    AppQuery(filters): AppQuery<UserFilterParams>,
) -> Result<ApiResponse<PaginatedUsersResponse>, AppError> {
    let users = state.users.get_users(filters).await?;
    Ok(ApiResponse::success("users", "Lista de usuários", users))
}

/// Create a user (admin only)
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Validation error or email in use", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip(state, dto), fields(requester.id = %auth_user.id))]
pub async fn create_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(dto): AppJson<CreateUserDto>,
) -> Result<(StatusCode, ApiResponse<User>), AppError> {
    let user = state.users.create_user(dto, auth_user.role).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success("user", "Usuário criado com sucesso", user),
    ))
}

/// Get a user by ID (admin only)
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip(state), fields(user.id = %id))]
pub async fn get_user(
    State(state): State<AppState>,
    PathId(id): PathId<UserId>,
) -> Result<ApiResponse<User>, AppError> {
    let user = state.users.get_user(id).await?;
    Ok(ApiResponse::success("user", "Usuário encontrado", user))
}

/// Update any user, role and password included (admin only)
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Validation error or email in use", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip(state, dto), fields(user.id = %id))]
pub async fn update_user(
    State(state): State<AppState>,
    PathId(id): PathId<UserId>,
    AppJson(dto): AppJson<UpdateUserDto>,
) -> Result<ApiResponse<User>, AppError> {
    let user = state.users.update_user(id, dto).await?;
    Ok(ApiResponse::success(
        "user",
        "Usuário atualizado com sucesso",
        user,
    ))
}

/// Delete a user (admin only, never yourself)
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete yourself", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip(state), fields(user.id = %id, requester.id = %auth_user.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    PathId(id): PathId<UserId>,
) -> Result<StatusCode, AppError> {
    state.users.delete_user(id, auth_user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
