use axum::extract::State;
use tracing::instrument;

use super::model::{ChangePasswordDto, LoginRequest, LoginResponse};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::AppJson;
use matricula_core::errors::ErrorResponse;
use matricula_core::{ApiResponse, AppError};

/// Login and receive a JWT
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing email or password", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, request))]
pub async fn login_user(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, AppError> {
    let response = state.auth.login(request).await?;
    Ok(ApiResponse::success("user", "Login bem-sucedido", response))
}

/// Change the password of the authenticated user
#[utoipa::path(
    put,
    path = "/api/users/password",
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Missing fields, weak password or wrong current password", body = ErrorResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto), fields(user.id = %auth_user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(dto): AppJson<ChangePasswordDto>,
) -> Result<ApiResponse<()>, AppError> {
    state.auth.change_password(auth_user.id, dto).await?;
    Ok(ApiResponse::message("Senha alterada com sucesso"))
}
