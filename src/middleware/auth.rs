use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::modules::users::model::{UserId, UserRole};
use crate::state::AppState;
use matricula_auth::{jwt::INVALID_TOKEN_MESSAGE, verify_token};
use matricula_core::AppError;

/// The caller behind a verified bearer token.
///
/// The role is read from the stored account, not from the token, so a role
/// change applies on the next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Token não fornecido"))?;

    let parts: Vec<&str> = auth_header.split(' ').collect();
    let [scheme, token] = parts.as_slice() else {
        return Err(AppError::unauthorized("Erro no formato do token"));
    };

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::unauthorized("Formato de token inválido"));
    }

    Ok(*token)
}

/// Verifies the bearer token and loads the account it belongs to.
pub async fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<AuthUser, AppError> {
    let token = bearer_token(headers)?;
    let claims = verify_token(token, &state.jwt_config)?;
    let id = claims
        .user_id()
        .map(UserId::from)
        .ok_or_else(|| AppError::unauthorized(INVALID_TOKEN_MESSAGE))?;

    let user = state
        .users
        .find_user(id)
        .await?
        .ok_or_else(|| AppError::unauthorized("Usuário não encontrado"))?;

    Ok(AuthUser {
        id: user.id,
        role: user.role,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already verified by `require_auth` or `require_admin`.
        if let Some(auth_user) = parts.extensions.get::<AuthUser>() {
            return Ok(*auth_user);
        }

        authenticate(&parts.headers, state).await
    }
}

/// Rejects requests without a valid bearer token and stores the [`AuthUser`]
/// in the request extensions.
///
/// ```rust,ignore
/// let routes = Router::new()
///     .route("/profile", get(get_profile))
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));
/// ```
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    match authenticate(req.headers(), &state).await {
        Ok(auth_user) => {
            req.extensions_mut().insert(auth_user);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}
