//! Admin-only route guard.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::middleware::auth::{AuthUser, authenticate};
use crate::state::AppState;
use matricula_core::AppError;

pub const ADMIN_ONLY_MESSAGE: &str = "Acesso permitido apenas para administradores";

/// Authenticates the request and rejects non-admin callers with 403.
///
/// ```rust,ignore
/// use axum::{Router, middleware};
/// use crate::middleware::role::require_admin;
///
/// let admin_routes = Router::new()
///     .route("/", get(get_students))
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
/// ```
pub async fn require_admin(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let auth_user = match req.extensions().get::<AuthUser>() {
        Some(auth_user) => *auth_user,
        None => match authenticate(req.headers(), &state).await {
            Ok(auth_user) => auth_user,
            Err(err) => return err.into_response(),
        },
    };

    if !auth_user.is_admin() {
        return AppError::forbidden(ADMIN_ONLY_MESSAGE).into_response();
    }

    req.extensions_mut().insert(auth_user);
    next.run(req).await
}
