use crate::middleware::auth::require_auth;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{post, put},
};

use super::controller::{change_password, login_user};

/// Mounted under `/api/users` next to the users router.
pub fn init_auth_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/password",
            put(change_password)
                .route_layer(middleware::from_fn_with_state(state, require_auth)),
        )
        .route("/login", post(login_user))
}
