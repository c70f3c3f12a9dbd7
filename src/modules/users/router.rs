use crate::middleware::auth::require_auth;
use crate::middleware::role::require_admin;
use crate::modules::users::controller::{
    create_user, delete_user, get_profile, get_user, get_users, update_profile, update_user,
};
use crate::state::AppState;
use axum::{Router, middleware, routing::get};

/// `/profile` is open to any authenticated user, the rest is admin-only.
pub fn init_users_router(state: AppState) -> Router<AppState> {
    let profile_routes = Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let admin_routes = Router::new()
        .route("/", get(get_users).post(create_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .route_layer(middleware::from_fn_with_state(state, require_admin));

    profile_routes.merge(admin_routes)
}
