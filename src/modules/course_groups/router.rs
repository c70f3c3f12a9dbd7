use crate::middleware::auth::require_auth;
use crate::middleware::role::require_admin;
use crate::modules::course_groups::controller::{
    create_course_group, delete_course_group, get_course_group, get_course_group_enrollments,
    get_course_groups, update_course_group,
};
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post, put},
};

/// Reads are open to any authenticated user, writes and the enrollment
/// listing are admin-only.
pub fn init_course_groups_router(state: AppState) -> Router<AppState> {
    let read_routes = Router::new()
        .route("/", get(get_course_groups))
        .route("/{id}", get(get_course_group))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let admin_routes = Router::new()
        .route("/", post(create_course_group))
        .route("/{id}", put(update_course_group).delete(delete_course_group))
        .route("/{id}/enrollments", get(get_course_group_enrollments))
        .route_layer(middleware::from_fn_with_state(state, require_admin));

    read_routes.merge(admin_routes)
}
