use crate::modules::enrollments::controller::{
    cancel_enrollment, delete_enrollment, enroll_student, get_enrollment, get_enrollments,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

/// Admin-only; the caller adds the `require_admin` layer.
pub fn init_enrollments_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_enrollments))
        .route("/enroll", post(enroll_student))
        .route("/cancel", put(cancel_enrollment))
        .route("/{id}", get(get_enrollment).delete(delete_enrollment))
}
