use crate::docs::ApiDoc;
use crate::middleware::role::require_admin;
use crate::modules::auth::init_auth_router;
use crate::modules::course_groups::init_course_groups_router;
use crate::modules::enrollments::init_enrollments_router;
use crate::modules::students::init_students_router;
use crate::modules::users::init_users_router;
use crate::state::AppState;
use anyhow::anyhow;
use axum::http::{HeaderName, HeaderValue, Method, Uri, header};
use axum::{Json, Router, middleware, routing::get};
use matricula_core::AppError;
use matricula_observability::{PrometheusHandle, logging_middleware, metrics_middleware};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub const API_VERSION: &str = "1.0.0";

async fn not_found(uri: Uri) -> AppError {
    AppError::not_found(anyhow!("Rota não encontrada: {}", uri.path()))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

fn api_router(state: AppState) -> Router<AppState> {
    let environment = state.server_config.environment.clone();

    Router::new()
        .route(
            "/",
            get(move || async move {
                Json::<Value>(json!({
                    "success": true,
                    "message": "API REST - Desafio Técnico +A Educação",
                    "version": API_VERSION,
                    "environment": environment,
                }))
            }),
        )
        .nest(
            "/users",
            init_auth_router(state.clone()).merge(init_users_router(state.clone())),
        )
        .nest(
            "/students",
            init_students_router()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
        )
        .nest("/course-groups", init_course_groups_router(state.clone()))
        .nest(
            "/enrollments",
            init_enrollments_router()
                .route_layer(middleware::from_fn_with_state(state, require_admin)),
        )
}

/// Builds the full application.
///
/// `/metrics` is only mounted when a Prometheus handle is given.
pub fn init_router(state: AppState, metrics: Option<PrometheusHandle>) -> Router {
    let mut router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_router(state.clone()))
        .fallback(not_found)
        .with_state(state.clone());

    if let Some(handle) = metrics {
        router = router.merge(matricula_observability::metrics_app(handle));
    }

    router
        .layer(cors_layer(&state))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-xss-protection"),
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
