//! Matrícula Observability
//!
//! Provides configurable observability features including:
//! - Structured logging to the console and to rolling log files
//! - Metrics collection via Prometheus
//! - HTTP request/response logging
//!
//! This crate can be enabled or disabled at compile time via the `observability` feature flag.
//! At runtime, observability can be further controlled via the `OBSERVABILITY_ENABLED` environment variable.
//!
//! # Features
//!
//! - `observability` (default): Enables file logging, request logging and metrics
//!
//! # Examples
//!
//! ```no_run
//! use matricula_observability::{init_metrics, init_tracing};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_tracing();
//!     let _metrics = init_metrics();
//!     // ... application code ...
//! }
//! ```

mod basic_logging;

#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

pub use basic_logging::init_basic_console_logging;

#[cfg(feature = "observability")]
pub use metrics_exporter_prometheus::PrometheusHandle;

#[cfg(feature = "observability")]
pub use logging::{init_tracing, is_observability_enabled, logging_middleware};
#[cfg(feature = "observability")]
pub use metrics::{
    init_metrics, metrics_app, metrics_middleware, track_course_group_created,
    track_enrollment_cancelled, track_enrollment_created, track_jwt_issued, track_student_created,
    track_user_created, track_user_login_failure, track_user_login_success,
};

// No-op stubs when observability is disabled
#[cfg(not(feature = "observability"))]
pub mod stubs {
    use axum::{Router, extract::Request, middleware::Next, response::Response};

    /// Stand-in for the Prometheus handle, never constructed.
    #[derive(Debug, Clone)]
    pub struct PrometheusHandle;

    impl PrometheusHandle {
        pub fn render(&self) -> String {
            String::new()
        }
    }

    pub fn is_observability_enabled() -> bool {
        false
    }

    /// Console logging only
    pub fn init_tracing() {
        super::init_basic_console_logging();
    }

    pub async fn logging_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub async fn metrics_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub fn init_metrics() -> Option<PrometheusHandle> {
        None
    }

    pub fn metrics_app(_handle: PrometheusHandle) -> Router {
        Router::new()
    }

    pub fn track_student_created() {}
    pub fn track_course_group_created() {}
    pub fn track_enrollment_created() {}
    pub fn track_enrollment_cancelled() {}
    pub fn track_user_created(_role: &str) {}
    pub fn track_user_login_success(_role: &str) {}
    pub fn track_user_login_failure(_reason: &str) {}
    pub fn track_jwt_issued() {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
