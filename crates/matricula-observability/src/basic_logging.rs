use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize basic console logging when observability is disabled.
///
/// # Configuration
///
/// - **Log Level**: Controlled by `LOG_LEVEL` environment variable (default: "info")
/// - **Filtering**: `RUST_LOG` wins when set; noisy dependencies are kept at warn
/// - **Format**: Compact format with ANSI colors
///
/// Calling it twice is harmless, the second subscriber is simply not installed.
pub fn init_basic_console_logging() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "matricula={log_level},matricula_cli={log_level},tower_http=warn,hyper=warn,sqlx=warn"
        ))
    });

    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(true)
        .with_filter(env_filter);

    if tracing_subscriber::registry()
        .with(console_layer)
        .try_init()
        .is_ok()
    {
        eprintln!(
            "ℹ️  Observability disabled - console logging only (OBSERVABILITY_ENABLED=false or feature not compiled)"
        );
    }
}
