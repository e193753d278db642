//! # Structured Logging
//!
//! Provides structured logging macros and utilities using the tracing ecosystem.
//!
//! The subscriber honours `RUST_LOG`; without it the level is `info`, or
//! `debug` when verbose output is requested. JSON output is available for
//! log shippers.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{ClientSettings, LogFormat};

/// Create a tracing span for configuration store operations.
///
/// ```rust,ignore
/// let span = store_span!("add_policy", listener = "sse");
/// ```
#[macro_export]
macro_rules! store_span {
    ($operation:expr) => {
        tracing::info_span!(
            "store_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::info_span!(
            "store_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Install the global subscriber. An already installed subscriber (for
/// example in tests) is left in place.
pub fn init_logging(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let result = match format {
        LogFormat::Text => tracing::subscriber::set_global_default(
            fmt().with_env_filter(filter).with_writer(std::io::stderr).finish(),
        ),
        LogFormat::Json => tracing::subscriber::set_global_default(
            fmt().json().with_env_filter(filter).with_writer(std::io::stderr).finish(),
        ),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Log resolved client settings at startup
pub fn log_settings_info(settings: &ClientSettings) {
    tracing::debug!(
        base_url = %settings.base_url,
        timeout_seconds = settings.timeout_seconds,
        authenticated = settings.token.is_some(),
        cache_enabled = settings.cache_dir.is_some(),
        "gwctl configuration"
    );
}
