//! # Structured Logging Module
//!
//! Environment-aware structured logging for the toolkit core, plus small
//! helpers that give plugin and feature-module lifecycle lines a consistent
//! shape.
//!
//! The level comes from `RUST_LOG` when set, otherwise from the environment
//! named by `ACCESSIFY_ENV` (falling back to `APP_ENV`). Setting
//! `ACCESSIFY_LOG_FORMAT=json` switches the console output to JSON lines.

use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
///
/// Safe to call more than once; only the first call installs a subscriber, and
/// an already-installed global subscriber (from the host) is left in place.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));

        let layer = if json_output() {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed()
        };

        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            environment = %environment,
            json = json_output(),
            "STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Current environment from environment variables
fn get_environment() -> String {
    std::env::var("ACCESSIFY_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "test" => "debug".to_string(),
        "development" => "debug".to_string(),
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

fn json_output() -> bool {
    std::env::var("ACCESSIFY_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Log structured data for plugin lifecycle operations
pub fn log_plugin_operation(operation: &str, plugin: &str, status: &str, details: Option<&str>) {
    tracing::info!(
        operation = %operation,
        plugin = %plugin,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "PLUGIN_OPERATION"
    );
}

/// Log structured data for feature-module lifecycle operations
pub fn log_module_operation(operation: &str, module: &str, status: &str, details: Option<&str>) {
    tracing::info!(
        operation = %operation,
        module = %module,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "MODULE_OPERATION"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_detection() {
        std::env::set_var("ACCESSIFY_ENV", "test_override");
        let env = get_environment();
        assert_eq!(env, "test_override");
        std::env::remove_var("ACCESSIFY_ENV");
    }

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(get_log_level("test"), "debug");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("unknown"), "debug");
    }

    #[test]
    fn test_init_is_repeatable() {
        init_structured_logging();
        init_structured_logging();
    }
}
