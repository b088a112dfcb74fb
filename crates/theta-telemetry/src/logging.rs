//! Structured logging initialization.

use crate::error::{TelemetryError, TelemetryResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn is_production() -> bool {
    std::env::var("RUST_ENV")
        .map(|v| v == "production")
        .unwrap_or(false)
}

/// Build the filter: `RUST_LOG` if set, otherwise `default_directive`.
pub fn build_filter(default_directive: &str) -> TelemetryResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_directive).map_err(|e| TelemetryError::InvalidFilter {
            directive: default_directive.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Initialize the global tracing subscriber.
///
/// JSON to stderr when `RUST_ENV=production`, pretty output otherwise.
/// stdout is left free for the cycle report.
pub fn init_logging(default_directive: &str) -> TelemetryResult<()> {
    let env_filter = build_filter(default_directive)?;

    let result = if is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_default_directive() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let filter = build_filter("info,theta_bot=debug").unwrap();
        assert!(filter.to_string().contains("theta_bot=debug"));
    }
}
