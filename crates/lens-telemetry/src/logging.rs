//! Structured logging initialization.
//!
//! All output goes to stderr; stdout is reserved for the JSON records the
//! `lens` binary prints.

use crate::error::{TelemetryError, TelemetryResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info,lens=debug";

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, with span context.
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

impl LogFormat {
    /// Format for a `RUST_ENV` value: JSON in production, pretty otherwise.
    #[must_use]
    pub fn from_env_value(rust_env: Option<&str>) -> Self {
        match rust_env.map(str::trim) {
            Some(env) if env.eq_ignore_ascii_case("production") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Build the filter from a `RUST_LOG` value, falling back to `DEFAULT_FILTER`.
fn build_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize structured logging from `RUST_LOG` and `RUST_ENV`.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging() -> TelemetryResult<()> {
    let directives = std::env::var("RUST_LOG").ok();
    let rust_env = std::env::var("RUST_ENV").ok();
    init_with(
        build_filter(directives.as_deref()),
        LogFormat::from_env_value(rust_env.as_deref()),
    )
}

fn init_with(filter: EnvFilter, format: LogFormat) -> TelemetryResult<()> {
    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init(),
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}
