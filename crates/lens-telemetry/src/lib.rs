//! Prometheus metrics and structured logging for the lens.
//!
//! - Structured logging with tracing (pretty for development, JSON in production)
//! - Prometheus counters and histograms for record fetches and RPC calls

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
