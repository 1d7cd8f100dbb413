//! Prometheus metrics for the lens.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A registration failure means a
//! duplicate metric name, which is a programming error caught on first use.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Records assembled successfully.
/// Labels: kind (market/position), branch (native/wrapped)
pub static RECORDS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "lens_records_total",
        "Total records assembled",
        &["kind", "branch"]
    )
    .unwrap()
});

/// Records that failed to assemble.
/// Labels: kind (market/position), error (upstream/malformed)
pub static RECORD_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "lens_record_failures_total",
        "Total records that failed to assemble",
        &["kind", "error"]
    )
    .unwrap()
});

/// Time to assemble one record, in milliseconds.
pub static RECORD_LATENCY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "lens_record_latency_ms",
        "Record assembly latency in milliseconds",
        &["kind"],
        vec![5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 10000.0]
    )
    .unwrap()
});

/// Batches stopped by caller cancellation.
pub static BATCHES_CANCELLED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "lens_batches_cancelled_total",
        "Total batches cancelled by the caller",
        &["kind"]
    )
    .unwrap()
});

/// Upstream RPC calls by outcome.
/// Labels: call (contract method), outcome (ok/upstream/malformed)
pub static RPC_CALLS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "lens_rpc_calls_total",
        "Total upstream RPC calls",
        &["call", "outcome"]
    )
    .unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record a successfully assembled record.
    pub fn record_fetched(kind: &str, branch: &str) {
        RECORDS_TOTAL.with_label_values(&[kind, branch]).inc();
    }

    /// Record a record that failed to assemble.
    pub fn record_failed(kind: &str, error: &str) {
        RECORD_FAILURES_TOTAL.with_label_values(&[kind, error]).inc();
    }

    /// Record assembly latency.
    pub fn record_latency(kind: &str, latency_ms: f64) {
        RECORD_LATENCY_MS
            .with_label_values(&[kind])
            .observe(latency_ms);
    }

    /// Record a cancelled batch.
    pub fn batch_cancelled(kind: &str) {
        BATCHES_CANCELLED_TOTAL.with_label_values(&[kind]).inc();
    }

    /// Record an upstream RPC call.
    pub fn rpc_call(call: &str, outcome: &str) {
        RPC_CALLS_TOTAL.with_label_values(&[call, outcome]).inc();
    }

    /// Render all registered metrics in the Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buf)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
