// Metrics module for Prometheus observability

mod registry;

use crate::config::ProviderKind;

pub use registry::{
    gather_metrics, ERRORS_TOTAL, REQUESTS_TOTAL, REQUEST_DURATION, RESOLUTION_FAILURES,
    STREAM_CHUNKS, UPSTREAM_CALLS, UPSTREAM_DURATION,
};

/// Helper to record request metrics
pub fn record_request(endpoint: &str, status_code: u16, duration_secs: f64) {
    REQUESTS_TOTAL
        .with_label_values(&[endpoint, &status_code.to_string()])
        .inc();

    REQUEST_DURATION
        .with_label_values(&[endpoint])
        .observe(duration_secs);
}

pub fn record_error(status_code: u16) {
    ERRORS_TOTAL
        .with_label_values(&[&status_code.to_string()])
        .inc();
}

pub fn record_resolution_failure() {
    RESOLUTION_FAILURES.inc();
}

/// Helper to record provider call metrics; `status_code` is 0 when the call
/// failed before a response arrived.
pub fn record_upstream_call(provider: &str, kind: ProviderKind, status_code: u16, duration_secs: f64) {
    let kind = kind.as_str();
    UPSTREAM_CALLS
        .with_label_values(&[provider, kind, &status_code.to_string()])
        .inc();

    UPSTREAM_DURATION
        .with_label_values(&[provider, kind])
        .observe(duration_secs);
}

/// Chunks are counted per provider id, which comes from configuration.
pub fn record_stream_chunk(provider: &str) {
    STREAM_CHUNKS.with_label_values(&[provider]).inc();
}
