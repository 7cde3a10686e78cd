// Prometheus metrics registry and collectors

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec_with_registry, register_counter_with_registry,
    register_histogram_vec_with_registry, Counter, CounterVec, Encoder, HistogramVec, Opts,
    Registry, TextEncoder,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // REQUEST METRICS
    // ============================================================================

    /// Inbound requests by endpoint and response status
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec_with_registry!(
        Opts::new("oai2claude_requests_total", "Total number of inbound requests"),
        &["endpoint", "status_code"],
        REGISTRY
    ).unwrap();

    pub static ref REQUEST_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("oai2claude_request_duration_seconds", "Request duration in seconds")
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["endpoint"],
        REGISTRY
    ).unwrap();

    /// Error responses produced by the proxy itself
    pub static ref ERRORS_TOTAL: CounterVec = register_counter_vec_with_registry!(
        Opts::new("oai2claude_errors_total", "Error responses generated by the proxy"),
        &["status_code"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // ROUTING METRICS
    // ============================================================================

    /// Unlabeled: the requested model name comes from the client
    pub static ref RESOLUTION_FAILURES: Counter = register_counter_with_registry!(
        Opts::new("oai2claude_resolution_failures_total", "Requests whose model matched no provider"),
        REGISTRY
    ).unwrap();

    // ============================================================================
    // UPSTREAM METRICS
    // ============================================================================

    /// Provider calls; status_code 0 means no response was received
    pub static ref UPSTREAM_CALLS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("oai2claude_upstream_calls_total", "Total provider calls"),
        &["provider", "kind", "status_code"],
        REGISTRY
    ).unwrap();

    /// Time until response headers arrived
    pub static ref UPSTREAM_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("oai2claude_upstream_duration_seconds", "Provider time to response headers")
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
        &["provider", "kind"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // STREAMING METRICS
    // ============================================================================

    /// Chat Completions chunks written to streaming clients
    pub static ref STREAM_CHUNKS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("oai2claude_stream_chunks_total", "Streamed chunks sent to clients"),
        &["provider"],
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
