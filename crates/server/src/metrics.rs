//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the nuzdex server:
//! - HTTP request metrics (latency, counts, in-flight)
//! - Cache size and running sync jobs (collected dynamically)
//!
//! Core metrics (cache lookups, upstream requests, sync outcomes) are
//! registered into the same registry.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use tracing::error;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "nuzdex_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("nuzdex_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "nuzdex_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Cache and Sync Metrics
// =============================================================================

/// Species entries in the local store.
pub static CACHED_SPECIES: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("nuzdex_cached_species", "Number of species in the local cache").unwrap()
});

/// Sync jobs currently running.
pub static SYNC_JOBS_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "nuzdex_sync_jobs_running",
        "Number of bulk sync jobs currently running",
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Cache and sync
    registry
        .register(Box::new(CACHED_SPECIES.clone()))
        .unwrap();
    registry
        .register(Box::new(SYNC_JOBS_RUNNING.clone()))
        .unwrap();

    // Core metrics (cache lookups, upstream, sync outcomes)
    for metric in nuzdex_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all registered metrics in the Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so gauges reflect the store and job registry.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    if let Ok(count) = state.store().count() {
        CACHED_SPECIES.set(count as i64);
    }

    SYNC_JOBS_RUNNING.set(state.jobs().running_count().await as i64);
}

/// Replace IDs in a path so label cardinality stays bounded.
pub fn normalize_path(path: &str) -> String {
    let uuid_regex = regex_lite::Regex::new(
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
    )
    .unwrap();
    let numeric_regex = regex_lite::Regex::new(r"/\d+(/|$)").unwrap();

    let result = uuid_regex.replace_all(path, "{job_id}");
    let result = numeric_regex.replace_all(&result, "/{id}$1");
    result.to_string()
}
