//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Species cache lookups (hits vs. misses)
//! - Upstream PokeAPI requests
//! - Bulk range syncs

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Cache Metrics
// =============================================================================

/// Cache lookups by result.
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("nuzdex_cache_lookups_total", "Total species cache lookups"),
        &["result"], // "hit", "miss"
    )
    .unwrap()
});

// =============================================================================
// Upstream Metrics
// =============================================================================

/// Upstream requests by endpoint and status.
pub static UPSTREAM_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "nuzdex_upstream_requests_total",
            "Total PokeAPI requests",
        ),
        &["endpoint", "status"], // status: "success", "not_found", "error"
    )
    .unwrap()
});

/// Upstream request duration.
pub static UPSTREAM_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "nuzdex_upstream_request_duration_seconds",
            "Duration of PokeAPI requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["endpoint"],
    )
    .unwrap()
});

// =============================================================================
// Sync Metrics
// =============================================================================

/// Range sync items by outcome.
pub static SYNC_ITEMS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("nuzdex_sync_items_total", "Total range sync attempts"),
        &["outcome"], // "synced", "not_found", "failed"
    )
    .unwrap()
});

/// Completed range syncs by stop reason.
pub static SYNC_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("nuzdex_sync_runs_total", "Total completed range syncs"),
        &["stop_reason"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CACHE_LOOKUPS.clone()),
        Box::new(UPSTREAM_REQUESTS.clone()),
        Box::new(UPSTREAM_REQUEST_DURATION.clone()),
        Box::new(SYNC_ITEMS.clone()),
        Box::new(SYNC_RUNS.clone()),
    ]
}
