//! Bulk range sync.
//!
//! Walks a contiguous range of Pokédex IDs strictly sequentially, pacing
//! requests with a fixed delay. Valid IDs are contiguous from 1, so a long
//! streak of not-found results is taken to mean the scan has run past the
//! last species. That stop rule is a heuristic, not a guarantee.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::cache::SpeciesCache;
use super::progress::SyncProgress;
use crate::config::SyncConfig;
use crate::metrics::{SYNC_ITEMS, SYNC_RUNS};
use crate::species::CachedSpecies;

/// Named ID ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPreset {
    /// IDs 1-493 (through the fourth generation).
    Narrow,
    /// IDs 1-1050 (the full known species space).
    Wide,
}

impl SyncPreset {
    /// Inclusive `(start, end)` bounds.
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            SyncPreset::Narrow => (1, 493),
            SyncPreset::Wide => (1, 1050),
        }
    }
}

/// Tuning for a range sync.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOptions {
    /// Pause between consecutive attempts.
    pub delay: Duration,
    /// Consecutive not-found results that end the scan.
    pub not_found_threshold: u32,
    /// Consecutive transient failures that end the scan; unlimited if `None`.
    pub max_consecutive_failures: Option<u32>,
}

impl SyncOptions {
    /// Reject thresholds that would end a scan regardless of its results.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.not_found_threshold == 0 {
            return Err(SyncError::InvalidOptions(
                "not_found_threshold must be at least 1".to_string(),
            ));
        }
        if self.max_consecutive_failures == Some(0) {
            return Err(SyncError::InvalidOptions(
                "max_consecutive_failures must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for SyncOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            delay: Duration::from_millis(config.delay_ms),
            not_found_threshold: config.not_found_threshold,
            max_consecutive_failures: config.max_consecutive_failures,
        }
    }
}

/// Why a range scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every ID in the range was attempted.
    Completed,
    /// Hit the consecutive not-found threshold.
    NotFoundStreak,
    /// Hit the consecutive transient-failure cutoff.
    FailureStreak,
    /// Cancelled through the progress handle.
    Cancelled,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Completed => "completed",
            StopReason::NotFoundStreak => "not_found_streak",
            StopReason::FailureStreak => "failure_streak",
            StopReason::Cancelled => "cancelled",
        }
    }
}

/// A per-ID failure swallowed by the scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncFailure {
    pub pokedex_id: u32,
    pub error: String,
}

/// Outcome of a range sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub start_id: u32,
    pub end_id: u32,
    /// IDs in the requested range.
    pub total: u32,
    /// IDs actually attempted.
    pub attempted: u32,
    /// Successfully cached species, in ID order.
    pub synced: Vec<CachedSpecies>,
    /// IDs the upstream does not know.
    pub not_found: Vec<u32>,
    /// IDs that failed for any other reason.
    pub failed: Vec<SyncFailure>,
    pub stop_reason: StopReason,
}

/// Errors that prevent a range sync from starting.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Invalid sync range {start}..={end}: IDs start at 1 and start must not exceed end")]
    InvalidRange { start: u32, end: u32 },

    #[error("Invalid sync options: {0}")]
    InvalidOptions(String),
}

/// Reject ranges that start at 0 or run backwards.
pub fn validate_range(start_id: u32, end_id: u32) -> Result<(), SyncError> {
    if start_id == 0 || start_id > end_id {
        return Err(SyncError::InvalidRange {
            start: start_id,
            end: end_id,
        });
    }
    Ok(())
}

impl SpeciesCache {
    /// Sync every ID in `start_id..=end_id`, reporting into `progress`.
    ///
    /// Per-ID failures are logged and recorded, never returned.
    pub async fn sync_range(
        &self,
        start_id: u32,
        end_id: u32,
        options: &SyncOptions,
        progress: &SyncProgress,
    ) -> Result<SyncReport, SyncError> {
        validate_range(start_id, end_id)?;
        options.validate()?;

        let total = end_id - start_id + 1;
        info!(
            "Starting species sync {}..={} ({} IDs, delay {:?}, not-found threshold {})",
            start_id, end_id, total, options.delay, options.not_found_threshold
        );

        let mut report = SyncReport {
            start_id,
            end_id,
            total,
            attempted: 0,
            synced: Vec::new(),
            not_found: Vec::new(),
            failed: Vec::new(),
            stop_reason: StopReason::Completed,
        };
        let mut not_found_streak = 0u32;
        let mut failure_streak = 0u32;

        progress.start(total);

        for pokedex_id in start_id..=end_id {
            if pokedex_id > start_id && !options.delay.is_zero() {
                tokio::select! {
                    _ = sleep(options.delay) => {}
                    _ = progress.cancelled() => {}
                }
            }

            if progress.is_cancelled() {
                info!("Species sync cancelled before ID {}", pokedex_id);
                report.stop_reason = StopReason::Cancelled;
                break;
            }

            match self.ensure_cached(pokedex_id).await {
                Ok(species) => {
                    not_found_streak = 0;
                    failure_streak = 0;
                    SYNC_ITEMS.with_label_values(&["synced"]).inc();
                    report.synced.push(species);
                }
                Err(e) if e.is_not_found() => {
                    not_found_streak += 1;
                    failure_streak = 0;
                    debug!(
                        "Pokédex ID {} not found upstream ({} in a row)",
                        pokedex_id, not_found_streak
                    );
                    SYNC_ITEMS.with_label_values(&["not_found"]).inc();
                    report.not_found.push(pokedex_id);
                }
                Err(e) => {
                    // A transient failure says nothing about the end of the range
                    not_found_streak = 0;
                    failure_streak += 1;
                    warn!("Failed to sync Pokédex ID {}: {}", pokedex_id, e);
                    SYNC_ITEMS.with_label_values(&["failed"]).inc();
                    report.failed.push(SyncFailure {
                        pokedex_id,
                        error: e.to_string(),
                    });
                }
            }

            report.attempted += 1;
            progress.update(report.attempted, None);

            if not_found_streak >= options.not_found_threshold {
                info!(
                    "Stopping species sync after {} consecutive not-found results at ID {}",
                    not_found_streak, pokedex_id
                );
                report.stop_reason = StopReason::NotFoundStreak;
                break;
            }

            if let Some(max) = options.max_consecutive_failures {
                if failure_streak >= max {
                    warn!(
                        "Stopping species sync after {} consecutive failures at ID {}",
                        failure_streak, pokedex_id
                    );
                    report.stop_reason = StopReason::FailureStreak;
                    break;
                }
            }
        }

        progress.finish();
        SYNC_RUNS
            .with_label_values(&[report.stop_reason.as_str()])
            .inc();

        info!(
            "Species sync {}..={} finished ({}): {} synced, {} not found, {} failed",
            start_id,
            end_id,
            report.stop_reason.as_str(),
            report.synced.len(),
            report.not_found.len(),
            report.failed.len()
        );

        Ok(report)
    }

    /// Sync one of the named ranges.
    pub async fn sync_preset(
        &self,
        preset: SyncPreset,
        options: &SyncOptions,
        progress: &SyncProgress,
    ) -> Result<SyncReport, SyncError> {
        let (start, end) = preset.bounds();
        self.sync_range(start, end, options, progress).await
    }
}
