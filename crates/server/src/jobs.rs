//! Background sync job registry.
//!
//! Every bulk sync started through the API runs as its own tokio task with a
//! dedicated [`SyncProgress`], so concurrent or repeated syncs report
//! independently. Finished jobs stay in the registry for inspection.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info};
use uuid::Uuid;

use nuzdex_core::{
    validate_range, ProgressSnapshot, SpeciesCache, StopReason, SyncError, SyncOptions,
    SyncPreset, SyncProgress, SyncReport,
};

/// Lifecycle of a sync job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// Counts from a finished sync.
#[derive(Debug, Clone, Serialize)]
pub struct SyncJobSummary {
    pub attempted: u32,
    pub synced: usize,
    pub not_found: usize,
    pub failed: usize,
    pub stop_reason: StopReason,
    /// IDs that failed transiently, for a targeted re-run.
    pub failed_ids: Vec<u32>,
}

impl From<&SyncReport> for SyncJobSummary {
    fn from(report: &SyncReport) -> Self {
        Self {
            attempted: report.attempted,
            synced: report.synced.len(),
            not_found: report.not_found.len(),
            failed: report.failed.len(),
            stop_reason: report.stop_reason,
            failed_ids: report.failed.iter().map(|f| f.pokedex_id).collect(),
        }
    }
}

/// Public view of a sync job.
#[derive(Debug, Clone, Serialize)]
pub struct SyncJobView {
    pub job_id: String,
    pub start_id: u32,
    pub end_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<SyncPreset>,
    pub status: JobStatus,
    pub progress: ProgressSnapshot,
    pub cancel_requested: bool,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SyncJobSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

struct SyncJob {
    start_id: u32,
    end_id: u32,
    preset: Option<SyncPreset>,
    status: JobStatus,
    progress: SyncProgress,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    summary: Option<SyncJobSummary>,
    error: Option<String>,
}

impl SyncJob {
    fn view(&self, job_id: &str) -> SyncJobView {
        SyncJobView {
            job_id: job_id.to_string(),
            start_id: self.start_id,
            end_id: self.end_id,
            preset: self.preset,
            status: self.status,
            progress: self.progress.snapshot(),
            cancel_requested: self.progress.is_cancelled(),
            started_at: self.started_at,
            finished_at: self.finished_at,
            summary: self.summary.clone(),
            error: self.error.clone(),
        }
    }
}

/// Errors from job registry operations.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Sync job not found: {0}")]
    NotFound(String),

    #[error("Sync job {0} is not running")]
    NotRunning(String),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// What a new job should cover.
#[derive(Debug, Clone, Copy)]
pub enum SyncTarget {
    Preset(SyncPreset),
    Range { start_id: u32, end_id: u32 },
}

impl SyncTarget {
    fn bounds(&self) -> (u32, u32) {
        match self {
            SyncTarget::Preset(preset) => preset.bounds(),
            SyncTarget::Range { start_id, end_id } => (*start_id, *end_id),
        }
    }

    fn preset(&self) -> Option<SyncPreset> {
        match self {
            SyncTarget::Preset(preset) => Some(*preset),
            SyncTarget::Range { .. } => None,
        }
    }
}

/// Registry of sync jobs keyed by job ID.
pub struct SyncJobRegistry {
    cache: Arc<SpeciesCache>,
    options: SyncOptions,
    jobs: Arc<RwLock<HashMap<String, SyncJob>>>,
}

impl SyncJobRegistry {
    pub fn new(cache: Arc<SpeciesCache>, options: SyncOptions) -> Self {
        Self {
            cache,
            options,
            jobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Validate the target, register a job and spawn its sync task.
    pub async fn start(&self, target: SyncTarget) -> Result<SyncJobView, JobError> {
        let (start_id, end_id) = target.bounds();
        validate_range(start_id, end_id)?;
        self.options.validate()?;

        let job_id = Uuid::new_v4().to_string();
        let progress = {
            let job_id = job_id.clone();
            SyncProgress::with_listener(Arc::new(move |snapshot: &ProgressSnapshot| {
                debug!(
                    "Sync job {} progress {}/{}",
                    job_id, snapshot.current, snapshot.total
                );
            }))
        };

        let job = SyncJob {
            start_id,
            end_id,
            preset: target.preset(),
            status: JobStatus::Running,
            progress: progress.clone(),
            started_at: Utc::now(),
            finished_at: None,
            summary: None,
            error: None,
        };
        let view = job.view(&job_id);
        self.jobs.write().await.insert(job_id.clone(), job);

        info!(
            "Started sync job {} for IDs {}..={}",
            job_id, start_id, end_id
        );

        let cache = Arc::clone(&self.cache);
        let jobs = Arc::clone(&self.jobs);
        let options = self.options.clone();
        tokio::spawn(async move {
            // Run the sync in its own task so a panic surfaces as a JoinError
            let task = {
                let progress = progress.clone();
                tokio::spawn(async move {
                    cache
                        .sync_range(start_id, end_id, &options, &progress)
                        .await
                })
            };
            let result = task.await;

            let mut jobs = jobs.write().await;
            let Some(job) = jobs.get_mut(&job_id) else {
                return;
            };
            job.finished_at = Some(Utc::now());

            match result {
                Ok(Ok(report)) => {
                    job.status = if report.stop_reason == StopReason::Cancelled {
                        JobStatus::Cancelled
                    } else {
                        JobStatus::Completed
                    };
                    job.summary = Some(SyncJobSummary::from(&report));
                    info!(
                        "Sync job {} finished: {} synced, {} not found, {} failed",
                        job_id,
                        report.synced.len(),
                        report.not_found.len(),
                        report.failed.len()
                    );
                }
                Ok(Err(e)) => {
                    error!("Sync job {} failed: {}", job_id, e);
                    job.status = JobStatus::Failed;
                    job.error = Some(e.to_string());
                }
                Err(e) => {
                    error!("Sync job {} aborted: {}", job_id, e);
                    progress.abort();
                    job.status = JobStatus::Failed;
                    job.error = Some(format!("Sync task aborted: {}", e));
                }
            }
        });

        Ok(view)
    }

    pub async fn get(&self, job_id: &str) -> Result<SyncJobView, JobError> {
        self.jobs
            .read()
            .await
            .get(job_id)
            .map(|job| job.view(job_id))
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))
    }

    /// All jobs, newest first.
    pub async fn list(&self) -> Vec<SyncJobView> {
        let mut views: Vec<SyncJobView> = self
            .jobs
            .read()
            .await
            .iter()
            .map(|(id, job)| job.view(id))
            .collect();
        views.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        views
    }

    /// Request cancellation; the task stops before its next attempt.
    pub async fn cancel(&self, job_id: &str) -> Result<SyncJobView, JobError> {
        let jobs = self.jobs.read().await;
        let job = jobs
            .get(job_id)
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;

        if job.status != JobStatus::Running {
            return Err(JobError::NotRunning(job_id.to_string()));
        }

        job.progress.cancel();
        info!("Cancellation requested for sync job {}", job_id);
        Ok(job.view(job_id))
    }

    pub async fn running_count(&self) -> usize {
        self.jobs
            .read()
            .await
            .values()
            .filter(|job| job.status == JobStatus::Running)
            .count()
    }
}
