//! Bulk sync job API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use nuzdex_core::SyncPreset;
use serde::{Deserialize, Serialize};

use super::handlers::{api_error, ApiError};
use crate::jobs::{JobError, SyncJobView, SyncTarget};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

/// Request body for starting a sync: either a preset or an explicit range.
#[derive(Debug, Deserialize)]
pub struct StartSyncBody {
    pub preset: Option<SyncPreset>,
    pub start_id: Option<u32>,
    pub end_id: Option<u32>,
}

impl StartSyncBody {
    fn target(&self) -> Option<SyncTarget> {
        match (self.preset, self.start_id, self.end_id) {
            (Some(preset), None, None) => Some(SyncTarget::Preset(preset)),
            (None, Some(start_id), Some(end_id)) => Some(SyncTarget::Range { start_id, end_id }),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SyncJobListResponse {
    pub jobs: Vec<SyncJobView>,
    pub total: usize,
}

fn job_error(e: JobError) -> ApiError {
    let status = match &e {
        JobError::NotFound(_) => StatusCode::NOT_FOUND,
        JobError::NotRunning(_) => StatusCode::CONFLICT,
        JobError::Sync(_) => StatusCode::BAD_REQUEST,
    };
    api_error(status, e)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/sync
///
/// Start a bulk sync in the background and return its job.
pub async fn start_sync(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StartSyncBody>,
) -> Result<(StatusCode, Json<SyncJobView>), ApiError> {
    let target = body.target().ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            "Provide either a preset or both start_id and end_id",
        )
    })?;

    let job = state.jobs().start(target).await.map_err(job_error)?;
    Ok((StatusCode::ACCEPTED, Json(job)))
}

/// GET /api/v1/sync
pub async fn list_sync_jobs(State(state): State<Arc<AppState>>) -> Json<SyncJobListResponse> {
    let jobs = state.jobs().list().await;
    let total = jobs.len();
    Json(SyncJobListResponse { jobs, total })
}

/// GET /api/v1/sync/{job_id}
pub async fn get_sync_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<SyncJobView>, ApiError> {
    state.jobs().get(&job_id).await.map(Json).map_err(job_error)
}

/// POST /api/v1/sync/{job_id}/cancel
pub async fn cancel_sync_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<SyncJobView>, ApiError> {
    state
        .jobs()
        .cancel(&job_id)
        .await
        .map(Json)
        .map_err(job_error)
}
