//! Species cache API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use nuzdex_core::{CacheError, CacheStats, CachedSpecies, SpeciesQuery, StoreError};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

/// Maximum allowed limit for species listings
const MAX_LIMIT: u32 = 2000;

/// Default limit for species listings
const DEFAULT_LIMIT: u32 = 100;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListSpeciesParams {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SpeciesListResponse {
    pub species: Vec<CachedSpecies>,
    pub total: u64,
    pub offset: u32,
    pub limit: u32,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

/// Map a cache error to an HTTP status.
///
/// Upstream not-found is 404, any other upstream failure is 502.
fn cache_error(pokedex_id: u32, e: CacheError) -> ApiError {
    match e {
        CacheError::InvalidId(_) => api_error(StatusCode::BAD_REQUEST, e),
        e if e.is_not_found() => api_error(
            StatusCode::NOT_FOUND,
            format!("Species not found upstream: {}", pokedex_id),
        ),
        CacheError::Fetch(_) => {
            warn!("Upstream fetch for species {} failed: {}", pokedex_id, e);
            api_error(StatusCode::BAD_GATEWAY, e)
        }
        CacheError::Store(_) => api_error(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/species
///
/// List cached species ordered by Pokédex ID.
pub async fn list_species(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListSpeciesParams>,
) -> Result<Json<SpeciesListResponse>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0);

    let query = SpeciesQuery {
        offset,
        limit: Some(limit),
    };

    let species = state
        .store()
        .list(&query)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;
    let total = state
        .store()
        .count()
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;

    Ok(Json(SpeciesListResponse {
        species,
        total,
        offset,
        limit,
    }))
}

/// GET /api/v1/species/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CacheStats>, ApiError> {
    match state.store().stats() {
        Ok(stats) => Ok(Json(stats)),
        Err(e) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e)),
    }
}

/// GET /api/v1/species/{id}
///
/// Local lookup only; never reaches the upstream.
pub async fn get_species(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<CachedSpecies>, ApiError> {
    match state.cache().get_cached(id) {
        Ok(Some(species)) => Ok(Json(species)),
        Ok(None) => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Species not cached: {}", id),
        )),
        Err(e) => Err(cache_error(id, e)),
    }
}

/// POST /api/v1/species/{id}
///
/// Return the cached entry, fetching it from the upstream on a miss.
pub async fn ensure_species(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<CachedSpecies>, ApiError> {
    state
        .cache()
        .ensure_cached(id)
        .await
        .map(Json)
        .map_err(|e| cache_error(id, e))
}

/// POST /api/v1/species/{id}/refresh
pub async fn refresh_species(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<CachedSpecies>, ApiError> {
    state
        .cache()
        .refresh(id)
        .await
        .map(Json)
        .map_err(|e| cache_error(id, e))
}

/// DELETE /api/v1/species/{id}
pub async fn remove_species(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<SuccessResponse>, ApiError> {
    match state.store().remove(id) {
        Ok(()) => Ok(Json(SuccessResponse {
            message: format!("Removed species {}", id),
        })),
        Err(StoreError::NotFound(_)) => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Species not cached: {}", id),
        )),
        Err(e) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e)),
    }
}
