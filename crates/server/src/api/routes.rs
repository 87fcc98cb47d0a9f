use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, middleware::metrics_middleware, species, sync};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Species cache
        .route("/species", get(species::list_species))
        .route("/species/stats", get(species::get_stats))
        .route(
            "/species/{id}",
            get(species::get_species)
                .post(species::ensure_species)
                .delete(species::remove_species),
        )
        .route("/species/{id}/refresh", post(species::refresh_species))
        // Bulk sync jobs
        .route("/sync", post(sync::start_sync).get(sync::list_sync_jobs))
        .route("/sync/{job_id}", get(sync::get_sync_job))
        .route("/sync/{job_id}/cancel", post(sync::cancel_sync_job))
        .with_state(Arc::clone(&state));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
