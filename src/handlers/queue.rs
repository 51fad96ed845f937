//! # Queue Handlers
//!
//! Queue introspection and the cron-facing batch trigger.

use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::models::sync_job::Provider;
use crate::repositories::{QueueStats, SyncJobRepository};
use crate::server::AppState;
use crate::sync::BatchWorker;
use crate::sync::worker::BatchReport;

/// Query parameters for the worker-run endpoint
#[derive(Debug, Deserialize)]
pub struct RunBatchQuery {
    /// Override the configured batch size
    pub limit: Option<u64>,
    /// Restrict the batch to one provider's jobs
    pub provider: Option<Provider>,
}

/// Current job counts by status
pub async fn queue_stats(State(state): State<AppState>) -> Result<Json<QueueStats>, ApiError> {
    let repo = SyncJobRepository::new(state.db.clone());
    let stats = repo.queue_stats().await?;
    Ok(Json(stats))
}

/// Claim and process one batch of eligible jobs. Invoked by the scheduler;
/// returns the per-batch report so the caller can log or alert on failures.
pub async fn run_batch(
    State(state): State<AppState>,
    Query(query): Query<RunBatchQuery>,
) -> Result<Json<BatchReport>, ApiError> {
    let worker = BatchWorker::new(
        state.db.clone(),
        state.adapters.clone(),
        &state.config.worker,
    );
    let report = worker.process_batch(query.limit, query.provider).await?;
    Ok(Json(report))
}
