//! # Sync Status and Retry Handlers
//!
//! Read-side status derivation endpoints and the user-facing retry trigger.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, validation_error};
use crate::models::sync_job::Provider;
use crate::server::AppState;
use crate::sync::retry::RetryOutcome;
use crate::sync::status::DerivedSyncStatus;
use crate::sync::{RetryController, StatusService, normalize_style_id};

/// Largest batch the status endpoint accepts in one call.
const MAX_BATCH_STYLES: usize = 200;

/// Derived sync status for one style
#[derive(Debug, Serialize)]
pub struct SyncStatusResponse {
    pub style_id: String,
    #[serde(flatten)]
    pub status: DerivedSyncStatus,
}

/// Request payload for the batch status endpoint
#[derive(Debug, Deserialize)]
pub struct BatchStatusRequest {
    pub style_ids: Vec<String>,
}

/// Response payload for the batch status endpoint, keyed by normalized
/// style id
#[derive(Debug, Serialize)]
pub struct BatchStatusResponse {
    pub statuses: HashMap<String, DerivedSyncStatus>,
}

/// Query parameters for the retry endpoint
#[derive(Debug, Deserialize)]
pub struct RetryQuery {
    /// Restrict the retry to one provider; omitted means all providers
    pub provider: Option<Provider>,
}

/// Get the derived sync status for a single style
pub async fn get_sync_status(
    State(state): State<AppState>,
    Path(style_id): Path<String>,
) -> Result<Json<SyncStatusResponse>, ApiError> {
    let service = StatusService::new(state.db.clone());
    let status = service.get_sync_status(&style_id).await?;
    Ok(Json(SyncStatusResponse {
        style_id: normalize_style_id(&style_id),
        status,
    }))
}

/// Get derived sync status for many styles in one call
pub async fn batch_sync_status(
    State(state): State<AppState>,
    Json(payload): Json<BatchStatusRequest>,
) -> Result<Json<BatchStatusResponse>, ApiError> {
    if payload.style_ids.is_empty() {
        return Err(validation_error(
            "No style ids provided",
            serde_json::json!({ "style_ids": "At least one style id is required" }),
        ));
    }
    if payload.style_ids.len() > MAX_BATCH_STYLES {
        return Err(validation_error(
            "Too many style ids",
            serde_json::json!({
                "style_ids": format!("At most {MAX_BATCH_STYLES} style ids per request")
            }),
        ));
    }

    let service = StatusService::new(state.db.clone());
    let statuses = service.batch_get_sync_status(&payload.style_ids).await?;
    Ok(Json(BatchStatusResponse { statuses }))
}

/// Trigger a retry for one style, optionally limited to one provider
pub async fn retry_style(
    State(state): State<AppState>,
    Path(style_id): Path<String>,
    Query(query): Query<RetryQuery>,
) -> Result<Json<RetryOutcome>, ApiError> {
    let controller =
        RetryController::new(state.db.clone(), state.config.worker.max_attempts);
    let outcome = controller.retry_sync(&style_id, query.provider).await?;
    Ok(Json(outcome))
}
