//! # API Handlers
//!
//! HTTP endpoint handlers for the soletrack sync API.

use axum::extract::State;
use axum::response::Json;
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::models::ServiceInfo;
use crate::server::AppState;

pub mod queue;
pub mod sync;

/// Root handler that returns basic service information
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Liveness and database health probe
pub async fn healthz(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    crate::db::health_check(&state.db).await?;
    Ok(Json(json!({ "status": "ok" })))
}

#[cfg(test)]
mod tests;
