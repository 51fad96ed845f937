//! # Server Configuration
//!
//! Axum router assembly and startup for the soletrack sync API.

use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::adapters::AdapterRegistry;
use crate::config::AppConfig;
use crate::handlers;
use crate::telemetry::{TraceContext, with_trace_context};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub adapters: AdapterRegistry,
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/styles/{style_id}/sync-status", get(handlers::sync::get_sync_status))
        .route("/sync-status/batch", post(handlers::sync::batch_sync_status))
        .route("/styles/{style_id}/retry", post(handlers::sync::retry_style))
        .route("/queue/stats", get(handlers::queue::queue_stats))
        .route("/worker/run", post(handlers::queue::run_batch))
        .layer(middleware::from_fn(trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs each request inside a task-local trace context so log lines and
/// problem+json error bodies carry the same correlation id. An inbound
/// `x-trace-id` header wins over a generated one.
async fn trace_context_middleware(request: Request, next: Next) -> Response {
    let trace_id = request
        .headers()
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    with_trace_context(TraceContext { trace_id }, next.run(request)).await
}

/// Starts the server with the given configuration
pub async fn run_server(
    config: AppConfig,
    db: DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;

    let adapters = AdapterRegistry::from_config(&config, db.clone());
    let state = AppState {
        config: Arc::new(config),
        db,
        adapters,
    };
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
