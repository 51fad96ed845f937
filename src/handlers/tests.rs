//! # Tests for Handlers
//!
//! Router-level tests exercising the handlers through `tower::oneshot`
//! against an in-memory database.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, Database, Set};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::adapters::AdapterRegistry;
use crate::config::AppConfig;
use crate::models::style;
use crate::repositories::SyncJobRepository;
use crate::server::{AppState, create_app};

async fn test_app() -> (Router, AppState) {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("connect test db");
    Migrator::up(&db, None).await.expect("run migrations");

    let state = AppState {
        config: Arc::new(AppConfig::default()),
        db,
        adapters: AdapterRegistry::new(),
    };
    (create_app(state.clone()), state)
}

async fn seed_style(state: &AppState, style_id: &str, alias_catalog_id: Option<&str>) {
    let now = chrono::Utc::now().fixed_offset();
    style::ActiveModel {
        style_id: Set(style_id.to_string()),
        name: Set(None),
        brand: Set(None),
        colorway: Set(None),
        category: Set(None),
        stockx_product_id: Set(None),
        stockx_url_key: Set(None),
        alias_catalog_id: Set(alias_catalog_id.map(str::to_string)),
        last_synced_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await
    .expect("seed style");
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse body json")
}

#[tokio::test]
async fn root_returns_service_info() {
    let (app, _state) = test_app().await;

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["service"], "soletrack");
}

#[tokio::test]
async fn healthz_reports_ok() {
    let (app, _state) = test_app().await;

    let response = app
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn sync_status_for_unknown_style_is_not_mapped() {
    let (app, _state) = test_app().await;

    let response = app
        .oneshot(
            Request::get("/styles/ZZ9999-000/sync-status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["style_id"], "ZZ9999-000");
    assert_eq!(body["stockx"], "not_mapped");
    assert_eq!(body["alias"], "not_mapped");
    assert_eq!(body["overall"], "not_mapped");
}

#[tokio::test]
async fn sync_status_normalizes_the_path_id() {
    let (app, state) = test_app().await;
    seed_style(&state, "DD1391-100", None).await;
    let repo = SyncJobRepository::new(state.db.clone());
    repo.enqueue("DD1391-100", crate::models::Provider::Stockx, 5)
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::get("/styles/dd1391-100/sync-status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["style_id"], "DD1391-100");
    assert_eq!(body["stockx"], "pending");
    assert_eq!(body["overall"], "syncing");
}

#[tokio::test]
async fn batch_status_rejects_empty_payload() {
    let (app, _state) = test_app().await;

    let response = app
        .oneshot(
            Request::post("/sync-status/batch")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "style_ids": [] }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn batch_status_returns_entry_per_style() {
    let (app, state) = test_app().await;
    seed_style(&state, "DD1391-100", Some("air-force-1-low")).await;

    let response = app
        .oneshot(
            Request::post("/sync-status/batch")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "style_ids": ["dd1391-100", "ZZ9999-000"] }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let statuses = &body["statuses"];
    assert_eq!(statuses["DD1391-100"]["alias"], "pending");
    assert_eq!(statuses["ZZ9999-000"]["overall"], "not_mapped");
}

#[tokio::test]
async fn retry_creates_jobs_and_reports_alias_gap() {
    let (app, state) = test_app().await;
    seed_style(&state, "CW2288-111", None).await;

    let response = app
        .oneshot(
            Request::post("/styles/CW2288-111/retry")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let created = body["jobs_created"].as_array().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0]["provider"], "stockx");
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().contains("no catalog id"));
}

#[tokio::test]
async fn retry_with_provider_filter_only_touches_that_provider() {
    let (app, state) = test_app().await;
    seed_style(&state, "CW2288-111", Some("alias-123")).await;

    let response = app
        .oneshot(
            Request::post("/styles/CW2288-111/retry?provider=alias")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let created = body["jobs_created"].as_array().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0]["provider"], "alias");
}

#[tokio::test]
async fn queue_stats_zero_filled_on_empty_queue() {
    let (app, _state) = test_app().await;

    let response = app
        .oneshot(Request::get("/queue/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["pending"], 0);
    assert_eq!(body["processing"], 0);
    assert_eq!(body["completed"], 0);
    assert_eq!(body["failed"], 0);
}

#[tokio::test]
async fn run_batch_with_empty_queue_reports_nothing_processed() {
    let (app, _state) = test_app().await;

    let response = app
        .oneshot(Request::post("/worker/run").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["processed"], 0);
    assert_eq!(body["successful"], 0);
    assert_eq!(body["failed"], 0);
}
