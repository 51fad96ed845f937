//! Test utilities for database-backed tests.
//!
//! Sets up in-memory SQLite databases with migrations applied, seeds
//! catalog fixtures, and provides scripted provider adapters so worker
//! behavior can be exercised without network access.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use soletrack::adapters::{AdapterError, ProviderSyncAdapter, SyncOutcome};
use soletrack::models::style::Model as Style;
use soletrack::models::sync_job::{JobStatus, Provider};
use soletrack::models::{alias_product, stockx_product, style, sync_job};

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Fluent catalog fixture.
///
/// All external identifiers and metadata default to null so each test adds
/// exactly what its scenario needs.
pub struct StyleFixture {
    model: style::ActiveModel,
}

impl StyleFixture {
    pub fn new(style_id: &str) -> Self {
        let now = Utc::now().fixed_offset();
        Self {
            model: style::ActiveModel {
                style_id: Set(style_id.to_string()),
                name: Set(None),
                brand: Set(None),
                colorway: Set(None),
                category: Set(None),
                stockx_product_id: Set(None),
                stockx_url_key: Set(None),
                alias_catalog_id: Set(None),
                last_synced_at: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.model.name = Set(Some(name.to_string()));
        self
    }

    pub fn brand(mut self, brand: &str) -> Self {
        self.model.brand = Set(Some(brand.to_string()));
        self
    }

    pub fn colorway(mut self, colorway: &str) -> Self {
        self.model.colorway = Set(Some(colorway.to_string()));
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.model.category = Set(Some(category.to_string()));
        self
    }

    pub fn stockx_product_id(mut self, id: &str) -> Self {
        self.model.stockx_product_id = Set(Some(id.to_string()));
        self
    }

    pub fn stockx_url_key(mut self, key: &str) -> Self {
        self.model.stockx_url_key = Set(Some(key.to_string()));
        self
    }

    pub fn alias_catalog_id(mut self, id: &str) -> Self {
        self.model.alias_catalog_id = Set(Some(id.to_string()));
        self
    }

    pub async fn insert(self, db: &DatabaseConnection) -> Result<Style> {
        Ok(self.model.insert(db).await?)
    }
}

/// Reloads a job row.
pub async fn fetch_job(db: &DatabaseConnection, job_id: Uuid) -> Result<sync_job::Model> {
    sync_job::Entity::find_by_id(job_id)
        .one(db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("job {job_id} not found"))
}

/// Reloads a style row.
pub async fn fetch_style(db: &DatabaseConnection, style_id: &str) -> Result<Style> {
    style::Entity::find_by_id(style_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("style {style_id} not found"))
}

/// Force a job's queue fields to an arbitrary state, bypassing the
/// repository, so tests can fabricate mid-lifecycle scenarios.
pub async fn set_job_state(
    db: &DatabaseConnection,
    job_id: Uuid,
    status: JobStatus,
    attempts: i32,
    next_retry_in: Option<Duration>,
) -> Result<()> {
    let job = fetch_job(db, job_id).await?;
    let mut active: sync_job::ActiveModel = job.into();
    active.status = Set(status);
    active.attempts = Set(attempts);
    active.next_retry_at = Set(next_retry_in.map(|d| (Utc::now() + d).fixed_offset()));
    active.update(db).await?;
    Ok(())
}

/// Make a retry-scheduled job immediately eligible again.
pub async fn make_due(db: &DatabaseConnection, job_id: Uuid) -> Result<()> {
    let job = fetch_job(db, job_id).await?;
    let mut active: sync_job::ActiveModel = job.into();
    active.next_retry_at = Set(Some((Utc::now() - Duration::minutes(1)).fixed_offset()));
    active.update(db).await?;
    Ok(())
}

/// Seed a StockX product row directly.
pub async fn insert_stockx_product(db: &DatabaseConnection, style_id: &str) -> Result<()> {
    let now = Utc::now().fixed_offset();
    stockx_product::ActiveModel {
        product_id: Set(format!("prod-{style_id}")),
        style_id: Set(style_id.to_string()),
        url_key: Set(None),
        title: Set(None),
        brand: Set(None),
        colorway: Set(None),
        image_url: Set(None),
        retail_price_cents: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    Ok(())
}

/// Seed an Alias product row directly.
pub async fn insert_alias_product(
    db: &DatabaseConnection,
    style_id: &str,
    catalog_id: &str,
) -> Result<()> {
    let now = Utc::now().fixed_offset();
    alias_product::ActiveModel {
        catalog_id: Set(catalog_id.to_string()),
        style_id: Set(style_id.to_string()),
        name: Set(None),
        brand: Set(None),
        category: Set(None),
        lowest_price_cents: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    Ok(())
}

/// One scripted response for a [`ScriptedAdapter`] call.
#[derive(Clone)]
pub enum ScriptedResponse {
    /// Return success; optionally write a provider data row first, the way
    /// a real adapter persists fetched market data.
    Success { write_row: bool },
    /// Return a provider-reported failure outcome.
    Failure(&'static str),
    /// Return a transport-level error.
    TransportError(&'static str),
    /// Never resolve, for timeout tests.
    Hang,
}

/// Provider adapter driven by a queue of scripted responses. Once the
/// queue is drained every further call succeeds without writing data.
pub struct ScriptedAdapter {
    provider: Provider,
    db: DatabaseConnection,
    responses: Mutex<VecDeque<ScriptedResponse>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedAdapter {
    pub fn new(provider: Provider, db: DatabaseConnection) -> Arc<Self> {
        Arc::new(Self {
            provider,
            db,
            responses: Mutex::new(VecDeque::new()),
            calls: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn push(&self, response: ScriptedResponse) {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(response);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn write_row(&self, style: &Style) -> Result<(), sea_orm::DbErr> {
        let now = Utc::now().fixed_offset();
        match self.provider {
            Provider::Stockx => {
                stockx_product::ActiveModel {
                    product_id: Set(format!("prod-{}", style.style_id)),
                    style_id: Set(style.style_id.clone()),
                    url_key: Set(Some("air-force-1-low-white".to_string())),
                    title: Set(Some("Air Force 1 Low '07 White".to_string())),
                    brand: Set(Some("Nike".to_string())),
                    colorway: Set(Some("White/White".to_string())),
                    image_url: Set(None),
                    retail_price_cents: Set(Some(11000)),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&self.db)
                .await?;
            }
            Provider::Alias => {
                alias_product::ActiveModel {
                    catalog_id: Set(style
                        .alias_catalog_id
                        .clone()
                        .unwrap_or_else(|| format!("cat-{}", style.style_id))),
                    style_id: Set(style.style_id.clone()),
                    name: Set(Some("Air Force 1 Low '07 White".to_string())),
                    brand: Set(Some("Nike".to_string())),
                    category: Set(Some("shoes".to_string())),
                    lowest_price_cents: Set(Some(9800)),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&self.db)
                .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ProviderSyncAdapter for ScriptedAdapter {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn sync(&self, style: &Style) -> Result<SyncOutcome, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self
            .responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or(ScriptedResponse::Success { write_row: false });

        match response {
            ScriptedResponse::Success { write_row } => {
                if write_row {
                    self.write_row(style).await?;
                }
                Ok(SyncOutcome::ok())
            }
            ScriptedResponse::Failure(message) => Ok(SyncOutcome::failed(message)),
            ScriptedResponse::TransportError(message) => {
                Err(AdapterError::Decode(message.to_string()))
            }
            ScriptedResponse::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}
