//! Provider sync adapters
//!
//! Defines the narrow contract the batch worker consumes: given a resolved
//! catalog row, fetch the provider's market data for that style and upsert
//! it into the provider-owned tables. Success or failure is binary at the
//! whole-style level; adapters may additionally report per-variant errors.

pub mod alias;
pub mod stockx;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::config::AppConfig;
use crate::models::style::Model as Style;
use crate::models::sync_job::Provider;

pub use alias::AliasAdapter;
pub use stockx::StockxAdapter;

/// Adapter-level error. The worker classifies all of these as transient:
/// they describe conditions (network, provider outage, malformed payloads)
/// that a later retry can plausibly resolve.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("provider returned status {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("malformed provider response: {0}")]
    Decode(String),
    #[error("data access error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("missing provider identifier: {0}")]
    MissingIdentifier(String),
    #[error("invalid provider base url: {0}")]
    BaseUrl(String),
}

/// Per-variant error reported alongside a sync outcome.
#[derive(Debug, Clone, Serialize)]
pub struct VariantError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
}

/// Outcome of a whole-style sync.
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    pub success: bool,
    pub errors: Vec<VariantError>,
}

impl SyncOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            errors: Vec::new(),
        }
    }

    pub fn failed<S: Into<String>>(message: S) -> Self {
        Self {
            success: false,
            errors: vec![VariantError {
                error: message.into(),
                size: None,
                variant_id: None,
            }],
        }
    }

    /// The message the job store records when `success` is false.
    pub fn first_error(&self) -> &str {
        self.errors
            .first()
            .map(|e| e.error.as_str())
            .unwrap_or("provider sync failed")
    }
}

/// The contract each provider adapter implements for the batch worker.
#[async_trait]
pub trait ProviderSyncAdapter: Send + Sync {
    /// Which provider this adapter syncs from.
    fn provider(&self) -> Provider;

    /// Fetch and persist this style's market data.
    ///
    /// `Ok` with `success = false` is a provider-reported failure (used as
    /// the job's failure message); `Err` is a transport/storage fault. Both
    /// are retried by the worker with backoff.
    async fn sync(&self, style: &Style) -> Result<SyncOutcome, AdapterError>;
}

/// Injected adapter registry, constructed at startup and handed to the
/// worker. Deliberately not a global: tests register their own fakes.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<Provider, Arc<dyn ProviderSyncAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Build the production registry from application configuration.
    pub fn from_config(config: &AppConfig, db: DatabaseConnection) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(StockxAdapter::new(
            db.clone(),
            config.stockx.api_base.clone(),
            config.stockx.api_key.clone(),
        )));
        registry.register(Arc::new(AliasAdapter::new(
            db,
            config.alias.api_base.clone(),
            config.alias.api_key.clone(),
        )));
        registry
    }

    pub fn register(&mut self, adapter: Arc<dyn ProviderSyncAdapter>) {
        self.adapters.insert(adapter.provider(), adapter);
    }

    pub fn get(&self, provider: Provider) -> Option<Arc<dyn ProviderSyncAdapter>> {
        self.adapters.get(&provider).cloned()
    }
}

/// Truncate a provider response body before embedding it in an error.
pub(crate) fn body_snippet(body: &str) -> String {
    if body.chars().count() > 200 {
        let truncated: String = body.chars().take(200).collect();
        format!("{}...", truncated)
    } else {
        body.to_string()
    }
}

/// Join path segments onto a configured API base, percent-encoding each
/// segment. A trailing slash on the base is tolerated.
pub(crate) fn endpoint_url(base: &str, segments: &[&str]) -> Result<Url, AdapterError> {
    let mut url = Url::parse(base).map_err(|e| AdapterError::BaseUrl(format!("{base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| AdapterError::BaseUrl(format!("{base}: cannot be a base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
