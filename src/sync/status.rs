//! Status derivation
//!
//! Per-provider and overall sync status is never stored; it is derived on
//! read from the latest job per provider, the style's external identifiers,
//! and the presence of market data. Storing it would add a second source of
//! truth that drifts from the queue.

use std::collections::HashMap;

use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::error::SyncServiceError;
use crate::models::style::Model as Style;
use crate::models::sync_job::{JobStatus, Model as SyncJob, Provider};
use crate::repositories::{CatalogRepository, ProviderDataRepository, SyncJobRepository};
use crate::sync::normalize_style_id;

/// Sync state of a single provider for a style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    NotMapped,
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProviderStatus {
    fn is_in_flight(self) -> bool {
        matches!(self, ProviderStatus::Pending | ProviderStatus::Processing)
    }
}

impl From<JobStatus> for ProviderStatus {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Pending => ProviderStatus::Pending,
            JobStatus::Processing => ProviderStatus::Processing,
            JobStatus::Completed => ProviderStatus::Completed,
            JobStatus::Failed => ProviderStatus::Failed,
        }
    }
}

/// Aggregate of the per-provider states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    NotMapped,
    Syncing,
    Ready,
    Partial,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DerivedSyncStatus {
    pub stockx: ProviderStatus,
    pub alias: ProviderStatus,
    pub overall: OverallStatus,
}

impl DerivedSyncStatus {
    pub fn new(stockx: ProviderStatus, alias: ProviderStatus) -> Self {
        Self {
            stockx,
            alias,
            overall: derive_overall(stockx, alias),
        }
    }

    fn not_mapped() -> Self {
        Self::new(ProviderStatus::NotMapped, ProviderStatus::NotMapped)
    }

    pub fn for_provider(&self, provider: Provider) -> ProviderStatus {
        match provider {
            Provider::Stockx => self.stockx,
            Provider::Alias => self.alias,
        }
    }
}

/// Fold two provider states into one overall state. First matching rule
/// wins; any in-flight work dominates everything else.
pub fn derive_overall(stockx: ProviderStatus, alias: ProviderStatus) -> OverallStatus {
    use ProviderStatus::{Completed, Failed, NotMapped};

    if stockx.is_in_flight() || alias.is_in_flight() {
        return OverallStatus::Syncing;
    }
    match (stockx, alias) {
        (Completed, Completed) => OverallStatus::Ready,
        (NotMapped, NotMapped) => OverallStatus::NotMapped,
        (Completed, _) | (_, Completed) => OverallStatus::Partial,
        (Failed, _) | (_, Failed) => OverallStatus::Failed,
        // Unreachable with two providers: every remaining pair is covered
        // above. Kept so the match stays total if a provider is added.
        _ => OverallStatus::Partial,
    }
}

/// Read-side service deriving sync status for one or many styles.
pub struct StatusService {
    jobs: SyncJobRepository,
    catalog: CatalogRepository,
    provider_data: ProviderDataRepository,
}

impl StatusService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            jobs: SyncJobRepository::new(db.clone()),
            catalog: CatalogRepository::new(db.clone()),
            provider_data: ProviderDataRepository::new(db),
        }
    }

    /// Derived status for a single style.
    ///
    /// A style absent from the catalog reports not_mapped on every axis
    /// rather than an error, so callers can poll ids they have not imported
    /// yet.
    pub async fn get_sync_status(&self, style_id: &str) -> Result<DerivedSyncStatus, SyncServiceError> {
        let style_id = normalize_style_id(style_id);
        let Some(style) = self.catalog.find_by_style_id(&style_id).await? else {
            return Ok(DerivedSyncStatus::not_mapped());
        };

        let latest = self.jobs.latest_per_provider(&style_id).await?;

        let stockx = self
            .provider_status(&style, Provider::Stockx, latest.get(&Provider::Stockx))
            .await?;
        let alias = self
            .provider_status(&style, Provider::Alias, latest.get(&Provider::Alias))
            .await?;

        Ok(DerivedSyncStatus::new(stockx, alias))
    }

    /// Batch form of [`get_sync_status`]: a constant number of round trips
    /// regardless of how many styles are asked for. Results are keyed by
    /// the normalized style id and agree exactly with the single form.
    ///
    /// [`get_sync_status`]: StatusService::get_sync_status
    pub async fn batch_get_sync_status(
        &self,
        style_ids: &[String],
    ) -> Result<HashMap<String, DerivedSyncStatus>, SyncServiceError> {
        let mut normalized: Vec<String> = Vec::with_capacity(style_ids.len());
        for raw in style_ids {
            let id = normalize_style_id(raw);
            if !normalized.contains(&id) {
                normalized.push(id);
            }
        }
        if normalized.is_empty() {
            return Ok(HashMap::new());
        }

        let styles = self.catalog.find_many(&normalized).await?;
        let latest = self.jobs.latest_for_styles(&normalized).await?;
        let stockx_data = self
            .provider_data
            .exists_any(&normalized, Provider::Stockx)
            .await?;
        let alias_data = self
            .provider_data
            .exists_any(&normalized, Provider::Alias)
            .await?;

        let mut out = HashMap::with_capacity(normalized.len());
        for style_id in normalized {
            let Some(style) = styles.get(&style_id) else {
                out.insert(style_id, DerivedSyncStatus::not_mapped());
                continue;
            };

            let stockx = jobless_or(
                latest.get(&(style_id.clone(), Provider::Stockx)),
                || fallback_status(has_external_id(style, Provider::Stockx), stockx_data.contains(&style_id)),
            );
            let alias = jobless_or(
                latest.get(&(style_id.clone(), Provider::Alias)),
                || fallback_status(has_external_id(style, Provider::Alias), alias_data.contains(&style_id)),
            );

            out.insert(style_id, DerivedSyncStatus::new(stockx, alias));
        }
        Ok(out)
    }

    /// Single-style provider status: latest job wins, otherwise fall back
    /// to identifier and data presence.
    async fn provider_status(
        &self,
        style: &Style,
        provider: Provider,
        latest_job: Option<&SyncJob>,
    ) -> Result<ProviderStatus, SyncServiceError> {
        if let Some(job) = latest_job {
            return Ok(job.status.into());
        }
        if !has_external_id(style, provider) {
            return Ok(ProviderStatus::NotMapped);
        }
        let has_data = self.provider_data.exists(&style.style_id, provider).await?;
        Ok(fallback_status(true, has_data))
    }
}

fn jobless_or(job: Option<&SyncJob>, fallback: impl FnOnce() -> ProviderStatus) -> ProviderStatus {
    match job {
        Some(job) => job.status.into(),
        None => fallback(),
    }
}

/// Status when no job history exists: mapped styles with data already in
/// place count as completed, mapped styles without data as pending.
fn fallback_status(has_identifier: bool, has_data: bool) -> ProviderStatus {
    if !has_identifier {
        ProviderStatus::NotMapped
    } else if has_data {
        ProviderStatus::Completed
    } else {
        ProviderStatus::Pending
    }
}

fn has_external_id(style: &Style, provider: Provider) -> bool {
    match provider {
        Provider::Stockx => style.stockx_product_id.is_some() || style.stockx_url_key.is_some(),
        Provider::Alias => style.alias_catalog_id.is_some(),
    }
}
