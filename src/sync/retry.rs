//! Retry control
//!
//! Turns a user's "sync this style again" intent into queue entries,
//! skipping providers that are already in flight, already done, or
//! structurally unable to sync.

use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::SyncServiceError;
use crate::models::sync_job::Provider;
use crate::repositories::{CatalogRepository, SyncJobRepository};
use crate::sync::normalize_style_id;
use crate::sync::status::{ProviderStatus, StatusService};

/// A job the retry created, echoed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedJob {
    pub job_id: Uuid,
    pub provider: Provider,
}

/// Result of a retry request. Partial success is normal: one provider may
/// enqueue while the other reports why it cannot.
#[derive(Debug, Default, Serialize)]
pub struct RetryOutcome {
    pub jobs_created: Vec<CreatedJob>,
    pub errors: Vec<String>,
}

pub struct RetryController {
    status: StatusService,
    jobs: SyncJobRepository,
    catalog: CatalogRepository,
    max_attempts: i32,
}

impl RetryController {
    pub fn new(db: DatabaseConnection, max_attempts: i32) -> Self {
        Self {
            status: StatusService::new(db.clone()),
            jobs: SyncJobRepository::new(db.clone()),
            catalog: CatalogRepository::new(db),
            max_attempts,
        }
    }

    /// Enqueue fresh sync jobs for one style, for one provider or all of
    /// them. Idempotent with respect to in-flight work: a provider that
    /// already has a pending or processing job is left alone.
    #[instrument(skip(self), fields(style_id = %style_id))]
    pub async fn retry_sync(
        &self,
        style_id: &str,
        provider: Option<Provider>,
    ) -> Result<RetryOutcome, SyncServiceError> {
        let style_id = normalize_style_id(style_id);
        let derived = self.status.get_sync_status(&style_id).await?;
        let style = self.catalog.find_by_style_id(&style_id).await?;

        let candidates: Vec<Provider> = match provider {
            Some(p) => vec![p],
            None => Provider::ALL.to_vec(),
        };

        let mut outcome = RetryOutcome::default();
        for provider in candidates {
            let current = derived.for_provider(provider);
            if matches!(current, ProviderStatus::Processing | ProviderStatus::Completed) {
                continue;
            }

            // Alias cannot sync without a catalog id. StockX has no such
            // gate: it falls back to a SKU search.
            if provider == Provider::Alias {
                let has_catalog_id = style
                    .as_ref()
                    .is_some_and(|s| s.alias_catalog_id.is_some());
                if !has_catalog_id {
                    if current == ProviderStatus::NotMapped {
                        outcome
                            .errors
                            .push(format!("{style_id} (alias): no catalog id, cannot sync"));
                    }
                    continue;
                }
            }

            if let Some(job) = self
                .jobs
                .enqueue(&style_id, provider, self.max_attempts)
                .await?
            {
                outcome.jobs_created.push(CreatedJob {
                    job_id: job.id,
                    provider,
                });
            }
        }

        info!(
            style_id = %style_id,
            created = outcome.jobs_created.len(),
            errors = outcome.errors.len(),
            "Retry request handled"
        );
        Ok(outcome)
    }
}
