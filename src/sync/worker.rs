//! Batch worker
//!
//! Claims eligible jobs and runs them strictly sequentially, pacing between
//! jobs so provider rate limits hold even when several styles are due at
//! once. Each failure is classified as transient (retried with exponential
//! backoff) or permanent (failed immediately, attempts notwithstanding).

use std::time::Duration;

use metrics::counter;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::AdapterRegistry;
use crate::config::WorkerConfig;
use crate::error::SyncServiceError;
use crate::models::sync_job::{Model as SyncJob, Provider};
use crate::repositories::{CatalogRepository, SyncJobRepository};
use crate::sync::backfill::MetadataBackfill;
use crate::sync::pacer::Pacer;

/// Largest backoff exponent; 2^5 minutes already exceeds the cap.
const MAX_BACKOFF_EXPONENT: i32 = 5;
const BACKOFF_CAP_MINUTES: i64 = 30;

/// Retry delay after the given number of attempts: 2^attempts minutes,
/// capped at 30. Attempts 1 through 5 map to 2, 4, 8, 16, 30 minutes.
pub fn backoff_delay(attempts: i32) -> chrono::Duration {
    let exponent = attempts.clamp(0, MAX_BACKOFF_EXPONENT) as u32;
    let minutes = (1i64 << exponent).min(BACKOFF_CAP_MINUTES);
    chrono::Duration::minutes(minutes)
}

/// One failed job in a batch report.
#[derive(Debug, Clone, Serialize)]
pub struct JobFailure {
    pub job_id: Uuid,
    pub style_id: String,
    pub provider: Provider,
    pub error: String,
}

/// Summary of one batch run.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<JobFailure>,
}

enum JobOutcome {
    Success,
    Failure(String),
}

pub struct BatchWorker {
    jobs: SyncJobRepository,
    catalog: CatalogRepository,
    backfill: MetadataBackfill,
    adapters: AdapterRegistry,
    pacer: Pacer,
    batch_limit: u64,
    job_timeout: Duration,
}

impl BatchWorker {
    pub fn new(db: DatabaseConnection, adapters: AdapterRegistry, config: &WorkerConfig) -> Self {
        Self {
            jobs: SyncJobRepository::new(db.clone()),
            catalog: CatalogRepository::new(db.clone()),
            backfill: MetadataBackfill::new(db),
            adapters,
            pacer: Pacer::from_millis(config.pacing_ms),
            batch_limit: config.batch_limit,
            job_timeout: Duration::from_secs(config.job_timeout_seconds),
        }
    }

    /// Replace the inter-job pacer. Tests use [`Pacer::none`].
    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    /// Claim and process one batch of eligible jobs. `limit` overrides the
    /// configured batch size; `provider` restricts the claim to one
    /// provider's jobs.
    #[instrument(skip(self), fields(provider = ?provider))]
    pub async fn process_batch(
        &self,
        limit: Option<u64>,
        provider: Option<Provider>,
    ) -> Result<BatchReport, SyncServiceError> {
        let limit = limit.unwrap_or(self.batch_limit);
        let claimed = self.jobs.claim_eligible(limit, provider).await?;
        if claimed.is_empty() {
            debug!("No eligible jobs");
            return Ok(BatchReport::default());
        }

        info!(claimed = claimed.len(), "Processing sync batch");
        let total = claimed.len();
        let mut report = BatchReport {
            processed: total,
            ..BatchReport::default()
        };

        for (idx, job) in claimed.into_iter().enumerate() {
            match self.run_job(&job).await? {
                JobOutcome::Success => {
                    report.successful += 1;
                    counter!("sync_jobs_completed_total", "provider" => job.provider.as_str())
                        .increment(1);
                }
                JobOutcome::Failure(error) => {
                    report.failed += 1;
                    counter!("sync_jobs_failed_total", "provider" => job.provider.as_str())
                        .increment(1);
                    report.errors.push(JobFailure {
                        job_id: job.id,
                        style_id: job.style_id.clone(),
                        provider: job.provider,
                        error,
                    });
                }
            }
            if idx + 1 < total {
                self.pacer.pause().await;
            }
        }

        info!(
            processed = report.processed,
            successful = report.successful,
            failed = report.failed,
            "Sync batch finished"
        );
        Ok(report)
    }

    /// Run one claimed job to a terminal or retry state. Infrastructure
    /// errors (our own database failing) propagate; provider failures are
    /// recorded on the job and reported in the batch outcome.
    #[instrument(skip(self, job), fields(job_id = %job.id, style_id = %job.style_id, provider = %job.provider))]
    async fn run_job(&self, job: &SyncJob) -> Result<JobOutcome, SyncServiceError> {
        let Some(style) = self.catalog.find_by_style_id(&job.style_id).await? else {
            // Permanent: the style was deleted after the job was enqueued.
            let message = format!("style {} no longer in catalog", job.style_id);
            warn!("{message}");
            self.jobs.mark_failed(job.id, &message).await?;
            return Ok(JobOutcome::Failure(message));
        };

        if job.provider == Provider::Alias && style.alias_catalog_id.is_none() {
            // Permanent: Alias has no search fallback, retrying cannot help.
            let message = format!("style {} has no alias catalog id", job.style_id);
            warn!("{message}");
            self.jobs.mark_failed(job.id, &message).await?;
            return Ok(JobOutcome::Failure(message));
        }

        let Some(adapter) = self.adapters.get(job.provider) else {
            return Err(SyncServiceError::AdapterNotRegistered {
                provider: job.provider.to_string(),
            });
        };

        let result = tokio::time::timeout(self.job_timeout, adapter.sync(&style)).await;
        let failure = match result {
            Err(_) => Some(format!(
                "provider call timed out after {}s",
                self.job_timeout.as_secs()
            )),
            Ok(Err(err)) => Some(err.to_string()),
            Ok(Ok(outcome)) if !outcome.success => Some(outcome.first_error().to_string()),
            Ok(Ok(outcome)) => {
                if !outcome.errors.is_empty() {
                    debug!(
                        variant_errors = outcome.errors.len(),
                        "Sync succeeded with partial variant errors"
                    );
                }
                None
            }
        };

        match failure {
            None => {
                // Backfill and the freshness stamp are best effort; a write
                // failure here must not fail an otherwise successful sync.
                if let Err(err) = self.backfill.run(&job.style_id, job.provider).await {
                    warn!(error = %err, "Metadata backfill failed");
                }
                if let Err(err) = self.catalog.touch_last_synced(&job.style_id).await {
                    warn!(error = %err, "Failed to stamp last_synced_at");
                }
                self.jobs.mark_completed(job.id).await?;
                Ok(JobOutcome::Success)
            }
            Some(message) => {
                self.record_failure(job, &message).await?;
                Ok(JobOutcome::Failure(message))
            }
        }
    }

    /// Transient failure path: schedule a retry unless the attempt budget
    /// is spent. `job.attempts` already reflects this attempt because the
    /// claim incremented it.
    async fn record_failure(&self, job: &SyncJob, message: &str) -> Result<(), SyncServiceError> {
        if job.attempts >= job.max_attempts {
            warn!(
                attempts = job.attempts,
                "Attempt budget exhausted, failing job"
            );
            self.jobs.mark_failed(job.id, message).await?;
        } else {
            let next_retry_at =
                (chrono::Utc::now() + backoff_delay(job.attempts)).fixed_offset();
            debug!(
                attempts = job.attempts,
                next_retry_at = %next_retry_at,
                "Scheduling retry"
            );
            self.jobs
                .mark_retrying(job.id, message, next_retry_at)
                .await?;
        }
        Ok(())
    }
}
