//! # SyncJob Repository
//!
//! Repository operations for the sync_jobs table: dedup-aware enqueue,
//! atomic claim-and-increment for concurrent batch workers, and single-row
//! conditional status updates.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::is_unique_violation;
use crate::models::sync_job::{ActiveModel, Column, Entity, JobStatus, Model, Provider};

/// Persisted failure messages are truncated to this many characters.
const MAX_ERROR_CHARS: usize = 500;

/// Grouped queue counts for operator dashboards, always zero-filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub pending: u64,
    pub processing: u64,
    pub completed: u64,
    pub failed: u64,
}

/// Repository for sync job database operations
#[derive(Clone)]
pub struct SyncJobRepository {
    db: DatabaseConnection,
}

impl SyncJobRepository {
    /// Create a new SyncJobRepository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Enqueue a sync job for (style, provider), deduplicated.
    ///
    /// Returns `None` without inserting when an equivalent pending or
    /// processing job already exists. A lost race against a concurrent
    /// enqueue surfaces as a unique violation of the active-job guard index
    /// and is folded into the same no-op result.
    pub async fn enqueue(
        &self,
        style_id: &str,
        provider: Provider,
        max_attempts: i32,
    ) -> Result<Option<Model>, DbErr> {
        let existing = Entity::find()
            .filter(Column::StyleId.eq(style_id))
            .filter(Column::Provider.eq(provider))
            .filter(Column::Status.is_in([JobStatus::Pending, JobStatus::Processing]))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            tracing::debug!(
                style_id = %style_id,
                provider = %provider,
                "Equivalent job already in flight, enqueue is a no-op"
            );
            return Ok(None);
        }

        let now = Utc::now().fixed_offset();
        let job = ActiveModel {
            id: Set(Uuid::new_v4()),
            style_id: Set(style_id.to_string()),
            provider: Set(provider),
            status: Set(JobStatus::Pending),
            attempts: Set(0),
            max_attempts: Set(max_attempts),
            last_attempt_at: Set(None),
            next_retry_at: Set(None),
            last_error: Set(None),
            created_at: Set(now),
            completed_at: Set(None),
        };

        match job.insert(&self.db).await {
            Ok(model) => {
                tracing::info!(
                    style_id = %model.style_id,
                    provider = %model.provider,
                    job_id = %model.id,
                    "Sync job enqueued"
                );
                Ok(Some(model))
            }
            Err(err) if is_unique_violation(&err) => {
                tracing::debug!(
                    style_id = %style_id,
                    provider = %provider,
                    "Lost enqueue race to a concurrent worker, treating as no-op"
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Atomically claim up to `limit` eligible jobs.
    ///
    /// Eligible means `status = pending` and `next_retry_at` is null or due.
    /// Candidates are flipped to processing one row at a time with a status
    /// double-check, and a row counts as ours only when its update reported
    /// exactly one affected row. Two overlapping batch runs therefore never
    /// claim the same job: the loser's update matches zero rows.
    pub async fn claim_eligible(
        &self,
        limit: u64,
        provider: Option<Provider>,
    ) -> Result<Vec<Model>, DbErr> {
        let now = Utc::now().fixed_offset();
        let txn = self.db.begin().await?;

        let mut query = Entity::find()
            .select_only()
            .column(Column::Id)
            .filter(Column::Status.eq(JobStatus::Pending))
            .filter(Column::NextRetryAt.is_null().or(Column::NextRetryAt.lte(now)));
        if let Some(provider) = provider {
            query = query.filter(Column::Provider.eq(provider));
        }

        let candidates = query
            .order_by_asc(Column::CreatedAt)
            .limit(Some(limit))
            .into_tuple::<Uuid>()
            .all(&txn)
            .await?;

        if candidates.is_empty() {
            txn.commit().await?;
            return Ok(Vec::new());
        }

        let mut owned = Vec::with_capacity(candidates.len());
        for id in candidates {
            let update = Entity::update_many()
                .col_expr(Column::Status, Expr::value(JobStatus::Processing))
                .col_expr(Column::LastAttemptAt, Expr::value(now))
                .col_expr(
                    Column::Attempts,
                    Expr::value(Expr::col(Column::Attempts).add(1)),
                )
                .filter(Column::Id.eq(id))
                .filter(Column::Status.eq(JobStatus::Pending)) // double-check it's still pending
                .exec(&txn)
                .await?;
            if update.rows_affected == 1 {
                owned.push(id);
            }
        }

        if owned.is_empty() {
            txn.commit().await?;
            return Ok(Vec::new());
        }

        let claimed = Entity::find()
            .filter(Column::Id.is_in(owned))
            .order_by_asc(Column::CreatedAt)
            .all(&txn)
            .await?;

        txn.commit().await?;
        Ok(claimed)
    }

    /// Mark a job successfully completed: clears the error, stamps completion.
    pub async fn mark_completed(&self, job_id: Uuid) -> Result<(), DbErr> {
        let now = Utc::now().fixed_offset();
        Entity::update_many()
            .col_expr(Column::Status, Expr::value(JobStatus::Completed))
            .col_expr(Column::CompletedAt, Expr::value(now))
            .col_expr(Column::LastError, Expr::value(Option::<String>::None))
            .col_expr(
                Column::NextRetryAt,
                Expr::value(Option::<chrono::DateTime<chrono::FixedOffset>>::None),
            )
            .filter(Column::Id.eq(job_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Return a failed job to pending with a retry time and recorded error.
    pub async fn mark_retrying(
        &self,
        job_id: Uuid,
        error: &str,
        next_retry_at: chrono::DateTime<chrono::FixedOffset>,
    ) -> Result<(), DbErr> {
        Entity::update_many()
            .col_expr(Column::Status, Expr::value(JobStatus::Pending))
            .col_expr(Column::NextRetryAt, Expr::value(next_retry_at))
            .col_expr(Column::LastError, Expr::value(truncate_error(error)))
            .filter(Column::Id.eq(job_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Mark a job terminally failed. `completed_at` records the moment the
    /// job became terminal, success or not.
    pub async fn mark_failed(&self, job_id: Uuid, error: &str) -> Result<(), DbErr> {
        let now = Utc::now().fixed_offset();
        Entity::update_many()
            .col_expr(Column::Status, Expr::value(JobStatus::Failed))
            .col_expr(Column::CompletedAt, Expr::value(now))
            .col_expr(Column::LastError, Expr::value(truncate_error(error)))
            .col_expr(
                Column::NextRetryAt,
                Expr::value(Option::<chrono::DateTime<chrono::FixedOffset>>::None),
            )
            .filter(Column::Id.eq(job_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// The authoritative (most recently created) job per provider for one style.
    pub async fn latest_per_provider(
        &self,
        style_id: &str,
    ) -> Result<HashMap<Provider, Model>, DbErr> {
        let jobs = Entity::find()
            .filter(Column::StyleId.eq(style_id))
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await?;

        let mut latest = HashMap::new();
        for job in jobs {
            latest.entry(job.provider).or_insert(job);
        }
        Ok(latest)
    }

    /// Batch form of [`latest_per_provider`]: one round trip for any number
    /// of styles.
    ///
    /// [`latest_per_provider`]: SyncJobRepository::latest_per_provider
    pub async fn latest_for_styles(
        &self,
        style_ids: &[String],
    ) -> Result<HashMap<(String, Provider), Model>, DbErr> {
        if style_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let jobs = Entity::find()
            .filter(Column::StyleId.is_in(style_ids.iter().cloned()))
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await?;

        let mut latest = HashMap::new();
        for job in jobs {
            latest
                .entry((job.style_id.clone(), job.provider))
                .or_insert(job);
        }
        Ok(latest)
    }

    /// Find a sync job by ID.
    pub async fn find_by_id(&self, job_id: Uuid) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(job_id).one(&self.db).await
    }

    /// Grouped count over the job store's current rows, zero-filled.
    pub async fn queue_stats(&self) -> Result<QueueStats, DbErr> {
        let rows = Entity::find()
            .select_only()
            .column(Column::Status)
            .column_as(Column::Id.count(), "count")
            .group_by(Column::Status)
            .into_tuple::<(JobStatus, i64)>()
            .all(&self.db)
            .await?;

        let mut stats = QueueStats::default();
        for (status, count) in rows {
            let count = count.max(0) as u64;
            match status {
                JobStatus::Pending => stats.pending = count,
                JobStatus::Processing => stats.processing = count,
                JobStatus::Completed => stats.completed = count,
                JobStatus::Failed => stats.failed = count,
            }
        }
        Ok(stats)
    }
}

/// Char-safe truncation of failure messages before persisting.
fn truncate_error(error: &str) -> String {
    if error.chars().count() > MAX_ERROR_CHARS {
        let truncated: String = error.chars().take(MAX_ERROR_CHARS).collect();
        format!("{}...", truncated)
    } else {
        error.to_string()
    }
}
