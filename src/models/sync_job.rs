//! SyncJob entity model
//!
//! SeaORM entity for the sync_jobs table: one row per (style, provider) unit
//! of work. Historical rows are kept for audit; the most recent row per
//! (style, provider) is authoritative for status derivation.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Marketplace data source a job syncs from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    #[sea_orm(string_value = "stockx")]
    Stockx,
    #[sea_orm(string_value = "alias")]
    Alias,
}

impl Provider {
    /// All providers, in the order the retry controller considers them.
    pub const ALL: [Provider; 2] = [Provider::Stockx, Provider::Alias];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Stockx => "stockx",
            Provider::Alias => "alias",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stockx" => Ok(Provider::Stockx),
            "alias" | "goat" => Ok(Provider::Alias),
            other => Err(format!("unknown provider '{other}'")),
        }
    }
}

/// Lifecycle status of a sync job.
///
/// Transitions are exactly `pending -> processing -> {completed | pending
/// (retry, attempts incremented) | failed}`; completed and failed are
/// terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SyncJob entity representing one (style, provider) unit of sync work
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sync_jobs")]
pub struct Model {
    /// Unique identifier for the sync job (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Canonical style identifier this job syncs
    pub style_id: String,

    /// Provider this job fetches from
    pub provider: Provider,

    /// Current lifecycle status
    pub status: JobStatus,

    /// Number of attempts made (incremented atomically at claim time)
    pub attempts: i32,

    /// Attempt ceiling; reaching it on a failed run makes the job terminal
    pub max_attempts: i32,

    /// Timestamp of the most recent claim
    pub last_attempt_at: Option<DateTimeWithTimeZone>,

    /// Earliest time the job is eligible again; null means immediately
    pub next_retry_at: Option<DateTimeWithTimeZone>,

    /// Most recent failure message, truncated
    pub last_error: Option<String>,

    /// Timestamp when the sync job was created
    pub created_at: DateTimeWithTimeZone,

    /// Terminal timestamp: success, or the moment retries were exhausted
    pub completed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
