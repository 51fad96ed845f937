//! Adds a partial unique index preventing duplicate in-flight jobs.
//!
//! At most one pending or processing job may exist per (style, provider);
//! completed and failed rows remain as audit history.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{DatabaseBackend, Statement};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        match backend {
            DatabaseBackend::Postgres => manager
                .get_connection()
                .execute(Statement::from_string(
                    backend,
                    "DO $$\nBEGIN\n    IF NOT EXISTS (\n        SELECT 1 FROM pg_indexes\n        WHERE schemaname = current_schema()\n          AND indexname = 'idx_sync_jobs_active_unique'\n    ) THEN\n        CREATE UNIQUE INDEX idx_sync_jobs_active_unique\n            ON sync_jobs (style_id, provider)\n            WHERE status IN ('pending','processing');\n    END IF;\nEND\n$$;"
                        .to_string(),
                ))
                .await
                .map(|_| ()),
            _ => manager
                .get_connection()
                .execute(Statement::from_string(
                    backend,
                    "CREATE UNIQUE INDEX IF NOT EXISTS idx_sync_jobs_active_unique \
                     ON sync_jobs (style_id, provider) \
                     WHERE status IN ('pending','processing')"
                        .to_string(),
                ))
                .await
                .map(|_| ()),
        }
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute(Statement::from_string(
                manager.get_database_backend(),
                "DROP INDEX IF EXISTS idx_sync_jobs_active_unique",
            ))
            .await
            .map(|_| ())
    }
}
