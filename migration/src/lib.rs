//! Database migrations for the soletrack sync service.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2025_05_10_000001_create_styles;
mod m2025_05_10_000002_create_sync_jobs;
mod m2025_05_10_000003_create_stockx_tables;
mod m2025_05_10_000004_create_alias_products;
mod m2025_05_18_000100_add_sync_job_active_unique_guard;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_05_10_000001_create_styles::Migration),
            Box::new(m2025_05_10_000002_create_sync_jobs::Migration),
            Box::new(m2025_05_10_000003_create_stockx_tables::Migration),
            Box::new(m2025_05_10_000004_create_alias_products::Migration),
            Box::new(m2025_05_18_000100_add_sync_job_active_unique_guard::Migration),
        ]
    }
}
