//! # Repository Layer
//!
//! Repository implementations that encapsulate SeaORM operations for
//! database entities. Each repository is constructed with an explicit
//! database handle so tests can substitute their own connections.

pub mod catalog;
pub mod provider_data;
pub mod sync_job;

pub use catalog::{CatalogRepository, MetadataSource};
pub use provider_data::ProviderDataRepository;
pub use sync_job::{QueueStats, SyncJobRepository};
