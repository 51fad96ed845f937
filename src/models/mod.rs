//! # Data Models
//!
//! SeaORM entity models for the soletrack sync service.

use serde::{Deserialize, Serialize};

pub mod alias_product;
pub mod stockx_product;
pub mod stockx_variant;
pub mod style;
pub mod sync_job;

pub use alias_product::Entity as AliasProduct;
pub use stockx_product::Entity as StockxProduct;
pub use stockx_variant::Entity as StockxVariant;
pub use style::Entity as Style;
pub use sync_job::Entity as SyncJob;
pub use sync_job::{JobStatus, Provider};

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "soletrack".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
