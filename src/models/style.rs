//! Style catalog entity model
//!
//! One row per product style/SKU, keyed by the canonical (uppercase) style
//! code. External identifiers and descriptive fields start null and are
//! backfilled over time, never overwritten once set.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "styles")]
pub struct Model {
    /// Canonical style code, e.g. "DD1391-100" (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub style_id: String,

    /// Display name
    pub name: Option<String>,

    pub brand: Option<String>,

    pub colorway: Option<String>,

    pub category: Option<String>,

    /// StockX product identifier, once resolved
    pub stockx_product_id: Option<String>,

    /// StockX url key, once resolved
    pub stockx_url_key: Option<String>,

    /// Alias/GOAT catalog identifier, once resolved
    pub alias_catalog_id: Option<String>,

    /// Last time any provider sync for this style completed
    pub last_synced_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
