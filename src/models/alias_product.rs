//! Alias/GOAT product entity model
//!
//! Owned by the Alias sync adapter; the core reads it only for existence
//! checks and metadata backfill.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "alias_products")]
pub struct Model {
    /// Alias catalog identifier (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub catalog_id: String,

    /// Canonical style code this product maps to
    pub style_id: String,

    pub name: Option<String>,

    pub brand: Option<String>,

    pub category: Option<String>,

    pub lowest_price_cents: Option<i64>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
