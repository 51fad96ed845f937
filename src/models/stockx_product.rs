//! StockX product entity model
//!
//! Owned by the StockX sync adapter; the core reads it only for existence
//! checks and metadata backfill.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "stockx_products")]
pub struct Model {
    /// StockX product identifier (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: String,

    /// Canonical style code this product maps to
    pub style_id: String,

    pub url_key: Option<String>,

    pub title: Option<String>,

    pub brand: Option<String>,

    pub colorway: Option<String>,

    pub image_url: Option<String>,

    pub retail_price_cents: Option<i64>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stockx_variant::Entity")]
    Variants,
}

impl Related<super::stockx_variant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Variants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
