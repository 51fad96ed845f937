//! StockX variant entity model
//!
//! Per-size market data for a StockX product.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

use super::stockx_product::Entity as StockxProduct;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "stockx_variants")]
pub struct Model {
    /// StockX variant identifier (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub variant_id: String,

    pub product_id: String,

    /// Size label, e.g. "US 10"
    pub size: Option<String>,

    pub lowest_ask_cents: Option<i64>,

    pub highest_bid_cents: Option<i64>,

    pub last_sale_cents: Option<i64>,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "StockxProduct",
        from = "Column::ProductId",
        to = "super::stockx_product::Column::ProductId"
    )]
    Product,
}

impl Related<StockxProduct> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
