//! Migration to create the styles table.
//!
//! One row per product style/SKU. The style id is the canonical join key
//! across providers; descriptive fields and external identifiers start null
//! and are backfilled over time.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Styles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Styles::StyleId)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Styles::Name).text().null())
                    .col(ColumnDef::new(Styles::Brand).text().null())
                    .col(ColumnDef::new(Styles::Colorway).text().null())
                    .col(ColumnDef::new(Styles::Category).text().null())
                    .col(ColumnDef::new(Styles::StockxProductId).text().null())
                    .col(ColumnDef::new(Styles::StockxUrlKey).text().null())
                    .col(ColumnDef::new(Styles::AliasCatalogId).text().null())
                    .col(
                        ColumnDef::new(Styles::LastSyncedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Styles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Styles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Lookups by external id when adapters write back resolved identifiers
        manager
            .create_index(
                Index::create()
                    .name("idx_styles_stockx_product_id")
                    .table(Styles::Table)
                    .col(Styles::StockxProductId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_styles_alias_catalog_id")
                    .table(Styles::Table)
                    .col(Styles::AliasCatalogId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_styles_stockx_product_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_styles_alias_catalog_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Styles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Styles {
    Table,
    StyleId,
    Name,
    Brand,
    Colorway,
    Category,
    StockxProductId,
    StockxUrlKey,
    AliasCatalogId,
    LastSyncedAt,
    CreatedAt,
    UpdatedAt,
}
