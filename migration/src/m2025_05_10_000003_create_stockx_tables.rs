//! Migration to create the StockX product and variant tables.
//!
//! These tables are owned by the StockX sync adapter; the core only reads
//! them for existence checks and metadata backfill.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StockxProducts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StockxProducts::ProductId)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StockxProducts::StyleId).text().not_null())
                    .col(ColumnDef::new(StockxProducts::UrlKey).text().null())
                    .col(ColumnDef::new(StockxProducts::Title).text().null())
                    .col(ColumnDef::new(StockxProducts::Brand).text().null())
                    .col(ColumnDef::new(StockxProducts::Colorway).text().null())
                    .col(ColumnDef::new(StockxProducts::ImageUrl).text().null())
                    .col(
                        ColumnDef::new(StockxProducts::RetailPriceCents)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StockxProducts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(StockxProducts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stockx_products_style_id")
                    .table(StockxProducts::Table)
                    .col(StockxProducts::StyleId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StockxVariants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StockxVariants::VariantId)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StockxVariants::ProductId).text().not_null())
                    .col(ColumnDef::new(StockxVariants::Size).text().null())
                    .col(
                        ColumnDef::new(StockxVariants::LowestAskCents)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StockxVariants::HighestBidCents)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StockxVariants::LastSaleCents)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StockxVariants::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stockx_variants_product_id")
                            .from(StockxVariants::Table, StockxVariants::ProductId)
                            .to(StockxProducts::Table, StockxProducts::ProductId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stockx_variants_product_id")
                    .table(StockxVariants::Table)
                    .col(StockxVariants::ProductId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_stockx_variants_product_id")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(StockxVariants::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_stockx_products_style_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(StockxProducts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum StockxProducts {
    Table,
    ProductId,
    StyleId,
    UrlKey,
    Title,
    Brand,
    Colorway,
    ImageUrl,
    RetailPriceCents,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StockxVariants {
    Table,
    VariantId,
    ProductId,
    Size,
    LowestAskCents,
    HighestBidCents,
    LastSaleCents,
    UpdatedAt,
}
