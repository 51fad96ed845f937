//! Migration to create the alias_products table.
//!
//! Owned by the Alias sync adapter; the core only reads it for existence
//! checks and metadata backfill.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AliasProducts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AliasProducts::CatalogId)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AliasProducts::StyleId).text().not_null())
                    .col(ColumnDef::new(AliasProducts::Name).text().null())
                    .col(ColumnDef::new(AliasProducts::Brand).text().null())
                    .col(ColumnDef::new(AliasProducts::Category).text().null())
                    .col(
                        ColumnDef::new(AliasProducts::LowestPriceCents)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AliasProducts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(AliasProducts::UpdatedAt)
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
                    .name("idx_alias_products_style_id")
                    .table(AliasProducts::Table)
                    .col(AliasProducts::StyleId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_alias_products_style_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AliasProducts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AliasProducts {
    Table,
    CatalogId,
    StyleId,
    Name,
    Brand,
    Category,
    LowestPriceCents,
    CreatedAt,
    UpdatedAt,
}
