//! Metadata backfill
//!
//! After a provider sync lands, copy descriptive fields from the freshly
//! written provider rows into any still-null catalog columns. Fill-only:
//! user-entered metadata is never overwritten, and backfill failure never
//! fails the job that triggered it.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

use crate::models::sync_job::Provider;
use crate::models::{alias_product, stockx_product};
use crate::repositories::{CatalogRepository, MetadataSource};

pub struct MetadataBackfill {
    db: DatabaseConnection,
    catalog: CatalogRepository,
}

impl MetadataBackfill {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            catalog: CatalogRepository::new(db.clone()),
            db,
        }
    }

    /// Fill null catalog fields for `style_id` from the given provider's
    /// data. Returns whether anything changed.
    pub async fn run(&self, style_id: &str, provider: Provider) -> Result<bool, DbErr> {
        let source = match provider {
            Provider::Stockx => self.stockx_source(style_id).await?,
            Provider::Alias => self.alias_source(style_id).await?,
        };
        let Some(source) = source else {
            return Ok(false);
        };
        if source.is_empty() {
            return Ok(false);
        }
        self.catalog.backfill_metadata(style_id, source).await
    }

    async fn stockx_source(&self, style_id: &str) -> Result<Option<MetadataSource>, DbErr> {
        let product = stockx_product::Entity::find()
            .filter(stockx_product::Column::StyleId.eq(style_id))
            .one(&self.db)
            .await?;
        Ok(product.map(|p| MetadataSource {
            name: p.title,
            brand: p.brand,
            colorway: p.colorway,
            category: None,
        }))
    }

    async fn alias_source(&self, style_id: &str) -> Result<Option<MetadataSource>, DbErr> {
        let product = alias_product::Entity::find()
            .filter(alias_product::Column::StyleId.eq(style_id))
            .one(&self.db)
            .await?;
        Ok(product.map(|p| MetadataSource {
            name: p.name,
            brand: p.brand,
            colorway: None,
            category: p.category,
        }))
    }
}
