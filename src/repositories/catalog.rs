//! # Catalog Repository
//!
//! Repository operations for the styles table: lookups by canonical style
//! id (single and batch), fill-null-only metadata backfill, and external-id
//! write-back.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};

use crate::models::style::{ActiveModel, Column, Entity, Model};

/// Descriptive fields offered to the catalog by a freshly synced provider row.
#[derive(Debug, Clone, Default)]
pub struct MetadataSource {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub colorway: Option<String>,
    pub category: Option<String>,
}

impl MetadataSource {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.brand.is_none()
            && self.colorway.is_none()
            && self.category.is_none()
    }
}

/// Repository for style catalog database operations
#[derive(Clone)]
pub struct CatalogRepository {
    db: DatabaseConnection,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a style by its canonical id.
    pub async fn find_by_style_id(&self, style_id: &str) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(style_id.to_string()).one(&self.db).await
    }

    /// Batch lookup: one round trip for any number of styles.
    pub async fn find_many(&self, style_ids: &[String]) -> Result<HashMap<String, Model>, DbErr> {
        if style_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Entity::find()
            .filter(Column::StyleId.is_in(style_ids.iter().cloned()))
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|model| (model.style_id.clone(), model))
            .collect())
    }

    /// Fill currently-null descriptive fields from provider data.
    ///
    /// Never overwrites a non-null catalog value. Returns whether any field
    /// was written.
    pub async fn backfill_metadata(
        &self,
        style_id: &str,
        source: MetadataSource,
    ) -> Result<bool, DbErr> {
        let Some(style) = self.find_by_style_id(style_id).await? else {
            return Ok(false);
        };

        let mut active: ActiveModel = style.clone().into();
        let mut changed = false;

        if style.name.is_none() {
            if let Some(name) = source.name {
                active.name = Set(Some(name));
                changed = true;
            }
        }
        if style.brand.is_none() {
            if let Some(brand) = source.brand {
                active.brand = Set(Some(brand));
                changed = true;
            }
        }
        if style.colorway.is_none() {
            if let Some(colorway) = source.colorway {
                active.colorway = Set(Some(colorway));
                changed = true;
            }
        }
        if style.category.is_none() {
            if let Some(category) = source.category {
                active.category = Set(Some(category));
                changed = true;
            }
        }

        if changed {
            active.updated_at = Set(Utc::now().fixed_offset());
            active.update(&self.db).await?;
            tracing::debug!(style_id = %style_id, "Backfilled catalog metadata");
        }

        Ok(changed)
    }

    /// Write back StockX identifiers discovered by the SKU-search fallback.
    ///
    /// Fill-null-only, same as descriptive metadata.
    pub async fn set_stockx_ids(
        &self,
        style_id: &str,
        product_id: Option<String>,
        url_key: Option<String>,
    ) -> Result<(), DbErr> {
        let Some(style) = self.find_by_style_id(style_id).await? else {
            return Ok(());
        };

        let mut active: ActiveModel = style.clone().into();
        let mut changed = false;

        if style.stockx_product_id.is_none() {
            if let Some(product_id) = product_id {
                active.stockx_product_id = Set(Some(product_id));
                changed = true;
            }
        }
        if style.stockx_url_key.is_none() {
            if let Some(url_key) = url_key {
                active.stockx_url_key = Set(Some(url_key));
                changed = true;
            }
        }

        if changed {
            active.updated_at = Set(Utc::now().fixed_offset());
            active.update(&self.db).await?;
        }

        Ok(())
    }

    /// Stamp the style's last successful sync time.
    pub async fn touch_last_synced(&self, style_id: &str) -> Result<(), DbErr> {
        let Some(style) = self.find_by_style_id(style_id).await? else {
            return Ok(());
        };

        let now = Utc::now().fixed_offset();
        let mut active: ActiveModel = style.into();
        active.last_synced_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.db).await?;
        Ok(())
    }
}
