//! # Provider Data Repository
//!
//! Existence checks against the provider-owned market data tables. The core
//! never interprets provider rows beyond "does at least one exist for this
//! style"; the tables themselves are mutated only by the sync adapters.

use std::collections::HashSet;

use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};

use crate::models::sync_job::Provider;
use crate::models::{alias_product, stockx_product};

/// Repository answering "has this provider ever synced data for this style".
#[derive(Clone)]
pub struct ProviderDataRepository {
    db: DatabaseConnection,
}

impl ProviderDataRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Does at least one provider data row exist for this style?
    pub async fn exists(&self, style_id: &str, provider: Provider) -> Result<bool, DbErr> {
        let count = match provider {
            Provider::Stockx => {
                stockx_product::Entity::find()
                    .filter(stockx_product::Column::StyleId.eq(style_id))
                    .count(&self.db)
                    .await?
            }
            Provider::Alias => {
                alias_product::Entity::find()
                    .filter(alias_product::Column::StyleId.eq(style_id))
                    .count(&self.db)
                    .await?
            }
        };
        Ok(count > 0)
    }

    /// Batched existence check: the subset of `style_ids` with at least one
    /// data row for `provider`, in one round trip.
    pub async fn exists_any(
        &self,
        style_ids: &[String],
        provider: Provider,
    ) -> Result<HashSet<String>, DbErr> {
        if style_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let rows = match provider {
            Provider::Stockx => {
                stockx_product::Entity::find()
                    .select_only()
                    .column(stockx_product::Column::StyleId)
                    .filter(stockx_product::Column::StyleId.is_in(style_ids.iter().cloned()))
                    .into_tuple::<String>()
                    .all(&self.db)
                    .await?
            }
            Provider::Alias => {
                alias_product::Entity::find()
                    .select_only()
                    .column(alias_product::Column::StyleId)
                    .filter(alias_product::Column::StyleId.is_in(style_ids.iter().cloned()))
                    .into_tuple::<String>()
                    .all(&self.db)
                    .await?
            }
        };

        Ok(rows.into_iter().collect())
    }
}
