//! Alias/GOAT sync adapter
//!
//! Fetches a product by its pre-resolved Alias catalog identifier and
//! upserts it into the alias_products table. Unlike StockX there is no
//! SKU-search fallback: a style without a catalog id cannot be synced.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use serde::Deserialize;
use tracing::{debug, info};

use crate::models::alias_product;
use crate::models::style::Model as Style;
use crate::models::sync_job::Provider;

use super::{AdapterError, ProviderSyncAdapter, SyncOutcome, body_snippet, endpoint_url};

pub struct AliasAdapter {
    db: DatabaseConnection,
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AliasProductDto {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    lowest_price_cents: Option<i64>,
}

impl AliasAdapter {
    pub fn new(db: DatabaseConnection, api_base: String, api_key: Option<String>) -> Self {
        Self {
            db,
            http: reqwest::Client::new(),
            api_base,
            api_key,
        }
    }

    async fn fetch_product(&self, catalog_id: &str) -> Result<AliasProductDto, AdapterError> {
        let url = endpoint_url(&self.api_base, &["api", "v1", "products", catalog_id])?;

        let mut builder = self.http.get(url);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::Provider {
                status: status.as_u16(),
                message: body_snippet(&body),
            });
        }

        response
            .json::<AliasProductDto>()
            .await
            .map_err(|e| AdapterError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ProviderSyncAdapter for AliasAdapter {
    fn provider(&self) -> Provider {
        Provider::Alias
    }

    async fn sync(&self, style: &Style) -> Result<SyncOutcome, AdapterError> {
        let Some(catalog_id) = &style.alias_catalog_id else {
            // The worker guards this before dispatch; kept as a contract
            // check for direct callers.
            return Err(AdapterError::MissingIdentifier(format!(
                "style {} has no Alias catalog id",
                style.style_id
            )));
        };

        debug!(style_id = %style.style_id, catalog_id = %catalog_id, "Starting Alias sync");

        let product = self.fetch_product(catalog_id).await?;

        let now = Utc::now().fixed_offset();
        let active = alias_product::ActiveModel {
            catalog_id: Set(catalog_id.clone()),
            style_id: Set(style.style_id.clone()),
            name: Set(product.name),
            brand: Set(product.brand),
            category: Set(product.category),
            lowest_price_cents: Set(product.lowest_price_cents),
            created_at: Set(now),
            updated_at: Set(now),
        };

        alias_product::Entity::insert(active)
            .on_conflict(
                OnConflict::column(alias_product::Column::CatalogId)
                    .update_columns([
                        alias_product::Column::StyleId,
                        alias_product::Column::Name,
                        alias_product::Column::Brand,
                        alias_product::Column::Category,
                        alias_product::Column::LowestPriceCents,
                        alias_product::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        info!(
            style_id = %style.style_id,
            catalog_id = %catalog_id,
            "Alias sync completed"
        );

        Ok(SyncOutcome::ok())
    }
}
