//! StockX sync adapter
//!
//! Fetches product and per-size market data from the StockX catalog API and
//! upserts it into the stockx_products / stockx_variants tables. A style
//! with no resolved product id is looked up by SKU search first, and any
//! identifiers discovered that way are written back to the catalog
//! (fill-null-only).

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::models::style::Model as Style;
use crate::models::sync_job::Provider;
use crate::models::{stockx_product, stockx_variant};
use crate::repositories::CatalogRepository;

use super::{
    AdapterError, ProviderSyncAdapter, SyncOutcome, VariantError, body_snippet, endpoint_url,
};

pub struct StockxAdapter {
    db: DatabaseConnection,
    catalog: CatalogRepository,
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    products: Vec<ProductDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductDto {
    product_id: String,
    #[serde(default)]
    style_id: Option<String>,
    #[serde(default)]
    url_key: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    colorway: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    retail_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MarketResponse {
    #[serde(default)]
    variants: Vec<VariantDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantDto {
    #[serde(default)]
    variant_id: Option<String>,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    lowest_ask: Option<f64>,
    #[serde(default)]
    highest_bid: Option<f64>,
    #[serde(default)]
    last_sale: Option<f64>,
}

fn dollars_to_cents(amount: Option<f64>) -> Option<i64> {
    amount.map(|a| (a * 100.0).round() as i64)
}

impl StockxAdapter {
    pub fn new(db: DatabaseConnection, api_base: String, api_key: Option<String>) -> Self {
        Self {
            catalog: CatalogRepository::new(db.clone()),
            db,
            http: reqwest::Client::new(),
            api_base,
            api_key,
        }
    }

    fn request(&self, url: Url) -> reqwest::RequestBuilder {
        let mut builder = self.http.get(url);
        if let Some(key) = &self.api_key {
            builder = builder.header("x-api-key", key);
        }
        builder
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, AdapterError> {
        let response = self.request(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::Provider {
                status: status.as_u16(),
                message: body_snippet(&body),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| AdapterError::Decode(e.to_string()))
    }

    /// Resolve the StockX product for a style, searching by SKU when no
    /// product id has been resolved yet.
    async fn resolve_product(&self, style: &Style) -> Result<Option<ProductDto>, AdapterError> {
        let mut url = endpoint_url(&self.api_base, &["v2", "catalog", "search"])?;
        url.query_pairs_mut().append_pair("query", &style.style_id);
        let search: SearchResponse = self.get_json(url).await?;

        if let Some(known_id) = &style.stockx_product_id {
            if let Some(idx) = search
                .products
                .iter()
                .position(|p| &p.product_id == known_id)
            {
                return Ok(search.products.into_iter().nth(idx));
            }
        }

        // Prefer an exact style match, fall back to the top hit.
        let exact = search
            .products
            .iter()
            .position(|p| {
                p.style_id
                    .as_deref()
                    .map(|s| s.eq_ignore_ascii_case(&style.style_id))
                    .unwrap_or(false)
            })
            .unwrap_or(0);
        Ok(search.products.into_iter().nth(exact))
    }

    async fn upsert_product(&self, style: &Style, product: &ProductDto) -> Result<(), AdapterError> {
        let now = Utc::now().fixed_offset();
        let active = stockx_product::ActiveModel {
            product_id: Set(product.product_id.clone()),
            style_id: Set(style.style_id.clone()),
            url_key: Set(product.url_key.clone()),
            title: Set(product.title.clone()),
            brand: Set(product.brand.clone()),
            colorway: Set(product.colorway.clone()),
            image_url: Set(product.image_url.clone()),
            retail_price_cents: Set(dollars_to_cents(product.retail_price)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        stockx_product::Entity::insert(active)
            .on_conflict(
                OnConflict::column(stockx_product::Column::ProductId)
                    .update_columns([
                        stockx_product::Column::StyleId,
                        stockx_product::Column::UrlKey,
                        stockx_product::Column::Title,
                        stockx_product::Column::Brand,
                        stockx_product::Column::Colorway,
                        stockx_product::Column::ImageUrl,
                        stockx_product::Column::RetailPriceCents,
                        stockx_product::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn upsert_variants(
        &self,
        product_id: &str,
        variants: Vec<VariantDto>,
    ) -> Result<Vec<VariantError>, AdapterError> {
        let now = Utc::now().fixed_offset();
        let mut errors = Vec::new();

        for variant in variants {
            let Some(variant_id) = variant.variant_id else {
                errors.push(VariantError {
                    error: "variant without id in market response".to_string(),
                    size: variant.size.clone(),
                    variant_id: None,
                });
                continue;
            };

            let active = stockx_variant::ActiveModel {
                variant_id: Set(variant_id),
                product_id: Set(product_id.to_string()),
                size: Set(variant.size),
                lowest_ask_cents: Set(dollars_to_cents(variant.lowest_ask)),
                highest_bid_cents: Set(dollars_to_cents(variant.highest_bid)),
                last_sale_cents: Set(dollars_to_cents(variant.last_sale)),
                updated_at: Set(now),
            };

            stockx_variant::Entity::insert(active)
                .on_conflict(
                    OnConflict::column(stockx_variant::Column::VariantId)
                        .update_columns([
                            stockx_variant::Column::ProductId,
                            stockx_variant::Column::Size,
                            stockx_variant::Column::LowestAskCents,
                            stockx_variant::Column::HighestBidCents,
                            stockx_variant::Column::LastSaleCents,
                            stockx_variant::Column::UpdatedAt,
                        ])
                        .to_owned(),
                )
                .exec(&self.db)
                .await?;
        }

        Ok(errors)
    }
}

#[async_trait]
impl ProviderSyncAdapter for StockxAdapter {
    fn provider(&self) -> Provider {
        Provider::Stockx
    }

    async fn sync(&self, style: &Style) -> Result<SyncOutcome, AdapterError> {
        debug!(style_id = %style.style_id, "Starting StockX sync");

        let Some(product) = self.resolve_product(style).await? else {
            return Ok(SyncOutcome::failed(format!(
                "no StockX product found for SKU {}",
                style.style_id
            )));
        };

        self.upsert_product(style, &product).await?;

        let market_url = endpoint_url(
            &self.api_base,
            &["v2", "catalog", "products", &product.product_id, "market"],
        )?;
        let market: MarketResponse = self.get_json(market_url).await?;
        let variant_errors = self.upsert_variants(&product.product_id, market.variants).await?;

        // Write discovered identifiers back to the catalog so later syncs
        // skip the search step. Best-effort: the market data is already in.
        if let Err(err) = self
            .catalog
            .set_stockx_ids(
                &style.style_id,
                Some(product.product_id.clone()),
                product.url_key.clone(),
            )
            .await
        {
            warn!(style_id = %style.style_id, error = %err, "Failed to write back StockX ids");
        }

        info!(
            style_id = %style.style_id,
            product_id = %product.product_id,
            variant_errors = variant_errors.len(),
            "StockX sync completed"
        );

        Ok(SyncOutcome {
            success: true,
            errors: variant_errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dollars_convert_to_cents() {
        assert_eq!(dollars_to_cents(Some(129.99)), Some(12_999));
        assert_eq!(dollars_to_cents(Some(0.0)), Some(0));
        assert_eq!(dollars_to_cents(None), None);
    }
}
