//! Product Service - create and read products
//!
//! A new product has no attributes, so its combination space is the single
//! empty combination: it is created together with one base variant.

use std::sync::Arc;

use shared::models::{Product, ProductCreate};
use shared::util::{now_millis, snowflake_id};

use crate::convert::product_from_create;
use crate::db::CatalogStore;
use crate::error::{CatalogError, CatalogResult, Resource};
use crate::utils::validation::{MAX_NAME_LEN, MAX_SKU_LEN};
use crate::utils::RuleSet;

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn CatalogStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, payload: ProductCreate) -> CatalogResult<Product> {
        let mut rules = RuleSet::new();
        rules
            .required_text(&payload.name, "product name", MAX_NAME_LEN)
            .optional_text(payload.sku_prefix.as_deref(), "sku_prefix", MAX_SKU_LEN)
            .optional_text(payload.sku.as_deref(), "sku", MAX_SKU_LEN);
        if let Some(price) = payload.price {
            rules.price(price, "price");
        }
        if let Some(stock) = payload.stock {
            rules.stock(stock, "stock");
        }
        rules.finish()?;

        let product = product_from_create(&payload, snowflake_id(), now_millis());
        self.store.insert_product(&product).await?;

        tracing::info!(
            product_id = product.id,
            name = %product.name,
            "Product created"
        );
        Ok(product)
    }

    pub async fn get(&self, product_id: i64) -> CatalogResult<Product> {
        self.store
            .load_product(product_id)
            .await?
            .ok_or_else(|| CatalogError::not_found(Resource::Product, product_id))
    }
}
