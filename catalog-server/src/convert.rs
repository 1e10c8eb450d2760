//! Payload to entity conversions
//!
//! The product id and timestamp are passed in; child row ids are minted here.

use rust_decimal::Decimal;
use shared::models::{Product, ProductCreate, ProductVariant};
use shared::util::snowflake_id;

use crate::variants::allocator::SkuAllocator;
use crate::variants::recalculate;

/// New product with its base variant, aggregates filled in
pub fn product_from_create(payload: &ProductCreate, id: i64, now: i64) -> Product {
    let sku_prefix = payload
        .sku_prefix
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    let mut product = Product {
        id,
        name: payload.name.trim().to_string(),
        sku_prefix,
        min_price: None,
        max_price: None,
        total_stock: 0,
        attributes: Vec::new(),
        variants: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    let sku = match payload.sku.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(sku) => sku.to_string(),
        None => SkuAllocator::new(&product, []).generate(&[]),
    };
    let base = base_variant(&product, sku, payload);
    product.variants.push(base);

    let aggregates = recalculate(&product.variants);
    product.min_price = aggregates.min_price;
    product.max_price = aggregates.max_price;
    product.total_stock = aggregates.total_stock;
    product
}

/// Variant of the empty combination
fn base_variant(product: &Product, sku: String, payload: &ProductCreate) -> ProductVariant {
    let mut id = snowflake_id();
    while id == product.id {
        id = snowflake_id();
    }
    ProductVariant {
        id,
        product_id: product.id,
        value_ids: Vec::new(),
        sku: Some(sku),
        price: payload.price.unwrap_or(Decimal::ZERO),
        stock: payload.stock.unwrap_or(0),
        is_active: true,
        position: 0,
        media: Vec::new(),
    }
}
