//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::attribute::ProductAttribute;
use super::variant::ProductVariant;

/// Product entity with its attributes and variants
///
/// `min_price`, `max_price` and `total_stock` are derived from the active
/// variants and rewritten on every committed mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Prefix used when generating variant SKUs
    pub sku_prefix: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub total_stock: i64,
    /// Ordered by display_order, then id
    pub attributes: Vec<ProductAttribute>,
    /// Ordered by position
    pub variants: Vec<ProductVariant>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Product-level statistics over active variants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAggregates {
    /// `None` when the product has no active variant
    pub min_price: Option<Decimal>,
    /// `None` when the product has no active variant
    pub max_price: Option<Decimal>,
    pub total_stock: i64,
}

/// Create product payload
///
/// A new product has no attributes and a single base variant carrying
/// `price` / `stock`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub sku_prefix: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
    pub sku: Option<String>,
}
