//! Product Variant Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Media attached to a variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct VariantMedia {
    pub id: i64,
    pub url: String,
    pub position: i32,
}

/// Sellable variant, one per attribute-value combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: i64,
    pub product_id: i64,
    /// One value id per attribute, in attribute order
    pub value_ids: Vec<i64>,
    pub sku: Option<String>,
    pub price: Decimal,
    pub stock: i64,
    pub is_active: bool,
    /// Presentation order, follows combination order
    pub position: i32,
    pub media: Vec<VariantMedia>,
}

/// Caller-supplied values for a combination that is about to be created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantDraft {
    pub value_ids: Vec<i64>,
    pub price: Decimal,
    pub stock: i64,
    pub sku: Option<String>,
}

/// Direct update of a single variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantUpdate {
    pub id: i64,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
    pub sku: Option<String>,
    pub is_active: Option<bool>,
}

/// Bulk variant update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantsBulkUpdate {
    pub variants: Vec<VariantUpdate>,
}

/// Bulk variant delete payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantsDelete {
    pub variant_ids: Vec<i64>,
}
