//! Product aggregate recalculation
//!
//! Price bounds and total stock are computed over active variants only.
//! Inactive variants contribute to neither.

use rust_decimal::Decimal;
use shared::models::{ProductAggregates, ProductVariant};

/// Recompute min/max price and total stock over active variants
pub fn recalculate<'a, I>(variants: I) -> ProductAggregates
where
    I: IntoIterator<Item = &'a ProductVariant>,
{
    let mut min_price: Option<Decimal> = None;
    let mut max_price: Option<Decimal> = None;
    let mut total_stock: i64 = 0;

    for variant in variants.into_iter().filter(|v| v.is_active) {
        min_price = Some(min_price.map_or(variant.price, |m| m.min(variant.price)));
        max_price = Some(max_price.map_or(variant.price, |m| m.max(variant.price)));
        total_stock = total_stock.saturating_add(variant.stock);
    }

    ProductAggregates {
        min_price,
        max_price,
        total_stock,
    }
}
