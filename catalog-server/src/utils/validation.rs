//! Input validation helpers
//!
//! Centralized text length constants and a rule collector. Every rule is a
//! named predicate with a message; all rules of a request are evaluated and
//! every failure is reported together.

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::error::CatalogError;

// ── Limits ──────────────────────────────────────────────────────────

/// Entity names: product, attribute
pub const MAX_NAME_LEN: usize = 200;

/// Attribute value labels (rendered on storefront chips)
pub const MAX_VALUE_LEN: usize = 100;

/// Variant SKU / product SKU prefix
pub const MAX_SKU_LEN: usize = 64;

/// Attributes per product (three axes keep the variant matrix browsable)
pub const MAX_ATTRIBUTES_PER_PRODUCT: usize = 3;

/// Values per attribute
pub const MAX_VALUES_PER_ATTRIBUTE: usize = 50;

/// Prices are stored as NUMERIC(12, 2)
pub const MAX_PRICE_SCALE: u32 = 2;

/// Largest value NUMERIC(12, 2) can hold
/// (999_999_999_999 × 10⁻², built with the const constructor)
pub const MAX_PRICE: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

// ── Rule collector ──────────────────────────────────────────────────

/// Single failed rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub rule: &'static str,
    pub message: String,
}

/// Eager rule evaluator
#[derive(Debug, Default)]
pub struct RuleSet {
    violations: Vec<Violation>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` under `rule` unless `ok` holds
    pub fn check(&mut self, rule: &'static str, ok: bool, message: impl FnOnce() -> String) -> &mut Self {
        if !ok {
            self.violations.push(Violation {
                rule,
                message: message(),
            });
        }
        self
    }

    /// Non-empty after trimming and within `max_len` characters
    pub fn required_text(&mut self, value: &str, field: &str, max_len: usize) -> &mut Self {
        let trimmed = value.trim();
        self.check("required_text", !trimmed.is_empty(), || {
            format!("{field} must not be empty")
        });
        let len = trimmed.chars().count();
        self.check("text_length", len <= max_len, || {
            format!("{field} is too long ({len} chars, max {max_len})")
        })
    }

    /// Within `max_len` characters when present
    pub fn optional_text(&mut self, value: Option<&str>, field: &str, max_len: usize) -> &mut Self {
        match value {
            Some(v) => {
                let len = v.trim().chars().count();
                self.check("text_length", len <= max_len, || {
                    format!("{field} is too long ({len} chars, max {max_len})")
                })
            }
            None => self,
        }
    }

    /// Price must be non-negative, at most [`MAX_PRICE`], with at most two decimal places
    pub fn price(&mut self, price: Decimal, field: &str) -> &mut Self {
        self.check("non_negative_price", !price.is_sign_negative() || price.is_zero(), || {
            format!("{field} must not be negative")
        });
        self.check("max_price", price <= MAX_PRICE, || {
            format!("{field} exceeds the maximum of {MAX_PRICE}")
        });
        self.check("price_scale", price.normalize().scale() <= MAX_PRICE_SCALE, || {
            format!("{field} has more than {MAX_PRICE_SCALE} decimal places")
        })
    }

    pub fn stock(&mut self, stock: i64, field: &str) -> &mut Self {
        self.check("non_negative_stock", stock >= 0, || {
            format!("{field} must not be negative")
        })
    }

    /// List operand must carry at least one item
    pub fn non_empty<T>(&mut self, items: &[T], field: &str) -> &mut Self {
        self.check("non_empty", !items.is_empty(), || {
            format!("{field} must not be empty")
        })
    }

    /// No id may appear twice in the same request
    pub fn unique_ids<I>(&mut self, ids: I, field: &str) -> &mut Self
    where
        I: IntoIterator<Item = i64>,
    {
        for id in duplicates(ids) {
            self.check("unique_ids", false, || format!("{field} contains duplicate id {id}"));
        }
        self
    }

    /// Labels must be unique once trimmed and case-folded
    pub fn unique_labels<'a, I>(&mut self, labels: I, field: &str) -> &mut Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for label in labels {
            let normalized = normalize_label(label);
            if !seen.insert(normalized.clone()) && reported.insert(normalized) {
                self.check("unique_values", false, || {
                    format!("{field} contains duplicate value '{}'", label.trim())
                });
            }
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// `Ok` when no rule failed, otherwise every message in one error
    pub fn finish(self) -> Result<(), CatalogError> {
        if self.violations.is_empty() {
            return Ok(());
        }
        Err(CatalogError::Validation(
            self.violations.into_iter().map(|v| v.message).collect(),
        ))
    }
}

/// Comparison form of an attribute value: trimmed, lowercased
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Ids occurring more than once, in first-repeat order
fn duplicates<I>(ids: I) -> Vec<i64>
where
    I: IntoIterator<Item = i64>,
{
    let mut seen = HashSet::new();
    let mut dupes = Vec::new();
    for id in ids {
        if !seen.insert(id) && !dupes.contains(&id) {
            dupes.push(id);
        }
    }
    dupes
}
