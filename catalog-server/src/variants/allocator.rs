//! Id and SKU allocation for rows created during one mutation

use std::collections::HashSet;

use shared::models::Product;
use shared::util::snowflake_id;

use crate::utils::validation::MAX_SKU_LEN;

/// Snowflake ids, unique within the batch and against the product's ids
#[derive(Debug, Default)]
pub struct IdAllocator {
    used: HashSet<i64>,
}

impl IdAllocator {
    pub fn for_product(product: &Product) -> Self {
        let mut used = HashSet::new();
        used.insert(product.id);
        for attribute in &product.attributes {
            used.insert(attribute.id);
            used.extend(attribute.values.iter().map(|v| v.id));
        }
        for variant in &product.variants {
            used.insert(variant.id);
            used.extend(variant.media.iter().map(|m| m.id));
        }
        Self { used }
    }

    pub fn next_id(&mut self) -> i64 {
        loop {
            let id = snowflake_id();
            if self.used.insert(id) {
                return id;
            }
        }
    }
}

/// Generated SKUs, unique (case-insensitively) within one product
#[derive(Debug)]
pub struct SkuAllocator {
    prefix: String,
    taken: HashSet<String>,
}

impl SkuAllocator {
    /// `taken` should hold every SKU the product keeps after the mutation
    pub fn new<'a, I>(product: &Product, taken: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let prefix = match product.sku_prefix.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => sku_segment(p),
            _ => format!("P{}", product.id),
        };
        Self {
            prefix,
            taken: taken.into_iter().map(str::to_uppercase).collect(),
        }
    }

    /// Reserve a caller-supplied SKU so generated ones avoid it
    pub fn reserve(&mut self, sku: &str) {
        self.taken.insert(sku.to_uppercase());
    }

    /// `PREFIX-LABEL-LABEL`, suffixed `-2`, `-3`, ... on collision
    pub fn generate(&mut self, labels: &[String]) -> String {
        let mut base = self.prefix.clone();
        for label in labels {
            let segment = sku_segment(label);
            if !segment.is_empty() {
                base.push('-');
                base.push_str(&segment);
            }
        }
        let base = truncate(&base, MAX_SKU_LEN);

        if self.taken.insert(base.to_uppercase()) {
            return base;
        }
        let mut n = 2u32;
        loop {
            let suffix = format!("-{n}");
            let candidate = format!("{}{suffix}", truncate(&base, MAX_SKU_LEN - suffix.len()));
            if self.taken.insert(candidate.to_uppercase()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Uppercase alphanumerics, other runs collapsed to one `_`
fn sku_segment(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut pending_sep = false;
    for c in label.trim().chars() {
        if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(c.to_uppercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
