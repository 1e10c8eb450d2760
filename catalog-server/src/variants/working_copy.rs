//! Mutable copy of a product used while planning one mutation
//!
//! Edits are applied here first and recorded as a delta. Finishing the copy
//! regenerates the combination space (or not, for direct variant edits),
//! recomputes aggregates and yields the [`ChangeSet`] to commit plus the
//! [`MutationResult`] to return. Nothing touches the store until then.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use shared::models::{
    AttributeValueInput, MutationKind, MutationResult, Product, ProductAttribute,
    ProductAttributeValue, ProductVariant, VariantDraft,
};
use shared::util::now_millis;

use super::aggregate::recalculate;
use super::allocator::{IdAllocator, SkuAllocator};
use super::combination::{generate, value_sets, CombinationKey};
use super::reconciler::reconcile;
use crate::db::ChangeSet;
use crate::error::{CatalogError, CatalogResult};
use crate::utils::validation::normalize_label;
use crate::utils::RuleSet;

/// Commit payload and caller-facing result of a planned mutation
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    pub changes: ChangeSet,
    pub result: MutationResult,
}

#[derive(Debug)]
pub struct WorkingCopy {
    kind: MutationKind,
    product: Product,
    ids: IdAllocator,
    attributes_added: Vec<i64>,
    attributes_updated: Vec<i64>,
    attributes_removed: Vec<i64>,
    values_added: Vec<i64>,
    values_updated: Vec<i64>,
    values_removed: Vec<i64>,
    variants_updated: Vec<i64>,
    variants_removed: Vec<i64>,
}

impl WorkingCopy {
    pub fn new(kind: MutationKind, product: Product) -> Self {
        Self {
            kind,
            ids: IdAllocator::for_product(&product),
            product,
            attributes_added: Vec::new(),
            attributes_updated: Vec::new(),
            attributes_removed: Vec::new(),
            values_added: Vec::new(),
            values_updated: Vec::new(),
            values_removed: Vec::new(),
            variants_updated: Vec::new(),
            variants_removed: Vec::new(),
        }
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn attribute(&self, id: i64) -> Option<&ProductAttribute> {
        self.product.attributes.iter().find(|a| a.id == id)
    }

    // ========================================================================
    // Attribute edits
    // ========================================================================

    /// Append a new attribute with its values, returning its id
    pub fn add_attribute(
        &mut self,
        name: &str,
        display_order: Option<i32>,
        values: &[AttributeValueInput],
    ) -> i64 {
        let id = self.ids.next_id();
        let display_order = display_order.unwrap_or_else(|| {
            self.product
                .attributes
                .iter()
                .map(|a| a.display_order.saturating_add(1))
                .max()
                .unwrap_or(0)
        });
        let values = self.build_values(id, 0, values);
        self.product.attributes.push(ProductAttribute {
            id,
            product_id: self.product.id,
            name: name.trim().to_string(),
            display_order,
            values,
        });
        self.attributes_added.push(id);
        id
    }

    /// Append values to an existing attribute
    pub fn add_values(&mut self, attribute_id: i64, values: &[AttributeValueInput]) {
        let Some(next_order) = self
            .attribute(attribute_id)
            .map(|a| a.values.iter().map(|v| v.display_order.saturating_add(1)).max().unwrap_or(0))
        else {
            return;
        };
        let built = self.build_values(attribute_id, next_order, values);
        self.values_added.extend(built.iter().map(|v| v.id));
        if let Some(attribute) = self.attribute_mut(attribute_id) {
            attribute.values.extend(built);
        }
    }

    fn build_values(
        &mut self,
        attribute_id: i64,
        mut next_order: i32,
        inputs: &[AttributeValueInput],
    ) -> Vec<ProductAttributeValue> {
        inputs
            .iter()
            .map(|input| {
                let display_order = input.display_order.unwrap_or(next_order);
                next_order = next_order.max(display_order.saturating_add(1));
                ProductAttributeValue {
                    id: self.ids.next_id(),
                    attribute_id,
                    value: input.value.trim().to_string(),
                    display_order,
                }
            })
            .collect()
    }

    pub fn update_attribute(&mut self, id: i64, name: Option<&str>, display_order: Option<i32>) {
        let Some(attribute) = self.attribute_mut(id) else {
            return;
        };
        if let Some(name) = name {
            attribute.name = name.trim().to_string();
        }
        if let Some(order) = display_order {
            attribute.display_order = order;
        }
        if !self.attributes_updated.contains(&id) {
            self.attributes_updated.push(id);
        }
    }

    pub fn update_value(&mut self, id: i64, value: Option<&str>, display_order: Option<i32>) {
        let Some(current) = self
            .product
            .attributes
            .iter_mut()
            .flat_map(|a| a.values.iter_mut())
            .find(|v| v.id == id)
        else {
            return;
        };
        if let Some(label) = value {
            current.value = label.trim().to_string();
        }
        if let Some(order) = display_order {
            current.display_order = order;
        }
        if !self.values_updated.contains(&id) {
            self.values_updated.push(id);
        }
    }

    /// Remove attributes together with their values
    pub fn remove_attributes(&mut self, ids: &[i64]) {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.product.attributes)
            .into_iter()
            .partition(|a| ids.contains(&a.id));
        self.product.attributes = kept;
        for attribute in removed {
            self.values_removed
                .extend(attribute.values.iter().map(|v| v.id));
            self.attributes_removed.push(attribute.id);
        }
    }

    pub fn remove_values(&mut self, ids: &[i64]) {
        for attribute in &mut self.product.attributes {
            attribute.values.retain(|v| {
                if ids.contains(&v.id) {
                    self.values_removed.push(v.id);
                    false
                } else {
                    true
                }
            });
        }
    }

    fn attribute_mut(&mut self, id: i64) -> Option<&mut ProductAttribute> {
        self.product.attributes.iter_mut().find(|a| a.id == id)
    }

    // ========================================================================
    // Direct variant edits
    // ========================================================================

    pub fn variant_mut(&mut self, id: i64) -> Option<&mut ProductVariant> {
        let variant = self.product.variants.iter_mut().find(|v| v.id == id)?;
        if !self.variants_updated.contains(&id) {
            self.variants_updated.push(id);
        }
        Some(variant)
    }

    pub fn remove_variants(&mut self, ids: &[i64]) {
        self.product.variants.retain(|v| {
            if ids.contains(&v.id) {
                self.variants_removed.push(v.id);
                false
            } else {
                true
            }
        });
    }

    // ========================================================================
    // Finishing
    // ========================================================================

    /// Regenerate and reconcile the variant matrix
    ///
    /// With `drafts`, every combination that needs a new variant must be
    /// covered by exactly one draft and no draft may target anything else.
    /// Without, new variants get price 0, stock 0 and a generated SKU.
    pub fn regenerate(mut self, drafts: Option<&[VariantDraft]>) -> CatalogResult<MutationOutcome> {
        let combinations = generate(&value_sets(&self.product.attributes));
        if combinations.is_empty() {
            let names: Vec<String> = combinations
                .empty_attributes
                .iter()
                .filter_map(|id| self.attribute(*id))
                .map(|a| format!("'{}'", a.name))
                .collect();
            return Err(CatalogError::conflict(format!(
                "attribute {} would have no values, leaving the product without variants",
                names.join(", ")
            )));
        }

        let plan = reconcile(&self.product.variants, &combinations);

        // ── Drafts ──

        let planned: HashSet<CombinationKey> =
            plan.to_create.iter().map(|p| p.combination.key()).collect();
        let mut rules = RuleSet::new();
        let mut drafts_by_key: HashMap<CombinationKey, &VariantDraft> = HashMap::new();
        for draft in drafts.unwrap_or_default() {
            let key = CombinationKey::from_value_ids(&draft.value_ids);
            let shown = format_ids(&draft.value_ids);
            if !planned.contains(&key) {
                rules.check("draft_targets_new_combination", false, || {
                    format!("replacement variant [{shown}] does not match a combination that needs a new variant")
                });
            } else if drafts_by_key.insert(key, draft).is_some() {
                rules.check("unique_drafts", false, || {
                    format!("replacement variant [{shown}] is given more than once")
                });
            }
        }
        if drafts.is_some() {
            for missing in plan
                .to_create
                .iter()
                .filter(|p| !drafts_by_key.contains_key(&p.combination.key()))
            {
                rules.check("draft_covers_combination", false, || {
                    format!(
                        "missing replacement variant for combination ({})",
                        missing.combination.labels.join(" / ")
                    )
                });
            }
        }

        let kept_skus: Vec<String> = plan
            .to_keep
            .iter()
            .filter_map(|k| k.variant.sku.clone())
            .collect();
        let mut skus = SkuAllocator::new(&self.product, kept_skus.iter().map(String::as_str));
        let mut seen_skus: HashSet<String> = kept_skus.iter().map(|s| normalize_label(s)).collect();
        for sku in drafts_by_key.values().filter_map(|d| d.sku.as_deref()) {
            let normalized = normalize_label(sku);
            if normalized.is_empty() {
                continue;
            }
            rules.check("unique_sku", seen_skus.insert(normalized), || {
                format!("SKU '{}' is already used by another variant", sku.trim())
            });
            skus.reserve(sku.trim());
        }
        rules.finish()?;

        // ── Plan → rows ──

        let product_id = self.product.id;
        let mut created = Vec::with_capacity(plan.to_create.len());
        for planned in plan.to_create {
            let draft = drafts_by_key.get(&planned.combination.key()).copied();
            let sku = match draft
                .and_then(|d| d.sku.as_deref())
                .map(str::trim)
                .filter(|s| !s.is_empty())
            {
                Some(sku) => sku.to_string(),
                None => skus.generate(&planned.combination.labels),
            };
            created.push(ProductVariant {
                id: self.ids.next_id(),
                product_id,
                value_ids: planned.combination.value_ids,
                sku: Some(sku),
                price: draft.map_or(Decimal::ZERO, |d| d.price),
                stock: draft.map_or(0, |d| d.stock),
                is_active: true,
                position: planned.position,
                media: Vec::new(),
            });
        }

        for kept in plan.to_keep.iter().filter(|k| k.moved) {
            if !self.variants_updated.contains(&kept.variant.id) {
                self.variants_updated.push(kept.variant.id);
            }
        }
        self.variants_removed
            .extend(plan.to_remove.iter().map(|v| v.id));

        let mut variants: Vec<ProductVariant> =
            plan.to_keep.into_iter().map(|k| k.variant).collect();
        variants.extend(created.iter().cloned());
        self.product.variants = variants;

        self.into_outcome(created)
    }

    /// Finish without touching the combination space
    pub fn finish(self) -> CatalogResult<MutationOutcome> {
        self.into_outcome(Vec::new())
    }

    fn into_outcome(mut self, created: Vec<ProductVariant>) -> CatalogResult<MutationOutcome> {
        if self.product.variants.is_empty() {
            return Err(CatalogError::conflict(
                "mutation would leave the product without variants",
            ));
        }
        crate::db::sort_product(&mut self.product);

        let aggregates = recalculate(&self.product.variants);
        let mut changes = ChangeSet::new(self.product.id, aggregates, now_millis());

        let product = &self.product;
        let attributes_added: Vec<ProductAttribute> = product
            .attributes
            .iter()
            .filter(|a| self.attributes_added.contains(&a.id))
            .cloned()
            .collect();
        let attributes_updated: Vec<ProductAttribute> = product
            .attributes
            .iter()
            .filter(|a| self.attributes_updated.contains(&a.id))
            .cloned()
            .collect();
        let all_values = || product.attributes.iter().flat_map(|a| a.values.iter());
        let values_added: Vec<ProductAttributeValue> = all_values()
            .filter(|v| self.values_added.contains(&v.id))
            .cloned()
            .collect();
        let values_updated: Vec<ProductAttributeValue> = all_values()
            .filter(|v| self.values_updated.contains(&v.id))
            .cloned()
            .collect();
        let variants_updated: Vec<ProductVariant> = product
            .variants
            .iter()
            .filter(|v| self.variants_updated.contains(&v.id))
            .cloned()
            .collect();

        changes.attributes_to_insert = attributes_added.clone();
        changes.attributes_to_update = attributes_updated.clone();
        changes.attributes_to_delete = self.attributes_removed.clone();
        changes.values_to_insert = values_added.clone();
        changes.values_to_update = values_updated.clone();
        changes.values_to_delete = self.values_removed.clone();
        changes.variants_to_insert = created.clone();
        changes.variants_to_update = variants_updated.clone();
        changes.variants_to_delete = self.variants_removed.clone();

        let result = MutationResult {
            product_id: product.id,
            operation: self.kind,
            attributes_added,
            attributes_updated,
            attributes_removed: self.attributes_removed,
            values_added,
            values_updated,
            values_removed: self.values_removed,
            variants_created: created,
            variants_updated,
            variants_removed: self.variants_removed,
            attributes: self.product.attributes,
            variants: self.product.variants,
            aggregates,
        };
        Ok(MutationOutcome { changes, result })
    }
}

fn format_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
