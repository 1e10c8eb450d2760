//! Variant reconciliation
//!
//! Diffs the persisted variants against a freshly generated combination set.
//! Matching is exact [`CombinationKey`] equality. Kept variants retain id,
//! price, stock, SKU, active flag and media; only `position` and the order of
//! `value_ids` follow the new combination order. Removal is a hard delete.

use std::collections::{HashMap, HashSet};

use shared::models::ProductVariant;

use super::combination::{Combination, CombinationKey, CombinationSet};

/// Existing variant that survives the regeneration
#[derive(Debug, Clone, PartialEq)]
pub struct KeptVariant {
    /// Variant with `position` / `value_ids` rewritten to the new order
    pub variant: ProductVariant,
    /// `position` or `value_ids` order differs from the persisted row
    pub moved: bool,
}

/// Combination that has no variant yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedVariant {
    pub combination: Combination,
    pub position: i32,
}

/// Three-way split produced by [`reconcile`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub to_keep: Vec<KeptVariant>,
    pub to_create: Vec<PlannedVariant>,
    pub to_remove: Vec<ProductVariant>,
}

/// Match `existing` against `combinations`.
///
/// Every combination ends up either kept or planned for creation, in
/// combination order. An existing variant whose key is absent from the new
/// set is removed; so is any later variant repeating an already matched key.
pub fn reconcile(existing: &[ProductVariant], combinations: &CombinationSet) -> Reconciliation {
    let wanted: HashSet<CombinationKey> = combinations.combinations.iter().map(|c| c.key()).collect();

    let mut by_key: HashMap<CombinationKey, &ProductVariant> = HashMap::with_capacity(existing.len());
    let mut to_remove = Vec::new();
    for variant in existing {
        let key = CombinationKey::from_value_ids(&variant.value_ids);
        if !wanted.contains(&key) || by_key.contains_key(&key) {
            to_remove.push(variant.clone());
            continue;
        }
        by_key.insert(key, variant);
    }

    let mut to_keep = Vec::with_capacity(by_key.len());
    let mut to_create = Vec::new();
    for (index, combination) in combinations.combinations.iter().enumerate() {
        let position = index as i32;
        match by_key.get(&combination.key()) {
            Some(variant) => {
                let moved =
                    variant.position != position || variant.value_ids != combination.value_ids;
                let mut kept = (*variant).clone();
                kept.position = position;
                kept.value_ids = combination.value_ids.clone();
                to_keep.push(KeptVariant {
                    variant: kept,
                    moved,
                });
            }
            None => to_create.push(PlannedVariant {
                combination: combination.clone(),
                position,
            }),
        }
    }

    Reconciliation {
        to_keep,
        to_create,
        to_remove,
    }
}
