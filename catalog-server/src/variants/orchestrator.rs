//! Attribute mutation orchestrator
//!
//! Every write follows the same pipeline inside one product transaction:
//! resolve referenced ids, validate, edit a [`WorkingCopy`], regenerate and
//! reconcile variants, recompute aggregates, then commit one change set.
//! Any failure before the commit drops the transaction, so nothing is
//! persisted.

use std::sync::Arc;

use shared::models::{
    AttributeCreate, AttributeValuesAdd, AttributeValuesDelete, AttributesBulkUpdate,
    AttributesDelete, MutationKind, MutationResult, VariantsBulkUpdate, VariantsDelete,
};

use super::working_copy::{MutationOutcome, WorkingCopy};
use crate::db::{CatalogStore, ProductTransaction};
use crate::error::{CatalogError, CatalogResult, Resource};
use crate::utils::validation::{
    normalize_label, MAX_ATTRIBUTES_PER_PRODUCT, MAX_NAME_LEN, MAX_SKU_LEN, MAX_VALUES_PER_ATTRIBUTE,
    MAX_VALUE_LEN,
};
use crate::utils::RuleSet;

#[derive(Clone)]
pub struct AttributeMutationOrchestrator {
    store: Arc<dyn CatalogStore>,
}

impl AttributeMutationOrchestrator {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    pub async fn add_attribute(
        &self,
        product_id: i64,
        payload: AttributeCreate,
    ) -> CatalogResult<MutationResult> {
        let tx = self.store.begin(product_id).await?;
        let product = tx.snapshot().clone();

        let mut rules = RuleSet::new();
        rules
            .required_text(&payload.name, "attribute name", MAX_NAME_LEN)
            .non_empty(&payload.values, "values");
        for value in &payload.values {
            rules.required_text(&value.value, "attribute value", MAX_VALUE_LEN);
        }
        rules
            .unique_labels(payload.values.iter().map(|v| v.value.as_str()), "values")
            .check(
                "max_values",
                payload.values.len() <= MAX_VALUES_PER_ATTRIBUTE,
                || format!("an attribute can have at most {MAX_VALUES_PER_ATTRIBUTE} values"),
            )
            .check(
                "max_attributes",
                product.attributes.len() < MAX_ATTRIBUTES_PER_PRODUCT,
                || format!("a product can have at most {MAX_ATTRIBUTES_PER_PRODUCT} attributes"),
            );
        let name = normalize_label(&payload.name);
        rules.check(
            "unique_attribute_name",
            !product
                .attributes
                .iter()
                .any(|a| normalize_label(&a.name) == name),
            || format!("attribute '{}' already exists", payload.name.trim()),
        );
        rules.finish()?;

        let mut copy = WorkingCopy::new(MutationKind::AddAttribute, product);
        copy.add_attribute(&payload.name, payload.display_order, &payload.values);
        let outcome = copy.regenerate(None)?;
        commit(tx, outcome).await
    }

    pub async fn add_attribute_values(
        &self,
        product_id: i64,
        attribute_id: i64,
        payload: AttributeValuesAdd,
    ) -> CatalogResult<MutationResult> {
        let mut tx = self.store.begin(product_id).await?;
        let product = tx.snapshot().clone();
        ensure_owned(&mut tx, Resource::Attribute, &[attribute_id], |id| {
            product.attributes.iter().any(|a| a.id == id)
        })
        .await?;

        let mut copy = WorkingCopy::new(MutationKind::AddAttributeValues, product);
        let Some(attribute) = copy.attribute(attribute_id) else {
            return Err(CatalogError::not_found(Resource::Attribute, attribute_id));
        };

        let mut rules = RuleSet::new();
        rules.non_empty(&payload.values, "values");
        for value in &payload.values {
            rules.required_text(&value.value, "attribute value", MAX_VALUE_LEN);
        }
        rules
            .unique_labels(
                attribute
                    .values
                    .iter()
                    .map(|v| v.value.as_str())
                    .chain(payload.values.iter().map(|v| v.value.as_str())),
                &attribute.name,
            )
            .check(
                "max_values",
                attribute.values.len() + payload.values.len() <= MAX_VALUES_PER_ATTRIBUTE,
                || format!("an attribute can have at most {MAX_VALUES_PER_ATTRIBUTE} values"),
            );
        rules.finish()?;

        copy.add_values(attribute_id, &payload.values);
        let outcome = copy.regenerate(None)?;
        commit(tx, outcome).await
    }

    /// Rename / reorder attributes and values
    ///
    /// Combination keys are unchanged, so existing variants keep their ids and
    /// only move. Combinations pruned earlier with `delete_variants` are
    /// regenerated here with default price, stock and SKU.
    pub async fn update_attributes(
        &self,
        product_id: i64,
        payload: AttributesBulkUpdate,
    ) -> CatalogResult<MutationResult> {
        let mut tx = self.store.begin(product_id).await?;
        let product = tx.snapshot().clone();

        let attribute_ids: Vec<i64> = payload.attributes.iter().map(|a| a.id).collect();
        let value_ids: Vec<i64> = payload.values.iter().map(|v| v.id).collect();
        ensure_owned(&mut tx, Resource::Attribute, &attribute_ids, |id| {
            product.attributes.iter().any(|a| a.id == id)
        })
        .await?;
        ensure_owned(&mut tx, Resource::AttributeValue, &value_ids, |id| {
            product
                .attributes
                .iter()
                .flat_map(|a| a.values.iter())
                .any(|v| v.id == id)
        })
        .await?;

        let mut rules = RuleSet::new();
        rules
            .check(
                "non_empty",
                !attribute_ids.is_empty() || !value_ids.is_empty(),
                || "attributes and values must not both be empty".to_string(),
            )
            .unique_ids(attribute_ids.iter().copied(), "attributes")
            .unique_ids(value_ids.iter().copied(), "values");
        for update in &payload.attributes {
            if let Some(name) = &update.name {
                rules.required_text(name, "attribute name", MAX_NAME_LEN);
            }
        }
        for update in &payload.values {
            if let Some(value) = &update.value {
                rules.required_text(value, "attribute value", MAX_VALUE_LEN);
            }
        }

        let mut copy = WorkingCopy::new(MutationKind::UpdateAttributes, product);
        for update in &payload.attributes {
            copy.update_attribute(update.id, update.name.as_deref(), update.display_order);
        }
        for update in &payload.values {
            copy.update_value(update.id, update.value.as_deref(), update.display_order);
        }

        // uniqueness is checked on the edited state
        let touched: Vec<i64> = copy
            .product()
            .attributes
            .iter()
            .filter(|a| {
                attribute_ids.contains(&a.id) || a.values.iter().any(|v| value_ids.contains(&v.id))
            })
            .map(|a| a.id)
            .collect();
        for attribute in copy.product().attributes.iter().filter(|a| touched.contains(&a.id)) {
            rules.unique_labels(attribute.values.iter().map(|v| v.value.as_str()), &attribute.name);
        }
        rules.unique_labels(
            copy.product().attributes.iter().map(|a| a.name.as_str()),
            "attribute names",
        );
        rules.finish()?;

        let outcome = copy.regenerate(None)?;
        commit(tx, outcome).await
    }

    /// Delete attributes; `replacement_variants` must cover every new
    /// combination of the reduced space
    pub async fn delete_attributes(
        &self,
        product_id: i64,
        payload: AttributesDelete,
    ) -> CatalogResult<MutationResult> {
        let mut tx = self.store.begin(product_id).await?;
        let product = tx.snapshot().clone();
        ensure_owned(&mut tx, Resource::Attribute, &payload.attribute_ids, |id| {
            product.attributes.iter().any(|a| a.id == id)
        })
        .await?;

        let mut rules = RuleSet::new();
        rules
            .non_empty(&payload.attribute_ids, "attribute_ids")
            .unique_ids(payload.attribute_ids.iter().copied(), "attribute_ids");
        for (i, draft) in payload.replacement_variants.iter().enumerate() {
            rules
                .price(draft.price, &format!("replacement variant {i} price"))
                .stock(draft.stock, &format!("replacement variant {i} stock"))
                .optional_text(draft.sku.as_deref(), &format!("replacement variant {i} sku"), MAX_SKU_LEN)
                .unique_ids(draft.value_ids.iter().copied(), &format!("replacement variant {i} value_ids"));
        }
        rules.finish()?;

        let mut copy = WorkingCopy::new(MutationKind::DeleteAttributes, product);
        copy.remove_attributes(&payload.attribute_ids);
        let outcome = copy.regenerate(Some(&payload.replacement_variants))?;
        commit(tx, outcome).await
    }

    pub async fn delete_attribute_values(
        &self,
        product_id: i64,
        payload: AttributeValuesDelete,
    ) -> CatalogResult<MutationResult> {
        let mut tx = self.store.begin(product_id).await?;
        let product = tx.snapshot().clone();
        ensure_owned(&mut tx, Resource::AttributeValue, &payload.value_ids, |id| {
            product
                .attributes
                .iter()
                .flat_map(|a| a.values.iter())
                .any(|v| v.id == id)
        })
        .await?;

        let mut rules = RuleSet::new();
        rules
            .non_empty(&payload.value_ids, "value_ids")
            .unique_ids(payload.value_ids.iter().copied(), "value_ids");
        rules.finish()?;

        let mut copy = WorkingCopy::new(MutationKind::DeleteAttributeValues, product);
        copy.remove_values(&payload.value_ids);
        let outcome = copy.regenerate(None)?;
        commit(tx, outcome).await
    }

    // ========================================================================
    // Variants
    // ========================================================================

    pub async fn update_variants(
        &self,
        product_id: i64,
        payload: VariantsBulkUpdate,
    ) -> CatalogResult<MutationResult> {
        let mut tx = self.store.begin(product_id).await?;
        let product = tx.snapshot().clone();
        let ids: Vec<i64> = payload.variants.iter().map(|v| v.id).collect();
        ensure_owned(&mut tx, Resource::Variant, &ids, |id| {
            product.variants.iter().any(|v| v.id == id)
        })
        .await?;

        let mut rules = RuleSet::new();
        rules
            .non_empty(&payload.variants, "variants")
            .unique_ids(ids.iter().copied(), "variants");
        for update in &payload.variants {
            if let Some(price) = update.price {
                rules.price(price, &format!("variant {} price", update.id));
            }
            if let Some(stock) = update.stock {
                rules.stock(stock, &format!("variant {} stock", update.id));
            }
            rules.optional_text(update.sku.as_deref(), &format!("variant {} sku", update.id), MAX_SKU_LEN);
        }

        let mut copy = WorkingCopy::new(MutationKind::UpdateVariants, product);
        for update in &payload.variants {
            if let Some(variant) = copy.variant_mut(update.id) {
                if let Some(price) = update.price {
                    variant.price = price;
                }
                if let Some(stock) = update.stock {
                    variant.stock = stock;
                }
                if let Some(sku) = &update.sku {
                    let sku = sku.trim();
                    variant.sku = (!sku.is_empty()).then(|| sku.to_string());
                }
                if let Some(is_active) = update.is_active {
                    variant.is_active = is_active;
                }
            }
        }
        rules.unique_labels(
            copy.product().variants.iter().filter_map(|v| v.sku.as_deref()),
            "variant SKUs",
        );
        rules.finish()?;

        commit(tx, copy.finish()?).await
    }

    /// Explicit pruning; a later regeneration recreates pruned combinations
    pub async fn delete_variants(
        &self,
        product_id: i64,
        payload: VariantsDelete,
    ) -> CatalogResult<MutationResult> {
        let mut tx = self.store.begin(product_id).await?;
        let product = tx.snapshot().clone();
        ensure_owned(&mut tx, Resource::Variant, &payload.variant_ids, |id| {
            product.variants.iter().any(|v| v.id == id)
        })
        .await?;

        let mut rules = RuleSet::new();
        rules
            .non_empty(&payload.variant_ids, "variant_ids")
            .unique_ids(payload.variant_ids.iter().copied(), "variant_ids");
        rules.finish()?;

        let mut copy = WorkingCopy::new(MutationKind::DeleteVariants, product);
        copy.remove_variants(&payload.variant_ids);
        commit(tx, copy.finish()?).await
    }
}

/// Every id must belong to the product; unknown ids are NotFound, ids of
/// another product are an ownership conflict
async fn ensure_owned<F>(
    tx: &mut Box<dyn ProductTransaction>,
    resource: Resource,
    ids: &[i64],
    in_product: F,
) -> CatalogResult<()>
where
    F: Fn(i64) -> bool,
{
    let product_id = tx.snapshot().id;
    for &id in ids {
        if in_product(id) {
            continue;
        }
        return match tx.find_owner(resource, id).await? {
            Some(owner) => Err(CatalogError::ownership(format!(
                "{resource} {id} belongs to product {owner}, not product {product_id}"
            ))),
            None => Err(CatalogError::not_found(resource, id)),
        };
    }
    Ok(())
}

async fn commit(
    tx: Box<dyn ProductTransaction>,
    outcome: MutationOutcome,
) -> CatalogResult<MutationResult> {
    let MutationOutcome { changes, result } = outcome;
    let commands = changes.len();
    tx.commit(changes).await?;

    tracing::info!(
        product_id = result.product_id,
        operation = %result.operation,
        commands,
        variants_created = result.variants_created.len(),
        variants_removed = result.variants_removed.len(),
        variant_count = result.variants.len(),
        "Catalog mutation committed"
    );
    Ok(result)
}
