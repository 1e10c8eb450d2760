//! Attribute mutation scenarios against the in-memory store
//!
//! Color{Red, Blue} x Size{S, M} is the running example: every test builds it
//! through the public operations and then mutates it.

use std::sync::Arc;

use async_trait::async_trait;
use catalog_server::db::{ChangeSet, ProductTransaction, StoreError, StoreResult};
use catalog_server::services::ProductService;
use catalog_server::{
    AttributeMutationOrchestrator, CatalogError, CatalogStore, MemoryStore, Resource,
};
use rust_decimal::Decimal;
use shared::models::{
    AttributeCreate, AttributeUpdate, AttributeValueInput, AttributeValueUpdate,
    AttributeValuesAdd, AttributeValuesDelete, AttributesBulkUpdate, AttributesDelete,
    MutationResult, Product, ProductAttribute, ProductCreate, ProductVariant, VariantDraft,
    VariantUpdate, VariantsBulkUpdate, VariantsDelete,
};

// ============================================================================
// Helpers
// ============================================================================

struct Fixture {
    products: ProductService,
    mutations: AttributeMutationOrchestrator,
}

fn fixture_with(store: Arc<dyn CatalogStore>) -> Fixture {
    Fixture {
        products: ProductService::new(store.clone()),
        mutations: AttributeMutationOrchestrator::new(store),
    }
}

fn fixture() -> Fixture {
    fixture_with(Arc::new(MemoryStore::new()))
}

fn attribute(name: &str, labels: &[&str]) -> AttributeCreate {
    AttributeCreate {
        name: name.to_string(),
        display_order: None,
        values: labels
            .iter()
            .map(|label| AttributeValueInput {
                value: label.to_string(),
                display_order: None,
            })
            .collect(),
    }
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn value_id(attributes: &[ProductAttribute], label: &str) -> i64 {
    attributes
        .iter()
        .flat_map(|a| a.values.iter())
        .find(|v| v.value == label)
        .map(|v| v.id)
        .unwrap_or_else(|| panic!("no value {label}"))
}

fn attribute_id(attributes: &[ProductAttribute], name: &str) -> i64 {
    attributes
        .iter()
        .find(|a| a.name == name)
        .map(|a| a.id)
        .unwrap_or_else(|| panic!("no attribute {name}"))
}

fn labels(attributes: &[ProductAttribute], variant: &ProductVariant) -> Vec<String> {
    variant
        .value_ids
        .iter()
        .map(|id| {
            attributes
                .iter()
                .flat_map(|a| a.values.iter())
                .find(|v| v.id == *id)
                .map(|v| v.value.clone())
                .unwrap_or_else(|| panic!("dangling value id {id}"))
        })
        .collect()
}

fn matrix(attributes: &[ProductAttribute], variants: &[ProductVariant]) -> Vec<Vec<String>> {
    variants.iter().map(|v| labels(attributes, v)).collect()
}

fn find<'a>(
    attributes: &[ProductAttribute],
    variants: &'a [ProductVariant],
    wanted: &[&str],
) -> &'a ProductVariant {
    variants
        .iter()
        .find(|v| labels(attributes, v) == wanted)
        .unwrap_or_else(|| panic!("no variant {wanted:?}"))
}

async fn tee(f: &Fixture) -> Product {
    f.products
        .create(ProductCreate {
            name: "Tee".into(),
            sku_prefix: Some("TEE".into()),
            price: Some(dec("10")),
            stock: Some(1),
            sku: None,
        })
        .await
        .unwrap()
}

/// Color{Red, Blue} x Size{S, M}
async fn tee_2x2(f: &Fixture) -> (i64, MutationResult) {
    let product = tee(f).await;
    f.mutations
        .add_attribute(product.id, attribute("Color", &["Red", "Blue"]))
        .await
        .unwrap();
    let result = f
        .mutations
        .add_attribute(product.id, attribute("Size", &["S", "M"]))
        .await
        .unwrap();
    (product.id, result)
}

/// 2x2 with prices 10/11/12/13 and stock 1/2/3/4 in matrix order
async fn priced_tee_2x2(f: &Fixture) -> (i64, MutationResult) {
    let (product_id, result) = tee_2x2(f).await;
    let updates = result
        .variants
        .iter()
        .enumerate()
        .map(|(i, v)| VariantUpdate {
            id: v.id,
            price: Some(Decimal::from(10 + i as i64)),
            stock: Some(1 + i as i64),
            sku: None,
            is_active: None,
        })
        .collect();
    let result = f
        .mutations
        .update_variants(product_id, VariantsBulkUpdate { variants: updates })
        .await
        .unwrap();
    (product_id, result)
}

fn validation_messages(err: CatalogError) -> Vec<String> {
    match err {
        CatalogError::Validation(messages) => messages,
        other => panic!("expected validation error, got {other:?}"),
    }
}

// ============================================================================
// Regeneration scenarios
// ============================================================================

#[tokio::test]
async fn two_by_two_matrix_in_odometer_order() {
    let f = fixture();
    let (_, result) = tee_2x2(&f).await;

    assert_eq!(
        matrix(&result.attributes, &result.variants),
        vec![
            vec!["Red", "S"],
            vec!["Red", "M"],
            vec!["Blue", "S"],
            vec!["Blue", "M"],
        ]
    );
    let positions: Vec<i32> = result.variants.iter().map(|v| v.position).collect();
    assert_eq!(positions, vec![0, 1, 2, 3]);

    // Size made every Color-only variant obsolete
    assert_eq!(result.variants_created.len(), 4);
    assert_eq!(result.variants_removed.len(), 2);

    for variant in &result.variants {
        assert_eq!(variant.price, Decimal::ZERO);
        assert_eq!(variant.stock, 0);
        assert!(variant.is_active);
    }
    let skus: Vec<&str> = result
        .variants
        .iter()
        .filter_map(|v| v.sku.as_deref())
        .collect();
    assert_eq!(skus, vec!["TEE-RED-S", "TEE-RED-M", "TEE-BLUE-S", "TEE-BLUE-M"]);
    assert_eq!(result.aggregates.min_price, Some(Decimal::ZERO));
    assert_eq!(result.aggregates.total_stock, 0);
}

#[tokio::test]
async fn deleting_a_value_keeps_other_variants_untouched() {
    let f = fixture();
    let (product_id, before) = priced_tee_2x2(&f).await;
    let red = value_id(&before.attributes, "Red");
    let blue_s = find(&before.attributes, &before.variants, &["Blue", "S"]).clone();
    let blue_m = find(&before.attributes, &before.variants, &["Blue", "M"]).clone();

    let result = f
        .mutations
        .delete_attribute_values(product_id, AttributeValuesDelete { value_ids: vec![red] })
        .await
        .unwrap();

    assert_eq!(result.values_removed, vec![red]);
    assert!(result.variants_created.is_empty());
    assert_eq!(result.variants_removed.len(), 2);
    assert_eq!(result.variants.len(), 2);

    let kept_s = find(&result.attributes, &result.variants, &["Blue", "S"]);
    let kept_m = find(&result.attributes, &result.variants, &["Blue", "M"]);
    assert_eq!(kept_s.id, blue_s.id);
    assert_eq!(kept_s.price, dec("12"));
    assert_eq!(kept_s.stock, 3);
    assert_eq!(kept_s.sku, blue_s.sku);
    assert_eq!(kept_m.id, blue_m.id);
    assert_eq!(kept_m.price, dec("13"));

    assert_eq!(result.aggregates.min_price, Some(dec("12")));
    assert_eq!(result.aggregates.max_price, Some(dec("13")));
    assert_eq!(result.aggregates.total_stock, 7);

    let stored = f.products.get(product_id).await.unwrap();
    assert_eq!(stored.variants, result.variants);
    assert_eq!(stored.min_price, Some(dec("12")));
}

#[tokio::test]
async fn adding_a_value_creates_defaults_and_keeps_existing() {
    let f = fixture();
    let (product_id, before) = priced_tee_2x2(&f).await;
    let color = attribute_id(&before.attributes, "Color");

    let result = f
        .mutations
        .add_attribute_values(
            product_id,
            color,
            AttributeValuesAdd {
                values: vec![AttributeValueInput {
                    value: "Green".into(),
                    display_order: None,
                }],
            },
        )
        .await
        .unwrap();

    assert_eq!(result.values_added.len(), 1);
    assert!(result.variants_removed.is_empty());
    assert_eq!(
        matrix(&result.attributes, &result.variants),
        vec![
            vec!["Red", "S"],
            vec!["Red", "M"],
            vec!["Blue", "S"],
            vec!["Blue", "M"],
            vec!["Green", "S"],
            vec!["Green", "M"],
        ]
    );

    let created = matrix(&result.attributes, &result.variants_created);
    assert_eq!(created, vec![vec!["Green", "S"], vec!["Green", "M"]]);
    for variant in &result.variants_created {
        assert_eq!(variant.price, Decimal::ZERO);
        assert_eq!(variant.stock, 0);
    }
    for old in &before.variants {
        let kept = result.variants.iter().find(|v| v.id == old.id).unwrap();
        assert_eq!(kept.price, old.price);
        assert_eq!(kept.stock, old.stock);
    }

    assert_eq!(result.aggregates.min_price, Some(Decimal::ZERO));
    assert_eq!(result.aggregates.max_price, Some(dec("13")));
    assert_eq!(result.aggregates.total_stock, 10);
}

#[tokio::test]
async fn deleting_an_attribute_requires_replacement_drafts() {
    let f = fixture();
    let (product_id, before) = priced_tee_2x2(&f).await;
    let size = attribute_id(&before.attributes, "Size");

    let err = f
        .mutations
        .delete_attributes(
            product_id,
            AttributesDelete {
                attribute_ids: vec![size],
                replacement_variants: vec![],
            },
        )
        .await
        .unwrap_err();
    let messages = validation_messages(err);
    assert_eq!(messages.len(), 2);
    assert!(messages[0].contains("(Red)"));
    assert!(messages[1].contains("(Blue)"));

    // nothing persisted
    let stored = f.products.get(product_id).await.unwrap();
    assert_eq!(stored.attributes.len(), 2);
    assert_eq!(stored.variants.len(), 4);
}

#[tokio::test]
async fn deleting_an_attribute_with_drafts() {
    let f = fixture();
    let (product_id, before) = priced_tee_2x2(&f).await;
    let size = attribute_id(&before.attributes, "Size");
    let red = value_id(&before.attributes, "Red");
    let blue = value_id(&before.attributes, "Blue");

    let result = f
        .mutations
        .delete_attributes(
            product_id,
            AttributesDelete {
                attribute_ids: vec![size],
                replacement_variants: vec![
                    VariantDraft {
                        value_ids: vec![blue],
                        price: dec("30"),
                        stock: 6,
                        sku: None,
                    },
                    VariantDraft {
                        value_ids: vec![red],
                        price: dec("20"),
                        stock: 5,
                        sku: Some("TEE-RED-ONE".into()),
                    },
                ],
            },
        )
        .await
        .unwrap();

    assert_eq!(result.attributes_removed, vec![size]);
    assert_eq!(result.values_removed.len(), 2);
    assert_eq!(result.variants_removed.len(), 4);
    assert_eq!(result.variants_created.len(), 2);
    assert_eq!(
        matrix(&result.attributes, &result.variants),
        vec![vec!["Red"], vec!["Blue"]]
    );

    let red_variant = find(&result.attributes, &result.variants, &["Red"]);
    assert_eq!(red_variant.price, dec("20"));
    assert_eq!(red_variant.stock, 5);
    assert_eq!(red_variant.sku.as_deref(), Some("TEE-RED-ONE"));
    let blue_variant = find(&result.attributes, &result.variants, &["Blue"]);
    assert_eq!(blue_variant.sku.as_deref(), Some("TEE-BLUE"));

    assert_eq!(result.aggregates.min_price, Some(dec("20")));
    assert_eq!(result.aggregates.max_price, Some(dec("30")));
    assert_eq!(result.aggregates.total_stock, 11);
}

#[tokio::test]
async fn drafts_for_unknown_combinations_are_rejected() {
    let f = fixture();
    let (product_id, before) = tee_2x2(&f).await;
    let size = attribute_id(&before.attributes, "Size");
    let red = value_id(&before.attributes, "Red");
    let blue = value_id(&before.attributes, "Blue");
    let small = value_id(&before.attributes, "S");

    let draft = |value_ids: Vec<i64>| VariantDraft {
        value_ids,
        price: Decimal::ONE,
        stock: 1,
        sku: None,
    };
    let err = f
        .mutations
        .delete_attributes(
            product_id,
            AttributesDelete {
                attribute_ids: vec![size],
                replacement_variants: vec![draft(vec![red]), draft(vec![blue]), draft(vec![red, small])],
            },
        )
        .await
        .unwrap_err();
    let messages = validation_messages(err);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("does not match"));
}

#[tokio::test]
async fn deleting_every_attribute_leaves_a_base_variant() {
    let f = fixture();
    let (product_id, before) = tee_2x2(&f).await;
    let ids: Vec<i64> = before.attributes.iter().map(|a| a.id).collect();

    let result = f
        .mutations
        .delete_attributes(
            product_id,
            AttributesDelete {
                attribute_ids: ids,
                replacement_variants: vec![VariantDraft {
                    value_ids: vec![],
                    price: dec("9.99"),
                    stock: 2,
                    sku: None,
                }],
            },
        )
        .await
        .unwrap();

    assert!(result.attributes.is_empty());
    assert_eq!(result.variants.len(), 1);
    assert!(result.variants[0].value_ids.is_empty());
    assert_eq!(result.variants[0].sku.as_deref(), Some("TEE"));
    assert_eq!(result.aggregates.min_price, Some(dec("9.99")));
}

#[tokio::test]
async fn renaming_and_reordering_moves_variants_only() {
    let f = fixture();
    let (product_id, before) = priced_tee_2x2(&f).await;
    let red = value_id(&before.attributes, "Red");
    let medium = value_id(&before.attributes, "M");

    let result = f
        .mutations
        .update_attributes(
            product_id,
            AttributesBulkUpdate {
                attributes: vec![],
                values: vec![
                    AttributeValueUpdate {
                        id: red,
                        value: Some("Crimson".into()),
                        display_order: None,
                    },
                    AttributeValueUpdate {
                        id: medium,
                        value: None,
                        display_order: Some(-1),
                    },
                ],
            },
        )
        .await
        .unwrap();

    assert!(result.variants_created.is_empty());
    assert!(result.variants_removed.is_empty());
    assert_eq!(result.values_updated.len(), 2);
    assert_eq!(
        matrix(&result.attributes, &result.variants),
        vec![
            vec!["Crimson", "M"],
            vec!["Crimson", "S"],
            vec!["Blue", "M"],
            vec!["Blue", "S"],
        ]
    );
    let mut before_ids: Vec<i64> = before.variants.iter().map(|v| v.id).collect();
    let mut after_ids: Vec<i64> = result.variants.iter().map(|v| v.id).collect();
    before_ids.sort_unstable();
    after_ids.sort_unstable();
    assert_eq!(before_ids, after_ids);
    assert_eq!(result.aggregates, before.aggregates);
}

#[tokio::test]
async fn reordering_attributes_flips_the_odometer() {
    let f = fixture();
    let (product_id, before) = tee_2x2(&f).await;
    let size = attribute_id(&before.attributes, "Size");

    let result = f
        .mutations
        .update_attributes(
            product_id,
            AttributesBulkUpdate {
                attributes: vec![AttributeUpdate {
                    id: size,
                    name: None,
                    display_order: Some(-1),
                }],
                values: vec![],
            },
        )
        .await
        .unwrap();

    assert_eq!(
        matrix(&result.attributes, &result.variants),
        vec![
            vec!["S", "Red"],
            vec!["S", "Blue"],
            vec!["M", "Red"],
            vec!["M", "Blue"],
        ]
    );
    assert!(result.variants_created.is_empty());
}

#[tokio::test]
async fn pruned_variants_come_back_on_regeneration() {
    let f = fixture();
    let (product_id, before) = tee_2x2(&f).await;
    let blue_m = find(&before.attributes, &before.variants, &["Blue", "M"]).id;

    let pruned = f
        .mutations
        .delete_variants(product_id, VariantsDelete { variant_ids: vec![blue_m] })
        .await
        .unwrap();
    assert_eq!(pruned.variants.len(), 3);
    assert_eq!(pruned.variants_removed, vec![blue_m]);

    let size = attribute_id(&before.attributes, "Size");
    let result = f
        .mutations
        .add_attribute_values(
            product_id,
            size,
            AttributeValuesAdd {
                values: vec![AttributeValueInput {
                    value: "L".into(),
                    display_order: None,
                }],
            },
        )
        .await
        .unwrap();

    assert_eq!(result.variants.len(), 6);
    assert_eq!(
        matrix(&result.attributes, &result.variants_created),
        vec![vec!["Red", "L"], vec!["Blue", "M"], vec!["Blue", "L"]]
    );
}

#[tokio::test]
async fn renaming_after_a_prune_restores_the_combination() {
    let f = fixture();
    let (product_id, before) = priced_tee_2x2(&f).await;
    let blue_m = find(&before.attributes, &before.variants, &["Blue", "M"]).id;
    f.mutations
        .delete_variants(product_id, VariantsDelete { variant_ids: vec![blue_m] })
        .await
        .unwrap();

    let blue = value_id(&before.attributes, "Blue");
    let result = f
        .mutations
        .update_attributes(
            product_id,
            AttributesBulkUpdate {
                attributes: vec![],
                values: vec![AttributeValueUpdate {
                    id: blue,
                    value: Some("Navy".into()),
                    display_order: None,
                }],
            },
        )
        .await
        .unwrap();

    assert_eq!(result.variants.len(), 4);
    assert!(result.variants_removed.is_empty());
    assert_eq!(
        matrix(&result.attributes, &result.variants_created),
        vec![vec!["Navy", "M"]]
    );
    let restored = &result.variants_created[0];
    assert_ne!(restored.id, blue_m);
    assert_eq!(restored.price, Decimal::ZERO);
    assert_eq!(restored.stock, 0);
    assert_eq!(result.aggregates.min_price, Some(Decimal::ZERO));
}

#[tokio::test]
async fn display_order_at_the_integer_limit_is_accepted() {
    let f = fixture();
    let product = tee(&f).await;
    let mut color = attribute("Color", &["Red", "Blue"]);
    color.display_order = Some(i32::MAX);
    color.values[0].display_order = Some(i32::MAX);

    let result = f.mutations.add_attribute(product.id, color).await.unwrap();
    assert_eq!(result.attributes[0].display_order, i32::MAX);
    assert_eq!(result.variants.len(), 2);

    let color_id = result.attributes[0].id;
    let result = f
        .mutations
        .add_attribute_values(
            product.id,
            color_id,
            AttributeValuesAdd {
                values: vec![AttributeValueInput {
                    value: "Green".into(),
                    display_order: None,
                }],
            },
        )
        .await
        .unwrap();
    assert_eq!(result.variants.len(), 3);
    assert!(result.attributes[0].values.iter().all(|v| v.display_order == i32::MAX));
}

// ============================================================================
// Rejections
// ============================================================================

#[tokio::test]
async fn deleting_the_last_values_is_a_conflict() {
    let f = fixture();
    let (product_id, before) = tee_2x2(&f).await;
    let small = value_id(&before.attributes, "S");
    let medium = value_id(&before.attributes, "M");

    let err = f
        .mutations
        .delete_attribute_values(
            product_id,
            AttributeValuesDelete {
                value_ids: vec![small, medium],
            },
        )
        .await
        .unwrap_err();
    match err {
        CatalogError::Conflict(message) => assert!(message.contains("'Size'")),
        other => panic!("expected conflict, got {other:?}"),
    }

    let stored = f.products.get(product_id).await.unwrap();
    assert_eq!(stored.variants.len(), 4);
}

#[tokio::test]
async fn deleting_every_variant_is_a_conflict() {
    let f = fixture();
    let (product_id, before) = tee_2x2(&f).await;
    let ids = before.variants.iter().map(|v| v.id).collect();

    let err = f
        .mutations
        .delete_variants(product_id, VariantsDelete { variant_ids: ids })
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Conflict(_)));
}

#[tokio::test]
async fn validation_reports_every_rule() {
    let f = fixture();
    let product = tee(&f).await;

    let err = f
        .mutations
        .add_attribute(product.id, attribute(" ", &["Red", " red", ""]))
        .await
        .unwrap_err();
    let messages = validation_messages(err);
    assert_eq!(
        messages,
        vec![
            "attribute name must not be empty",
            "attribute value must not be empty",
            "values contains duplicate value 'red'",
        ]
    );
}

#[tokio::test]
async fn duplicate_values_against_existing_ones() {
    let f = fixture();
    let (product_id, before) = tee_2x2(&f).await;
    let color = attribute_id(&before.attributes, "Color");

    let err = f
        .mutations
        .add_attribute_values(
            product_id,
            color,
            AttributeValuesAdd {
                values: vec![AttributeValueInput {
                    value: "BLUE ".into(),
                    display_order: None,
                }],
            },
        )
        .await
        .unwrap_err();
    let messages = validation_messages(err);
    assert_eq!(messages, vec!["Color contains duplicate value 'BLUE'"]);
}

#[tokio::test]
async fn attribute_ceiling() {
    let f = fixture();
    let (product_id, _) = tee_2x2(&f).await;
    f.mutations
        .add_attribute(product_id, attribute("Material", &["Cotton"]))
        .await
        .unwrap();

    let err = f
        .mutations
        .add_attribute(product_id, attribute("Fit", &["Slim"]))
        .await
        .unwrap_err();
    let messages = validation_messages(err);
    assert_eq!(messages, vec!["a product can have at most 3 attributes"]);
}

#[tokio::test]
async fn rename_into_an_existing_label_is_rejected() {
    let f = fixture();
    let (product_id, before) = tee_2x2(&f).await;
    let blue = value_id(&before.attributes, "Blue");

    let err = f
        .mutations
        .update_attributes(
            product_id,
            AttributesBulkUpdate {
                attributes: vec![],
                values: vec![AttributeValueUpdate {
                    id: blue,
                    value: Some("red".into()),
                    display_order: None,
                }],
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        validation_messages(err),
        vec!["Color contains duplicate value 'red'"]
    );
}

#[tokio::test]
async fn variant_updates_are_validated_and_aggregated() {
    let f = fixture();
    let (product_id, before) = priced_tee_2x2(&f).await;
    let red_s = find(&before.attributes, &before.variants, &["Red", "S"]).clone();
    let red_m = find(&before.attributes, &before.variants, &["Red", "M"]).clone();

    let err = f
        .mutations
        .update_variants(
            product_id,
            VariantsBulkUpdate {
                variants: vec![
                    VariantUpdate {
                        id: red_s.id,
                        price: Some(dec("-1")),
                        stock: None,
                        sku: None,
                        is_active: None,
                    },
                    VariantUpdate {
                        id: red_m.id,
                        price: None,
                        stock: None,
                        sku: red_s.sku.clone(),
                        is_active: None,
                    },
                ],
            },
        )
        .await
        .unwrap_err();
    assert_eq!(validation_messages(err).len(), 2);

    // deactivating the cheapest variant moves min_price and total_stock
    let result = f
        .mutations
        .update_variants(
            product_id,
            VariantsBulkUpdate {
                variants: vec![VariantUpdate {
                    id: red_s.id,
                    price: None,
                    stock: None,
                    sku: None,
                    is_active: Some(false),
                }],
            },
        )
        .await
        .unwrap();
    assert_eq!(result.variants_updated.len(), 1);
    assert_eq!(result.aggregates.min_price, Some(dec("11")));
    assert_eq!(result.aggregates.max_price, Some(dec("13")));
    assert_eq!(result.aggregates.total_stock, 9);
}

#[tokio::test]
async fn foreign_and_unknown_ids() {
    let f = fixture();
    let (first, _) = tee_2x2(&f).await;
    let (_, second) = tee_2x2(&f).await;
    let foreign = value_id(&second.attributes, "Red");

    let err = f
        .mutations
        .delete_attribute_values(first, AttributeValuesDelete { value_ids: vec![foreign] })
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Ownership(_)));

    let err = f
        .mutations
        .delete_attribute_values(first, AttributeValuesDelete { value_ids: vec![12345] })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::NotFound {
            resource: Resource::AttributeValue,
            id: 12345
        }
    ));

    let err = f
        .mutations
        .add_attribute(777, attribute("Color", &["Red"]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::NotFound {
            resource: Resource::Product,
            id: 777
        }
    ));
}

// ============================================================================
// Atomicity and concurrency
// ============================================================================

/// Memory store whose commits always fail
struct FailingStore {
    inner: MemoryStore,
}

struct FailingTransaction {
    inner: Box<dyn ProductTransaction>,
}

#[async_trait]
impl CatalogStore for FailingStore {
    async fn insert_product(&self, product: &Product) -> StoreResult<()> {
        self.inner.insert_product(product).await
    }

    async fn load_product(&self, product_id: i64) -> StoreResult<Option<Product>> {
        self.inner.load_product(product_id).await
    }

    async fn begin(&self, product_id: i64) -> StoreResult<Box<dyn ProductTransaction>> {
        let inner = self.inner.begin(product_id).await?;
        Ok(Box::new(FailingTransaction { inner }))
    }
}

#[async_trait]
impl ProductTransaction for FailingTransaction {
    fn snapshot(&self) -> &Product {
        self.inner.snapshot()
    }

    async fn find_owner(&mut self, resource: Resource, id: i64) -> StoreResult<Option<i64>> {
        self.inner.find_owner(resource, id).await
    }

    async fn commit(self: Box<Self>, _changes: ChangeSet) -> StoreResult<()> {
        Err(StoreError::Corrupt("simulated write failure".into()))
    }
}

#[tokio::test]
async fn failed_commit_persists_nothing() {
    let f = fixture_with(Arc::new(FailingStore {
        inner: MemoryStore::new(),
    }));
    let product = tee(&f).await;

    let err = f
        .mutations
        .add_attribute(product.id, attribute("Color", &["Red", "Blue"]))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Persistence(_)));

    let stored = f.products.get(product.id).await.unwrap();
    assert_eq!(stored, product);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_mutations_on_one_product_serialize() {
    let f = fixture();
    let product = tee(&f).await;
    let first = f
        .mutations
        .add_attribute(product.id, attribute("Color", &["Red"]))
        .await
        .unwrap();
    let color = attribute_id(&first.attributes, "Color");

    let mut handles = Vec::new();
    for label in ["Blue", "Green", "Black", "White"] {
        let mutations = f.mutations.clone();
        let product_id = product.id;
        handles.push(tokio::spawn(async move {
            mutations
                .add_attribute_values(
                    product_id,
                    color,
                    AttributeValuesAdd {
                        values: vec![AttributeValueInput {
                            value: label.into(),
                            display_order: None,
                        }],
                    },
                )
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = f.products.get(product.id).await.unwrap();
    assert_eq!(stored.attributes[0].values.len(), 5);
    assert_eq!(stored.variants.len(), 5);
    // the Red variant survived every regeneration
    assert_eq!(stored.variants[0].id, first.variants[0].id);
}
