//! Mutation result returned by every catalog write

use serde::{Deserialize, Serialize};

use super::attribute::{ProductAttribute, ProductAttributeValue};
use super::product::ProductAggregates;
use super::variant::ProductVariant;

/// Catalog write operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    AddAttribute,
    AddAttributeValues,
    UpdateAttributes,
    DeleteAttributes,
    DeleteAttributeValues,
    UpdateVariants,
    DeleteVariants,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::AddAttribute => "add_attribute",
            MutationKind::AddAttributeValues => "add_attribute_values",
            MutationKind::UpdateAttributes => "update_attributes",
            MutationKind::DeleteAttributes => "delete_attributes",
            MutationKind::DeleteAttributeValues => "delete_attribute_values",
            MutationKind::UpdateVariants => "update_variants",
            MutationKind::DeleteVariants => "delete_variants",
        }
    }
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything a caller needs to rebuild the post-mutation state
///
/// The `*_added` / `*_updated` / `*_removed` lists describe the delta;
/// `attributes`, `variants` and `aggregates` are the full post-state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationResult {
    pub product_id: i64,
    pub operation: MutationKind,
    pub attributes_added: Vec<ProductAttribute>,
    pub attributes_updated: Vec<ProductAttribute>,
    pub attributes_removed: Vec<i64>,
    pub values_added: Vec<ProductAttributeValue>,
    pub values_updated: Vec<ProductAttributeValue>,
    pub values_removed: Vec<i64>,
    pub variants_created: Vec<ProductVariant>,
    pub variants_updated: Vec<ProductVariant>,
    pub variants_removed: Vec<i64>,
    pub attributes: Vec<ProductAttribute>,
    pub variants: Vec<ProductVariant>,
    pub aggregates: ProductAggregates,
}
