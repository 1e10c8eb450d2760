//! Product Attribute Model

use serde::{Deserialize, Serialize};

use super::variant::VariantDraft;

/// Attribute value (one option along an attribute's axis)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProductAttributeValue {
    pub id: i64,
    pub attribute_id: i64,
    pub value: String,
    pub display_order: i32,
}

/// Product attribute (axis of variation, e.g. Color)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttribute {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub display_order: i32,
    /// Ordered by display_order, then id
    pub values: Vec<ProductAttributeValue>,
}

/// Value input used by create / add-values payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeValueInput {
    pub value: String,
    /// Defaults to the position in the request, after existing values
    pub display_order: Option<i32>,
}

/// Create attribute payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeCreate {
    pub name: String,
    pub display_order: Option<i32>,
    pub values: Vec<AttributeValueInput>,
}

/// Add values to an existing attribute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeValuesAdd {
    pub values: Vec<AttributeValueInput>,
}

/// Rename / reorder an attribute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeUpdate {
    pub id: i64,
    pub name: Option<String>,
    pub display_order: Option<i32>,
}

/// Rename / reorder an attribute value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeValueUpdate {
    pub id: i64,
    pub value: Option<String>,
    pub display_order: Option<i32>,
}

/// Bulk update payload (attributes and values in one request)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributesBulkUpdate {
    #[serde(default)]
    pub attributes: Vec<AttributeUpdate>,
    #[serde(default)]
    pub values: Vec<AttributeValueUpdate>,
}

/// Delete whole attributes
///
/// `replacement_variants` must cover the reduced combination space: one draft
/// for every remaining combination that no kept variant already represents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributesDelete {
    pub attribute_ids: Vec<i64>,
    #[serde(default)]
    pub replacement_variants: Vec<VariantDraft>,
}

/// Delete individual attribute values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeValuesDelete {
    pub value_ids: Vec<i64>,
}
