//! Combination generation
//!
//! Builds the Cartesian product of a product's attribute-value sets. The
//! ordering is an odometer: attributes by display order, values by display
//! order, last attribute varying fastest. Ties are broken by id so repeated
//! calls over the same state always produce the same sequence.

use shared::models::ProductAttribute;

/// Selectable values for one attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeValueSet {
    pub attribute_id: i64,
    pub display_order: i32,
    pub values: Vec<ValueRef>,
}

/// One selectable value (id + label for SKU generation)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueRef {
    pub id: i64,
    pub display_order: i32,
    pub label: String,
}

impl AttributeValueSet {
    pub fn from_attribute(attribute: &ProductAttribute) -> Self {
        Self {
            attribute_id: attribute.id,
            display_order: attribute.display_order,
            values: attribute
                .values
                .iter()
                .map(|v| ValueRef {
                    id: v.id,
                    display_order: v.display_order,
                    label: v.value.clone(),
                })
                .collect(),
        }
    }
}

/// Build value sets for every attribute of a product
pub fn value_sets(attributes: &[ProductAttribute]) -> Vec<AttributeValueSet> {
    attributes.iter().map(AttributeValueSet::from_attribute).collect()
}

/// Order-independent identity of a combination
///
/// Two keys are equal iff they select the same value for every attribute,
/// regardless of the attribute order the ids were listed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CombinationKey(Vec<i64>);

impl CombinationKey {
    pub fn from_value_ids(value_ids: &[i64]) -> Self {
        let mut ids = value_ids.to_vec();
        ids.sort_unstable();
        Self(ids)
    }

    pub fn value_ids(&self) -> &[i64] {
        &self.0
    }
}

/// One generated combination, value ids in attribute order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination {
    pub value_ids: Vec<i64>,
    pub labels: Vec<String>,
}

impl Combination {
    pub fn key(&self) -> CombinationKey {
        CombinationKey::from_value_ids(&self.value_ids)
    }
}

/// Result of a generation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinationSet {
    pub combinations: Vec<Combination>,
    /// Attributes that have no values (each collapses the product to zero)
    pub empty_attributes: Vec<i64>,
}

impl CombinationSet {
    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }
}

/// Generate every combination of one value per attribute.
///
/// Zero attributes yield a single empty combination (the base variant).
/// Any attribute with zero values yields no combinations and is reported in
/// [`CombinationSet::empty_attributes`].
pub fn generate(sets: &[AttributeValueSet]) -> CombinationSet {
    let mut ordered: Vec<&AttributeValueSet> = sets.iter().collect();
    ordered.sort_by_key(|s| (s.display_order, s.attribute_id));

    let empty_attributes: Vec<i64> = ordered
        .iter()
        .filter(|s| s.values.is_empty())
        .map(|s| s.attribute_id)
        .collect();
    if !empty_attributes.is_empty() {
        return CombinationSet {
            combinations: Vec::new(),
            empty_attributes,
        };
    }

    let mut combinations = vec![Combination {
        value_ids: Vec::with_capacity(ordered.len()),
        labels: Vec::with_capacity(ordered.len()),
    }];

    for set in ordered {
        let mut values: Vec<&ValueRef> = set.values.iter().collect();
        values.sort_by_key(|v| (v.display_order, v.id));

        let mut next = Vec::with_capacity(combinations.len() * values.len());
        for prefix in &combinations {
            for value in &values {
                let mut combination = prefix.clone();
                combination.value_ids.push(value.id);
                combination.labels.push(value.label.clone());
                next.push(combination);
            }
        }
        combinations = next;
    }

    CombinationSet {
        combinations,
        empty_attributes: Vec::new(),
    }
}
