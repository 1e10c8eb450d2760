//! Persistence port
//!
//! The orchestrator never mutates stored rows directly. It opens a
//! [`ProductTransaction`] (which holds the product's write lock until commit
//! or drop), reads the snapshot, and hands back one explicit [`ChangeSet`].
//! Dropping a transaction without committing discards it.
//!
//! Two adapters:
//! - [`MemoryStore`]: in-process, one tokio mutex per product
//! - [`PgStore`]: PostgreSQL via sqlx, `SELECT ... FOR UPDATE` on the product row

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use shared::models::{
    Product, ProductAggregates, ProductAttribute, ProductAttributeValue, ProductVariant,
};
use thiserror::Error;

use crate::error::Resource;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("product {0} not found")]
    ProductNotFound(i64),

    #[error("product {0} already exists")]
    Duplicate(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("corrupt data: {0}")]
    Corrupt(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Catalog persistence collaborator
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Persist a brand-new product with its attributes and variants
    async fn insert_product(&self, product: &Product) -> StoreResult<()>;

    /// Read the current product state without taking the write lock
    async fn load_product(&self, product_id: i64) -> StoreResult<Option<Product>>;

    /// Open a write transaction scoped to one product
    ///
    /// Fails with [`StoreError::ProductNotFound`] when the product is unknown.
    async fn begin(&self, product_id: i64) -> StoreResult<Box<dyn ProductTransaction>>;
}

/// Unit of work over a single product
#[async_trait]
pub trait ProductTransaction: Send {
    /// Product state as read when the transaction began
    fn snapshot(&self) -> &Product;

    /// Product owning the given attribute / value / variant id, if it exists
    async fn find_owner(&mut self, resource: Resource, id: i64) -> StoreResult<Option<i64>>;

    /// Apply every change atomically; on error nothing is persisted
    async fn commit(self: Box<Self>, changes: ChangeSet) -> StoreResult<()>;
}

/// Explicit write commands for one product
///
/// Deletes are applied first, then updates, then inserts. Attribute inserts
/// carry their values; `values_to_insert` is for values added to attributes
/// that already exist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub product_id: i64,
    pub attributes_to_insert: Vec<ProductAttribute>,
    /// Only `name` and `display_order` are written
    pub attributes_to_update: Vec<ProductAttribute>,
    pub attributes_to_delete: Vec<i64>,
    pub values_to_insert: Vec<ProductAttributeValue>,
    pub values_to_update: Vec<ProductAttributeValue>,
    pub values_to_delete: Vec<i64>,
    pub variants_to_insert: Vec<ProductVariant>,
    /// Everything except media is written
    pub variants_to_update: Vec<ProductVariant>,
    /// Hard delete, media goes with the variant
    pub variants_to_delete: Vec<i64>,
    pub aggregates: ProductAggregates,
    pub updated_at: i64,
}

impl ChangeSet {
    pub fn new(product_id: i64, aggregates: ProductAggregates, updated_at: i64) -> Self {
        Self {
            product_id,
            aggregates,
            updated_at,
            ..Default::default()
        }
    }

    /// Apply to an in-memory product (used by the memory store)
    pub fn apply_to(&self, product: &mut Product) {
        // deletes
        product
            .variants
            .retain(|v| !self.variants_to_delete.contains(&v.id));
        product
            .attributes
            .retain(|a| !self.attributes_to_delete.contains(&a.id));
        for attribute in &mut product.attributes {
            attribute
                .values
                .retain(|v| !self.values_to_delete.contains(&v.id));
        }

        // updates
        for update in &self.attributes_to_update {
            if let Some(attribute) = product.attributes.iter_mut().find(|a| a.id == update.id) {
                attribute.name = update.name.clone();
                attribute.display_order = update.display_order;
            }
        }
        for update in &self.values_to_update {
            if let Some(value) = product
                .attributes
                .iter_mut()
                .flat_map(|a| a.values.iter_mut())
                .find(|v| v.id == update.id)
            {
                value.value = update.value.clone();
                value.display_order = update.display_order;
            }
        }
        for update in &self.variants_to_update {
            if let Some(variant) = product.variants.iter_mut().find(|v| v.id == update.id) {
                let media = std::mem::take(&mut variant.media);
                *variant = update.clone();
                variant.media = media;
            }
        }

        // inserts
        product
            .attributes
            .extend(self.attributes_to_insert.iter().cloned());
        for value in &self.values_to_insert {
            if let Some(attribute) = product
                .attributes
                .iter_mut()
                .find(|a| a.id == value.attribute_id)
            {
                attribute.values.push(value.clone());
            }
        }
        product
            .variants
            .extend(self.variants_to_insert.iter().cloned());

        sort_product(product);
        product.min_price = self.aggregates.min_price;
        product.max_price = self.aggregates.max_price;
        product.total_stock = self.aggregates.total_stock;
        product.updated_at = self.updated_at;
    }

    /// Number of row-level commands (for logging)
    pub fn len(&self) -> usize {
        self.attributes_to_insert.len()
            + self.attributes_to_update.len()
            + self.attributes_to_delete.len()
            + self.values_to_insert.len()
            + self.values_to_update.len()
            + self.values_to_delete.len()
            + self.variants_to_insert.len()
            + self.variants_to_update.len()
            + self.variants_to_delete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Canonical ordering: attributes and values by (display_order, id),
/// variants by (position, id)
pub fn sort_product(product: &mut Product) {
    product.attributes.sort_by_key(|a| (a.display_order, a.id));
    for attribute in &mut product.attributes {
        attribute.values.sort_by_key(|v| (v.display_order, v.id));
    }
    product.variants.sort_by_key(|v| (v.position, v.id));
}
