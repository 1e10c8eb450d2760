//! In-memory catalog store
//!
//! One `tokio::sync::Mutex` per product serializes writers; the owned guard
//! lives inside the transaction so the lock is released on commit or drop.
//! A separate ownership index answers "which product owns id X" without
//! touching any other product's lock.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use shared::models::Product;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{sort_product, CatalogStore, ChangeSet, ProductTransaction, StoreError, StoreResult};
use crate::error::Resource;

#[derive(Default)]
struct Inner {
    products: DashMap<i64, Arc<Mutex<Product>>>,
    owners: DashMap<(Resource, i64), i64>,
}

/// Process-local store, used in development and tests
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn index_product(&self, product: &Product) {
        let owners = &self.inner.owners;
        for attribute in &product.attributes {
            owners.insert((Resource::Attribute, attribute.id), product.id);
            for value in &attribute.values {
                owners.insert((Resource::AttributeValue, value.id), product.id);
            }
        }
        for variant in &product.variants {
            owners.insert((Resource::Variant, variant.id), product.id);
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn insert_product(&self, product: &Product) -> StoreResult<()> {
        let mut product = product.clone();
        sort_product(&mut product);

        match self.inner.products.entry(product.id) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(StoreError::Duplicate(product.id));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                self.index_product(&product);
                slot.insert(Arc::new(Mutex::new(product)));
            }
        }
        Ok(())
    }

    async fn load_product(&self, product_id: i64) -> StoreResult<Option<Product>> {
        // clone the slot out so no map shard is held across the await
        let slot = self
            .inner
            .products
            .get(&product_id)
            .map(|entry| entry.value().clone());
        match slot {
            Some(slot) => Ok(Some(slot.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn begin(&self, product_id: i64) -> StoreResult<Box<dyn ProductTransaction>> {
        let slot = self
            .inner
            .products
            .get(&product_id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::ProductNotFound(product_id))?;

        let guard = slot.lock_owned().await;
        let snapshot = guard.clone();
        Ok(Box::new(MemoryTransaction {
            store: self.clone(),
            guard,
            snapshot,
        }))
    }
}

struct MemoryTransaction {
    store: MemoryStore,
    guard: OwnedMutexGuard<Product>,
    snapshot: Product,
}

#[async_trait]
impl ProductTransaction for MemoryTransaction {
    fn snapshot(&self) -> &Product {
        &self.snapshot
    }

    async fn find_owner(&mut self, resource: Resource, id: i64) -> StoreResult<Option<i64>> {
        if resource == Resource::Product {
            return Ok(self.store.inner.products.contains_key(&id).then_some(id));
        }
        Ok(self
            .store
            .inner
            .owners
            .get(&(resource, id))
            .map(|owner| *owner.value()))
    }

    async fn commit(self: Box<Self>, changes: ChangeSet) -> StoreResult<()> {
        let MemoryTransaction {
            store,
            mut guard,
            snapshot,
        } = *self;

        if changes.product_id != snapshot.id {
            return Err(StoreError::Corrupt(format!(
                "change set for product {} committed on product {}",
                changes.product_id, snapshot.id
            )));
        }

        let mut next = snapshot;
        changes.apply_to(&mut next);

        let owners = &store.inner.owners;
        for id in &changes.variants_to_delete {
            owners.remove(&(Resource::Variant, *id));
        }
        for id in &changes.values_to_delete {
            owners.remove(&(Resource::AttributeValue, *id));
        }
        for id in &changes.attributes_to_delete {
            owners.remove(&(Resource::Attribute, *id));
        }
        // values of deleted attributes go with them
        for attribute in &guard.attributes {
            if changes.attributes_to_delete.contains(&attribute.id) {
                for value in &attribute.values {
                    owners.remove(&(Resource::AttributeValue, value.id));
                }
            }
        }
        store.index_product(&next);

        *guard = next;
        Ok(())
    }
}
