//! Application state for catalog-server

use std::sync::Arc;

use crate::config::Config;
use crate::db::{CatalogStore, MemoryStore, PgStore, StoreResult};
use crate::services::ProductService;
use crate::variants::AttributeMutationOrchestrator;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub products: ProductService,
    pub mutations: AttributeMutationOrchestrator,
}

impl AppState {
    /// Connect the configured store (PostgreSQL or in-memory)
    pub async fn new(config: &Config) -> StoreResult<Self> {
        let store: Arc<dyn CatalogStore> = match &config.database_url {
            Some(url) => {
                let store = PgStore::connect(url, config.db_max_connections).await?;
                tracing::info!("Using PostgreSQL catalog store");
                Arc::new(store)
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory catalog store");
                Arc::new(MemoryStore::new())
            }
        };
        Ok(Self::with_store(store))
    }

    pub fn with_store(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            products: ProductService::new(store.clone()),
            mutations: AttributeMutationOrchestrator::new(store),
        }
    }
}
