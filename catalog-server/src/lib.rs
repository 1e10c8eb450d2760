//! Catalog Server - product attributes and the variant matrix
//!
//! # Overview
//!
//! A product has up to three attributes (Color, Size, ...), each with a list
//! of values. Every combination of one value per attribute is a sellable
//! variant. Whenever attributes or values change, the combination space is
//! regenerated and reconciled against the existing variants: survivors keep
//! their id, price, stock and media; new combinations are created; obsolete
//! ones are deleted. Product aggregates (min/max price, total stock) are
//! recomputed over active variants and committed in the same transaction.
//!
//! # Modules
//!
//! ```text
//! catalog-server/src/
//! ├── variants/      # combination generator, reconciler, aggregates, orchestrator
//! ├── services/      # product create / read
//! ├── db/            # persistence port, memory and PostgreSQL stores
//! ├── api/           # HTTP routes and handlers
//! ├── utils/         # logging, validation rules
//! ├── convert.rs     # payload to entity conversions
//! ├── config.rs      # environment configuration
//! └── error.rs       # CatalogError
//! ```

pub mod api;
pub mod config;
pub mod convert;
pub mod db;
pub mod error;
pub mod services;
pub mod state;
pub mod utils;
pub mod variants;

pub use config::Config;
pub use db::{CatalogStore, MemoryStore, PgStore};
pub use error::{CatalogError, CatalogResult, Resource};
pub use state::AppState;
pub use variants::AttributeMutationOrchestrator;

pub use utils::logger::init_logger_with_file;
