//! Data models
//!
//! Shared between catalog-server and the storefront/console clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes (see [`crate::util::snowflake_id`]).

pub mod attribute;
pub mod mutation;
pub mod product;
pub mod variant;

// Re-exports
pub use attribute::*;
pub use mutation::*;
pub use product::*;
pub use variant::*;
