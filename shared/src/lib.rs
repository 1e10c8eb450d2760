//! Shared types for the catalog service
//!
//! Catalog models (products, attributes, variants), request payloads,
//! the unified error system and small utilities used by both the
//! server and its API clients.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
