//! Variant engine
//!
//! - `combination`: cartesian product of attribute values
//! - `reconciler`: diff of existing variants against generated combinations
//! - `aggregate`: min/max price and total stock over active variants
//! - `orchestrator`: transactional pipeline behind every catalog write

pub mod aggregate;
pub mod allocator;
pub mod combination;
pub mod orchestrator;
pub mod reconciler;
pub mod working_copy;

pub use aggregate::recalculate;
pub use combination::{generate, value_sets, Combination, CombinationKey, CombinationSet};
pub use orchestrator::AttributeMutationOrchestrator;
pub use reconciler::{reconcile, Reconciliation};
