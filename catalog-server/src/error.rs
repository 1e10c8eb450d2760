//! Catalog error type
//!
//! `CatalogError` is what the variant engine and the orchestrator return.
//! It converts into the API-layer `AppError` at the handler boundary, the same
//! way store errors are funneled through one place instead of ad-hoc
//! `.map_err` calls in every handler.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::db::StoreError;

/// Kind of catalog resource referenced by a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Product,
    Attribute,
    AttributeValue,
    Variant,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Product => "Product",
            Resource::Attribute => "Attribute",
            Resource::AttributeValue => "Attribute value",
            Resource::Variant => "Variant",
        }
    }

    fn not_found_code(&self) -> ErrorCode {
        match self {
            Resource::Product => ErrorCode::ProductNotFound,
            Resource::Attribute => ErrorCode::AttributeNotFound,
            Resource::AttributeValue => ErrorCode::AttributeValueNotFound,
            Resource::Variant => ErrorCode::VariantNotFound,
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed failure of a catalog operation
///
/// Nothing is persisted when any of these is returned.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// One message per violated rule
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Mutation would leave the product in a forbidden state
    #[error("{0}")]
    Conflict(String),

    /// Referenced ids exist but belong to another product
    #[error("{0}")]
    Ownership(String),

    #[error("{resource} {id} not found")]
    NotFound { resource: Resource, id: i64 },

    /// Load or commit failed; the transaction was rolled back
    #[error("persistence failure: {0}")]
    Persistence(StoreError),
}

impl CatalogError {
    pub fn validation(message: impl Into<String>) -> Self {
        CatalogError::Validation(vec![message.into()])
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        CatalogError::Conflict(message.into())
    }

    pub fn ownership(message: impl Into<String>) -> Self {
        CatalogError::Ownership(message.into())
    }

    pub fn not_found(resource: Resource, id: i64) -> Self {
        CatalogError::NotFound { resource, id }
    }
}

impl From<StoreError> for CatalogError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ProductNotFound(id) => CatalogError::not_found(Resource::Product, id),
            other => CatalogError::Persistence(other),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::Validation(messages) => AppError::violations(messages),
            CatalogError::Conflict(message) => {
                AppError::with_message(ErrorCode::VariantConflict, message)
            }
            CatalogError::Ownership(message) => {
                AppError::with_message(ErrorCode::OwnershipMismatch, message)
            }
            CatalogError::NotFound { resource, id } => AppError::with_message(
                resource.not_found_code(),
                format!("{resource} {id} not found"),
            )
            .with_detail("id", id),
            CatalogError::Persistence(store_err) => {
                tracing::error!(error = %store_err, "Catalog persistence error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for catalog results
pub type CatalogResult<T> = Result<T, CatalogError>;
