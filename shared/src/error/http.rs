//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::ValidationFailed => StatusCode::BAD_REQUEST,

            Self::ProductNotFound
            | Self::VariantNotFound
            | Self::AttributeNotFound
            | Self::AttributeValueNotFound => StatusCode::NOT_FOUND,

            Self::OwnershipMismatch | Self::VariantConflict => StatusCode::CONFLICT,

            Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
