//! Unified error codes for the catalog service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 6xxx: Catalog errors (products, attributes, variants)
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility with the storefront client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,

    // ==================== 6xxx: Catalog ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Referenced ids belong to another product
    OwnershipMismatch = 6003,
    /// Variant not found
    VariantNotFound = 6201,
    /// Mutation would leave the variant set in a forbidden state
    VariantConflict = 6202,
    /// Attribute not found
    AttributeNotFound = 6301,
    /// Attribute value not found
    AttributeValueNotFound = 6311,

    // ==================== 9xxx: System ====================
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",

            // Catalog
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::OwnershipMismatch => "Referenced items do not belong to this product",
            ErrorCode::VariantNotFound => "Variant not found",
            ErrorCode::VariantConflict => "Variant set conflict",
            ErrorCode::AttributeNotFound => "Attribute not found",
            ErrorCode::AttributeValueNotFound => "Attribute value not found",

            // System
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),

            // Catalog
            6001 => Ok(ErrorCode::ProductNotFound),
            6003 => Ok(ErrorCode::OwnershipMismatch),
            6201 => Ok(ErrorCode::VariantNotFound),
            6202 => Ok(ErrorCode::VariantConflict),
            6301 => Ok(ErrorCode::AttributeNotFound),
            6311 => Ok(ErrorCode::AttributeValueNotFound),

            // System
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
