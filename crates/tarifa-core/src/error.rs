//! # Error Types
//!
//! Domain-specific error types for tarifa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tarifa-core errors (this file)                                        │
//! │  ├── PricingDataError  - A product lacks every usable price            │
//! │  ├── CartError         - Rejected cart mutation                        │
//! │  ├── CatalogError      - Lookup / catalog construction failures        │
//! │  ├── ValidationError   - Input validation failures                     │
//! │  └── CoreError         - Umbrella over all of the above                │
//! │                                                                         │
//! │  tarifa-cli errors (separate crate)                                    │
//! │  └── CliError          - What the operator sees (code + message)       │
//! │                                                                         │
//! │  Flow: PricingDataError / CartError / ... → CoreError → CliError       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Expected vs Exceptional
//! Below-minimum quantities and missing promo prices are business branches,
//! not errors of the engine. Only an exhausted price fallback chain
//! (`net → list → nothing`) produces a `PricingDataError`, and it is scoped
//! to the one line being priced.

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Pricing Data Error
// =============================================================================

/// A required price is missing on a product.
///
/// Raised when neither the tier's net price nor the list price is present.
/// The cart excludes the offending line from the total and reports it
/// instead of pricing it at zero.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("No usable price for product {product_id} ({code}): net and list price are both missing")]
pub struct PricingDataError {
    pub product_id: String,
    pub code: String,
}

// =============================================================================
// Cart Error
// =============================================================================

/// Rejected cart mutations. The cart is left unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Quantity under the product's ordering increment.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to cart (qty: 8, increment: 12)
    ///      │
    ///      ▼
    /// BelowMinimumOrder { requested: 8, minimum: 12 }
    ///      │
    ///      ▼
    /// UI shows: "Minimum order for 8757704 is 12 units"
    /// ```
    #[error("Minimum order for {code} is {minimum} units (requested {requested})")]
    BelowMinimumOrder {
        product_id: String,
        code: String,
        requested: u32,
        minimum: u32,
    },

    /// No line for this product in the cart.
    #[error("Product {0} is not in the cart")]
    LineNotFound(String),

    /// Accumulated quantity does not fit the quantity type.
    #[error("Quantity for {product_id} would overflow")]
    QuantityOverflow { product_id: String },
}

// =============================================================================
// Catalog Error
// =============================================================================

/// Catalog accessor failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Product cannot be found.
    ///
    /// Surfaced as-is; the catalog is read-only and there is nothing to retry.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Two catalog entries share an id. The first one loaded is kept.
    #[error("Duplicate product id in catalog: {0}")]
    DuplicateProduct(String),

    /// A catalog entry failed validation and was left out.
    #[error("Invalid product {id}: {source}")]
    InvalidProduct {
        id: String,
        #[source]
        source: ValidationError,
    },
}

// =============================================================================
// Core Error
// =============================================================================

/// Umbrella over every error tarifa-core produces.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Pricing(#[from] PricingDataError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result of a cart mutation.
pub type CartResult<T> = Result<T, CartError>;

/// Result of a catalog lookup.
pub type CatalogResult<T> = Result<T, CatalogError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CartError::BelowMinimumOrder {
            product_id: "p-1".to_string(),
            code: "8757704".to_string(),
            requested: 8,
            minimum: 12,
        };
        assert_eq!(
            err.to_string(),
            "Minimum order for 8757704 is 12 units (requested 8)"
        );

        let err = PricingDataError {
            product_id: "p-9".to_string(),
            code: "X9".to_string(),
        };
        assert!(err.to_string().contains("p-9"));
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "code".to_string(),
        };
        assert_eq!(err.to_string(), "code is required");
    }

    #[test]
    fn test_conversions_into_core_error() {
        let core: CoreError = CatalogError::ProductNotFound("p-1".into()).into();
        assert!(matches!(core, CoreError::Catalog(_)));
        assert_eq!(core.to_string(), "Product not found: p-1");

        let core: CoreError = ValidationError::MustBePositive {
            field: "quantity".into(),
        }
        .into();
        assert!(matches!(core, CoreError::Validation(_)));
    }
}
