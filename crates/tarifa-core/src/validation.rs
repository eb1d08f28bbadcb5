//! # Validation Module
//!
//! Input validation and quantity normalization.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Catalog load                                                 │
//! │  └── validate_product: id/code present, prices not negative,           │
//! │      percentages within 0..=100 (failing rows are skipped)             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Quantity entry (UI / order file)                             │
//! │  └── normalize_quantity: snap to the ordering increment                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Cart mutation                                                │
//! │  └── below one increment → CartError::BelowMinimumOrder               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tarifa_core::validation::{normalize_quantity, validate_code};
//!
//! assert!(validate_code("8757704").is_ok());
//!
//! // Increment 12: 20 snaps to 24, 5 is clamped up to 12
//! assert_eq!(normalize_quantity(20, 12), 24);
//! assert_eq!(normalize_quantity(5, 12), 12);
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::types::Product;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a product code.
const MAX_CODE_LEN: usize = 50;

/// Maximum length of a free-text search.
const MAX_SEARCH_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product code.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, digits, hyphens and underscores only
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (matches everything)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed, lowercased query.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > MAX_SEARCH_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_LEN,
        });
    }

    Ok(query.to_lowercase())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a discount percentage lies within `0..=100`.
pub fn validate_percentage(field: &str, pct: Decimal) -> ValidationResult<()> {
    if pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates a price is not negative.
fn validate_price(field: &str, price: Option<Decimal>) -> ValidationResult<()> {
    match price {
        Some(p) if p.is_sign_negative() && !p.is_zero() => Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Product Validation
// =============================================================================

/// Validates a catalog entry before it becomes visible to the cart.
///
/// Missing prices are allowed here: they are a pricing-time concern with a
/// defined fallback chain. Structural problems are not.
///
/// `min_order_qty` is not checked. The ordering step comes from
/// `PricingRules::increment_unit`, which is never below 1 and ignores the
/// field entirely for special catalogs.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    if product.id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    validate_code(&product.code)?;

    validate_percentage("baseDiscountPct", product.base_discount_pct)?;
    validate_percentage("custab.discountPct", product.custab.discount_pct)?;
    validate_percentage("partner.discountPct", product.partner.discount_pct)?;
    if let Some(pct) = product.promo_discount_pct {
        validate_percentage("promoDiscountPct", pct)?;
    }

    validate_price("listPrice", product.list_price)?;
    for (tier, pricing) in [("custab", &product.custab), ("partner", &product.partner)] {
        validate_price(&format!("{tier}.netPrice"), pricing.net_price)?;
        validate_price(&format!("{tier}.promoNetPrice"), pricing.promo_net_price)?;
    }

    Ok(())
}

// =============================================================================
// Quantity Normalization
// =============================================================================

/// Snaps a requested quantity to the nearest positive multiple of `increment`.
///
/// ## Rules
/// ```text
/// increment = 12
///
///   requested   multiples        result
///   ─────────   ──────────────   ──────
///        5      below one box      12   (clamped up)
///       17      12 ◄─ 17 ─ 24      12   (nearer)
///       18      12 ── 18 ─► 24     24   (half rounds up)
///      130      120 ◄─ 130 ─ 132  132
/// ```
///
/// An `increment` of 0 is treated as 1. Near `u32::MAX` the result is the
/// largest multiple that still fits, so it is always a multiple.
pub fn normalize_quantity(requested: u32, increment: u32) -> u32 {
    let increment = increment.max(1) as u64;
    let requested = requested as u64;

    // round(requested / increment) with half-up, in integers
    let multiplier = ((requested * 2 + increment) / (increment * 2)).max(1);
    let max_multiplier = u32::MAX as u64 / increment;

    (multiplier.min(max_multiplier) * increment) as u32
}

/// Whether `quantity` is a positive multiple of `increment`.
#[inline]
pub fn is_multiple_of_increment(quantity: u32, increment: u32) -> bool {
    let increment = increment.max(1);
    quantity >= increment && quantity % increment == 0
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::product;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_code() {
        assert!(validate_code("8757704").is_ok());
        assert!(validate_code("ABC_12-X").is_ok());

        assert!(validate_code("").is_err());
        assert!(validate_code("   ").is_err());
        assert!(validate_code("has space").is_err());
        assert!(validate_code(&"A".repeat(60)).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  Cristal ").unwrap(), "cristal");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_percentage() {
        assert!(validate_percentage("pct", dec!(0)).is_ok());
        assert!(validate_percentage("pct", dec!(100)).is_ok());
        assert!(validate_percentage("pct", dec!(100.01)).is_err());
        assert!(validate_percentage("pct", dec!(-1)).is_err());
    }

    #[test]
    fn test_validate_product() {
        let mut p = product("p-1", "8757704", "CRISTAL EXACT", dec!(10));
        assert!(validate_product(&p).is_ok());

        // No minimum in the data: the ordering step falls back to 1
        p.min_order_qty = 0;
        assert!(validate_product(&p).is_ok());

        p.code = "BIC 123/A".to_string();
        assert!(matches!(
            validate_product(&p),
            Err(ValidationError::InvalidFormat { .. })
        ));

        let mut p = product("p-1", "8757704", "CRISTAL EXACT", dec!(10));
        p.partner.net_price = Some(dec!(-2));
        assert!(validate_product(&p).is_err());

        // Missing prices are a pricing-time concern, not a catalog error
        let mut p = product("p-1", "8757704", "CRISTAL EXACT", dec!(10));
        p.custab.net_price = None;
        p.list_price = None;
        assert!(validate_product(&p).is_ok());
    }

    #[test]
    fn test_normalize_quantity() {
        assert_eq!(normalize_quantity(5, 12), 12);
        assert_eq!(normalize_quantity(0, 12), 12);
        assert_eq!(normalize_quantity(12, 12), 12);
        assert_eq!(normalize_quantity(17, 12), 12);
        assert_eq!(normalize_quantity(18, 12), 24);
        assert_eq!(normalize_quantity(130, 12), 132);
        assert_eq!(normalize_quantity(7, 1), 7);
        assert_eq!(normalize_quantity(7, 0), 7);
    }

    #[test]
    fn test_normalize_quantity_near_u32_max() {
        let top = normalize_quantity(u32::MAX, 12);
        assert_eq!(top, (u32::MAX / 12) * 12);
        assert!(is_multiple_of_increment(top, 12));

        assert_eq!(normalize_quantity(u32::MAX, 1), u32::MAX);
        assert!(is_multiple_of_increment(normalize_quantity(u32::MAX - 3, 50), 50));
    }

    #[test]
    fn test_is_multiple_of_increment() {
        assert!(is_multiple_of_increment(24, 12));
        assert!(!is_multiple_of_increment(18, 12));
        assert!(!is_multiple_of_increment(0, 12));
    }
}
