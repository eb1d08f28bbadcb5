//! # Money Module
//!
//! Provides the `Money` type for rounded, display-ready monetary values.
//!
//! ## Two Representations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  INSIDE THE ENGINE: rust_decimal::Decimal (full precision)             │
//! │    net 12.345 × 0.90 = 11.1105          (kept exactly)                 │
//! │    11.1105 × 120 units = 1333.26        (kept exactly)                 │
//! │                                                                         │
//! │  AT THE OUTPUT BOUNDARY: Money (integer cents)                         │
//! │    Money::from_decimal(11.1105)  → 11.11                               │
//! │    Money::from_decimal(1333.26)  → 1333.26                             │
//! │                                                                         │
//! │  Rounding happens ONCE, half-up, when a value leaves the engine.       │
//! │  Summing already-rounded unit prices over hundreds of lines would      │
//! │  compound the error; summing decimals and rounding the total does not. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use tarifa_core::money::Money;
//!
//! let unit = Money::from_decimal(Decimal::new(111105, 4)); // 11.1105
//! assert_eq!(unit.cents(), 1111);
//! assert_eq!(unit.to_string(), "11.11");
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value rounded to the smallest currency unit (cents).
///
/// ## Wire Format
/// Serialized as a string with exactly two decimals (`"1080.00"`), which is
/// what the quotation document prints. Deserialization accepts both strings
/// and JSON numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use tarifa_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.to_string(), "10.99");
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Rounds a full-precision decimal to cents, half away from zero.
    ///
    /// ## Rounding
    /// ```text
    /// 0.125 → 0.13     (half-up)
    /// 0.124 → 0.12
    /// -0.125 → -0.13   (symmetric for credits)
    /// ```
    ///
    /// Values beyond the `i64` cent range saturate.
    pub fn from_decimal(value: Decimal) -> Self {
        let cents = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            * Decimal::ONE_HUNDRED;
        match cents.to_i64() {
            Some(c) => Money(c),
            None if cents.is_sign_negative() => Money(i64::MIN),
            None => Money(i64::MAX),
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain two-decimal rendering without a currency symbol.
///
/// The symbol and its placement are a presentation concern of the emitter.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Ok(Money::from_decimal(value))
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
