//! # Domain Types
//!
//! Catalog-side types shared by the pricing engine, the cart and the quote.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────────┐        ┌────────────────────────────┐        │
//! │  │       Product        │        │        TierPricing         │        │
//! │  │  ──────────────────  │ custab │  ────────────────────────  │        │
//! │  │  id / code / ean     │───────►│  discount_pct              │        │
//! │  │  family / catalog    │        │  net_price      (Option)   │        │
//! │  │  list_price (Option) │partner │  promo_net_price (Option)  │        │
//! │  │  min_order_qty       │───────►│                            │        │
//! │  │  units_per_box       │        └────────────────────────────┘        │
//! │  └──────────────────────┘                                               │
//! │                                                                         │
//! │  ┌──────────────────────┐                                               │
//! │  │     ClientTier       │   custab | partner                           │
//! │  └──────────────────────┘                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Untrusted Price Data
//! `net_price` is authoritative: it is NOT recomputed from `list_price` and
//! the discount percentages, because the source tariff does not keep them
//! consistent. Every price is optional and the engine owns the fallbacks.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Client Tier
// =============================================================================

/// Negotiated pricing class of the client a quote is prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ClientTier {
    /// Standard distributor tier.
    #[default]
    Custab,
    /// Partner tier with deeper negotiated discounts.
    Partner,
}

impl ClientTier {
    /// All tiers, in display order.
    pub const ALL: [ClientTier; 2] = [ClientTier::Custab, ClientTier::Partner];

    /// Lowercase identifier used on the wire and in file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientTier::Custab => "custab",
            ClientTier::Partner => "partner",
        }
    }
}

impl fmt::Display for ClientTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "custab" => Ok(ClientTier::Custab),
            "partner" => Ok(ClientTier::Partner),
            _ => Err(ValidationError::NotAllowed {
                field: "tier".to_string(),
                allowed: ClientTier::ALL.iter().map(|t| t.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Tier Pricing
// =============================================================================

/// Prices and second-level discount negotiated for one tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TierPricing {
    /// Tier discount applied after the base discount (display only).
    #[serde(default)]
    #[ts(type = "string")]
    pub discount_pct: Decimal,

    /// Net unit price after base + tier discounts.
    #[serde(default)]
    #[ts(type = "string | null")]
    pub net_price: Option<Decimal>,

    /// Standing promotional unit price, independent of quantity.
    #[serde(default)]
    #[ts(type = "string | null")]
    pub promo_net_price: Option<Decimal>,
}

impl TierPricing {
    /// Promo price when it is a usable override (present and above zero).
    ///
    /// The tariff stores "no promotion" both as null and as `0`; neither may
    /// ever price a line.
    pub fn effective_promo(&self) -> Option<Decimal> {
        self.promo_net_price.filter(|p| p.is_sign_positive() && !p.is_zero())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog entry as delivered by the catalog accessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Opaque unique identifier.
    pub id: String,

    /// Human-facing product code.
    pub code: String,

    /// Display text.
    pub description: String,

    /// Barcode, searchable.
    #[serde(default)]
    pub ean: Option<String>,

    /// Product family; drives family volume promotions.
    pub family: String,

    /// Category label.
    #[serde(default)]
    pub category: String,

    /// Catalog partition (e.g. "DURACELL").
    #[serde(default)]
    pub catalog: String,

    /// Base tariff price.
    #[serde(default)]
    #[ts(type = "string | null")]
    pub list_price: Option<Decimal>,

    /// First-tier discount applied to the list price (display only).
    #[serde(default)]
    #[ts(type = "string")]
    pub base_discount_pct: Decimal,

    /// Prices negotiated for the custab tier.
    #[serde(default)]
    pub custab: TierPricing,

    /// Prices negotiated for the partner tier.
    #[serde(default)]
    pub partner: TierPricing,

    /// Informational discount tied to the promo net prices.
    #[serde(default)]
    #[ts(type = "string | null")]
    pub promo_discount_pct: Option<Decimal>,

    /// Minimum orderable quantity and default ordering increment.
    pub min_order_qty: u32,

    /// Units per box; the increment for box-increment codes.
    #[serde(default)]
    pub units_per_box: u32,

    /// Inactive products are hidden from listings.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Product {
    /// Returns the pricing block for a tier.
    #[inline]
    pub fn tier(&self, tier: ClientTier) -> &TierPricing {
        match tier {
            ClientTier::Custab => &self.custab,
            ClientTier::Partner => &self.partner,
        }
    }

    /// Whether the product carries a real promotion for the tier.
    ///
    /// A promo price alone is not enough: the promo discount must also be
    /// above zero, otherwise the "promotion" is a data artefact.
    pub fn has_promotion_for(&self, tier: ClientTier) -> bool {
        self.tier(tier).effective_promo().is_some()
            && self
                .promo_discount_pct
                .is_some_and(|pct| pct > Decimal::ZERO)
    }
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
    fn test_client_tier_parse() {
        assert_eq!("custab".parse::<ClientTier>().unwrap(), ClientTier::Custab);
        assert_eq!(" PARTNER ".parse::<ClientTier>().unwrap(), ClientTier::Partner);
        assert!("retail".parse::<ClientTier>().is_err());
    }

    #[test]
    fn test_client_tier_serde_lowercase() {
        let json = serde_json::to_string(&ClientTier::Partner).unwrap();
        assert_eq!(json, "\"partner\"");
    }

    #[test]
    fn test_effective_promo_ignores_zero() {
        let mut pricing = TierPricing {
            net_price: Some(dec!(10)),
            promo_net_price: Some(dec!(0)),
            ..TierPricing::default()
        };
        assert_eq!(pricing.effective_promo(), None);

        pricing.promo_net_price = Some(dec!(8.5));
        assert_eq!(pricing.effective_promo(), Some(dec!(8.5)));
    }

    #[test]
    fn test_has_promotion_requires_pct() {
        let mut p = product("1", "C1", "FAM", dec!(10));
        p.custab.promo_net_price = Some(dec!(9));
        assert!(!p.has_promotion_for(ClientTier::Custab));

        p.promo_discount_pct = Some(dec!(10));
        assert!(p.has_promotion_for(ClientTier::Custab));
        assert!(!p.has_promotion_for(ClientTier::Partner));
    }

    #[test]
    fn test_product_deserializes_tariff_json() {
        let json = r#"{
            "id": "p-1",
            "code": "8757704",
            "description": "Cristal Exact blue",
            "family": "CRISTAL EXACT",
            "catalog": "WRITING",
            "listPrice": "12.50",
            "baseDiscountPct": 25,
            "custab": { "discountPct": 5, "netPrice": "8.91" },
            "partner": { "discountPct": 8, "netPrice": 8.63, "promoNetPrice": null },
            "minOrderQty": 12,
            "unitsPerBox": 12
        }"#;

        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.list_price, Some(dec!(12.50)));
        assert_eq!(p.tier(ClientTier::Partner).net_price, Some(dec!(8.63)));
        assert!(p.active);
        assert_eq!(p.promo_discount_pct, None);
    }
}
