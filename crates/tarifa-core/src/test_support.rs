//! Shared fixtures for unit tests.

use rust_decimal::Decimal;
use std::collections::BTreeSet;

use crate::pricing::PricingRules;
use crate::types::{Product, TierPricing};

/// An active product ordered in boxes of 12, with the same net price for
/// both tiers and a list price 25% above it.
pub fn product(id: &str, code: &str, family: &str, net: Decimal) -> Product {
    let tier = TierPricing {
        discount_pct: Decimal::ZERO,
        net_price: Some(net),
        promo_net_price: None,
    };

    Product {
        id: id.to_string(),
        code: code.to_string(),
        description: format!("{family} {code}"),
        ean: None,
        family: family.to_string(),
        category: "PENS".to_string(),
        catalog: "WRITING".to_string(),
        list_price: Some(net * Decimal::new(125, 2)),
        base_discount_pct: Decimal::new(20, 0),
        custab: tier.clone(),
        partner: tier,
        promo_discount_pct: None,
        min_order_qty: 12,
        units_per_box: 12,
        active: true,
    }
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Small rule tables: one special code, one box code, two promotable
/// families and one special catalog.
pub fn fixture_rules() -> PricingRules {
    PricingRules {
        special_quantity_codes: set(&["SPECIAL1"]),
        box_increment_codes: set(&["SPECIAL1", "BOX1"]),
        volume_promotable_families: set(&["CRISTAL EXACT", "CRISTAL FINE"]),
        special_catalogs: set(&["DURACELL"]),
        ..PricingRules::default()
    }
}
