//! # Quote Document
//!
//! The rounded, display-ready snapshot of a priced cart, and the emitter
//! seam that turns it into output.
//!
//! ## Document Flow
//! ```text
//! CartAggregate::compute_total()           (full precision)
//!        │
//!        ▼
//! QuoteDocument::from_pricing()            (rounded ONCE here)
//!   ├── lines[]       unit / line totals → Money
//!   ├── failures[]    products without a usable price
//!   └── grand_total   Money::from_decimal(pricing.total)
//!        │
//!        ▼
//! QuoteEmitter::emit()                     (JSON, text, PDF, ...)
//! ```
//!
//! `grand_total` is never the sum of the rounded line totals: the two can
//! differ by a cent on large carts, and the unrounded sum is authoritative.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use ts_rs::TS;

use crate::cart::{CartPricing, ResolvedLine};
use crate::error::PricingDataError;
use crate::money::Money;
use crate::pricing::PricingRule;
use crate::types::ClientTier;

/// Days a quotation stays valid unless configured otherwise.
pub const DEFAULT_VALIDITY_DAYS: u32 = 30;

// =============================================================================
// Quote Line
// =============================================================================

/// One printed line of the quotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLine {
    pub product_id: String,
    pub code: String,
    pub description: String,

    /// Tier this line was priced under.
    pub tier: ClientTier,

    #[ts(type = "string | null")]
    pub list_price: Option<Money>,

    #[ts(type = "string")]
    pub base_discount_pct: Decimal,

    #[ts(type = "string")]
    pub tier_discount_pct: Decimal,

    /// The product's own promotional percentage, whichever rule priced
    /// the line.
    #[ts(type = "string | null")]
    pub promo_discount_pct: Option<Decimal>,

    /// False for special catalogs, whose discounts are never printed.
    pub show_discounts: bool,

    #[ts(type = "string")]
    pub unit_price: Money,

    pub quantity: u32,

    /// Unit price × quantity, rounded once from full precision.
    #[ts(type = "string")]
    pub line_total: Money,

    pub discount_label: Option<String>,
}

impl From<&ResolvedLine> for QuoteLine {
    fn from(line: &ResolvedLine) -> Self {
        let product = &line.product;
        let show_discounts = line.priced.rule != PricingRule::SpecialCatalog;

        QuoteLine {
            product_id: product.id.clone(),
            code: product.code.clone(),
            description: product.description.clone(),
            tier: line.tier,
            list_price: product.list_price.map(Money::from_decimal),
            base_discount_pct: product.base_discount_pct,
            tier_discount_pct: product.tier(line.tier).discount_pct,
            promo_discount_pct: product.promo_discount_pct,
            show_discounts,
            unit_price: Money::from_decimal(line.priced.unit_price),
            quantity: line.quantity,
            line_total: Money::from_decimal(line.line_total),
            discount_label: line.priced.discount_label.clone(),
        }
    }
}

// =============================================================================
// Quote Failure
// =============================================================================

/// A cart line left out of the quotation because it could not be priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuoteFailure {
    pub product_id: String,
    pub code: String,
    pub reason: String,
}

impl From<&PricingDataError> for QuoteFailure {
    fn from(err: &PricingDataError) -> Self {
        QuoteFailure {
            product_id: err.product_id.clone(),
            code: err.code.clone(),
            reason: err.to_string(),
        }
    }
}

// =============================================================================
// Quote Document
// =============================================================================

/// Input of every [`QuoteEmitter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDocument {
    /// Active tier of the cart (document header).
    pub tier: ClientTier,

    #[ts(type = "string")]
    pub date: NaiveDate,

    #[ts(type = "string")]
    pub valid_until: NaiveDate,

    pub lines: Vec<QuoteLine>,

    pub failures: Vec<QuoteFailure>,

    #[ts(type = "string")]
    pub grand_total: Money,
}

impl QuoteDocument {
    /// Builds the document from a priced cart, lines in cart order.
    pub fn from_pricing(
        tier: ClientTier,
        pricing: &CartPricing,
        date: NaiveDate,
        validity_days: u32,
    ) -> Self {
        QuoteDocument {
            tier,
            date,
            valid_until: valid_until(date, validity_days),
            lines: pricing.lines.iter().map(QuoteLine::from).collect(),
            failures: pricing.failures.iter().map(QuoteFailure::from).collect(),
            grand_total: pricing.grand_total(),
        }
    }

    /// Sum of quantities over the printed lines.
    pub fn total_units(&self) -> u64 {
        self.lines.iter().map(|l| l.quantity as u64).sum()
    }

    /// Whether every cart line made it into the document.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

fn valid_until(date: NaiveDate, validity_days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(validity_days as u64))
        .unwrap_or(NaiveDate::MAX)
}

// =============================================================================
// Emitter
// =============================================================================

/// Consumes finished quotation documents.
///
/// Implementations decide the output format; the core only guarantees the
/// document is complete and rounded.
pub trait QuoteEmitter {
    type Error;

    fn emit(&mut self, document: &QuoteDocument) -> Result<(), Self::Error>;
}

/// Keeps every emitted document in memory.
#[derive(Debug, Clone, Default)]
pub struct CollectingEmitter {
    pub documents: Vec<QuoteDocument>,
}

impl QuoteEmitter for CollectingEmitter {
    type Error = Infallible;

    fn emit(&mut self, document: &QuoteDocument) -> Result<(), Self::Error> {
        self.documents.push(document.clone());
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartAggregate;
    use crate::pricing::PricingEngine;
    use crate::test_support::{fixture_rules, product};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cart() -> CartAggregate {
        CartAggregate::new(
            Arc::new(PricingEngine::new(fixture_rules())),
            ClientTier::Partner,
        )
    }

    #[test]
    fn test_document_header_and_validity() {
        let mut cart = cart();
        cart.add_item(product("p-1", "A1", "OTHER", dec!(2.50)), 12, ClientTier::Custab)
            .unwrap();

        let doc = cart.to_quote_document(date(2024, 3, 15), DEFAULT_VALIDITY_DAYS);
        assert_eq!(doc.tier, ClientTier::Partner);
        assert_eq!(doc.valid_until, date(2024, 4, 14));
        assert_eq!(doc.lines.len(), 1);
        assert_eq!(doc.lines[0].tier, ClientTier::Custab);
        assert_eq!(doc.grand_total, Money::from_cents(3000));
        assert!(doc.is_complete());
    }

    #[test]
    fn test_grand_total_is_not_sum_of_rounded_lines() {
        let mut cart = cart();
        // Three lines at 0.37 × 0.90 = 0.333 per unit, one box each
        for (id, code) in [("p-1", "A1"), ("p-2", "A2"), ("p-3", "A3")] {
            let mut p = product(id, code, "CRISTAL EXACT", dec!(0.37));
            p.min_order_qty = 1;
            p.units_per_box = 1;
            cart.add_item(p, 1, ClientTier::Partner).unwrap();
        }
        // Seven more boxes to cross the volume threshold
        let mut filler = product("p-4", "A4", "CRISTAL EXACT", dec!(0.37));
        filler.min_order_qty = 1;
        cart.add_item(filler, 7, ClientTier::Partner).unwrap();

        let doc = cart.to_quote_document(date(2024, 1, 1), 30);
        let rounded_sum: Money = doc.lines.iter().map(|l| l.line_total).sum();

        // 10 × 0.333 = 3.33 exactly; per line: 0.33 + 0.33 + 0.33 + 2.33
        assert_eq!(doc.grand_total, Money::from_cents(333));
        assert_eq!(rounded_sum, Money::from_cents(332));
    }

    #[test]
    fn test_promo_column_shows_product_percentage() {
        let mut pen = product("p-1", "A1", "CRISTAL EXACT", dec!(1.00));
        pen.promo_discount_pct = Some(dec!(25));

        let mut cart = cart();
        cart.add_item(pen, 120, ClientTier::Partner).unwrap();

        let doc = cart.to_quote_document(date(2024, 1, 1), 30);
        let line = &doc.lines[0];
        // Priced by the family volume rule, yet the column keeps the product value
        assert_eq!(line.discount_label.as_deref(), Some("-10%"));
        assert_eq!(line.promo_discount_pct, Some(dec!(25)));
        assert_eq!(line.unit_price, Money::from_cents(90));
    }

    #[test]
    fn test_special_catalog_line_hides_discounts() {
        let mut battery = product("p-d", "BAT1", "BATTERIES", dec!(4.00));
        battery.catalog = "DURACELL".to_string();

        let mut cart = cart();
        cart.add_item(battery, 2, ClientTier::Partner).unwrap();

        let doc = cart.to_quote_document(date(2024, 1, 1), 30);
        assert!(!doc.lines[0].show_discounts);
        assert_eq!(doc.lines[0].discount_label, None);
    }

    #[test]
    fn test_failures_are_listed() {
        let mut broken = product("p-x", "X1", "OTHER", dec!(1));
        broken.partner.net_price = None;
        broken.list_price = None;

        let mut cart = cart();
        cart.add_item(broken, 12, ClientTier::Partner).unwrap();

        let doc = cart.to_quote_document(date(2024, 1, 1), 30);
        assert!(doc.lines.is_empty());
        assert_eq!(doc.failures[0].product_id, "p-x");
        assert_eq!(doc.grand_total, Money::zero());
    }

    #[test]
    fn test_document_serializes_currency_as_strings() {
        let mut cart = cart();
        cart.add_item(product("p-1", "A1", "OTHER", dec!(2.5)), 12, ClientTier::Partner)
            .unwrap();

        let doc = cart.to_quote_document(date(2024, 3, 15), 30);
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["grandTotal"], "30.00");
        assert_eq!(json["validUntil"], "2024-04-14");
        assert_eq!(json["lines"][0]["unitPrice"], "2.50");
        assert_eq!(json["lines"][0]["listPrice"], "3.13");
    }

    #[test]
    fn test_collecting_emitter() {
        let cart = cart();
        let doc = cart.to_quote_document(date(2024, 1, 1), 30);

        let mut emitter = CollectingEmitter::default();
        emitter.emit(&doc).unwrap();
        assert_eq!(emitter.documents.len(), 1);
        assert_eq!(emitter.documents[0].total_units(), 0);
    }
}
