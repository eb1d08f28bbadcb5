//! # Cart Aggregate
//!
//! The quotation being assembled: lines, the active tier, and the derived
//! pricing of the whole cart.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Agent Action             Operation                State Change         │
//! │  ────────────             ─────────                ────────────         │
//! │                                                                         │
//! │  Add product ───────────► add_item() ────────────► push / qty += n     │
//! │                                                                         │
//! │  Type quantity ─────────► update_quantity() ─────► qty = normalize(n)  │
//! │                                                                         │
//! │  Click + / - ───────────► increment_item() ──────► qty ± increment     │
//! │                           decrement_item()                              │
//! │                                                                         │
//! │  Click remove ──────────► remove_item() ─────────► line removed        │
//! │                                                                         │
//! │  New quote ─────────────► clear() ───────────────► lines emptied       │
//! │                                                                         │
//! │  View totals ───────────► compute_total() ───────► (read only)         │
//! │                                                                         │
//! │  NOTE: Rejected mutations leave the cart exactly as it was.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Derived, Never Stored
//! Family aggregates and prices are recomputed from the lines on every
//! `compute_total()`. Adding a line can move a whole family across the
//! volume threshold, which reprices lines that were already in the cart.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{CartError, CartResult, PricingDataError};
use crate::money::Money;
use crate::pricing::{FamilyAggregates, PricedLine, PricingEngine};
use crate::quote::QuoteDocument;
use crate::types::{ClientTier, Product};
use crate::validation::{is_multiple_of_increment, normalize_quantity};

// =============================================================================
// Cart Line
// =============================================================================

/// One product in the cart.
///
/// ## Design Notes
/// - `product` is shared with the catalog; the cart never mutates it
/// - `tier` is the tier the line was added under, kept when the cart's
///   active tier changes later
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product: Arc<Product>,
    pub quantity: u32,
    pub tier: ClientTier,
}

impl CartLine {
    /// Identifier of the product on this line.
    #[inline]
    pub fn product_id(&self) -> &str {
        &self.product.id
    }
}

// =============================================================================
// Cart Pricing
// =============================================================================

/// A cart line together with its resolved price.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLine {
    pub product: Arc<Product>,
    pub quantity: u32,
    pub tier: ClientTier,
    pub priced: PricedLine,
    /// Unit price × quantity, unrounded.
    pub line_total: Decimal,
}

/// Result of pricing the whole cart.
///
/// Lines whose product has no usable price are listed in `failures` and are
/// not part of `total`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPricing {
    pub lines: Vec<ResolvedLine>,
    pub failures: Vec<PricingDataError>,
    /// Sum of line totals at full precision.
    pub total: Decimal,
}

impl CartPricing {
    /// The total rounded once, for display.
    pub fn grand_total(&self) -> Money {
        Money::from_decimal(self.total)
    }

    /// Whether every line could be priced.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

// =============================================================================
// Cart Aggregate
// =============================================================================

/// The cart.
///
/// ## Invariants
/// - At most one line per product id (adding again increases quantity)
/// - Every quantity is a positive multiple of the product's increment unit
/// - Lines keep insertion order
#[derive(Debug, Clone)]
pub struct CartAggregate {
    engine: Arc<PricingEngine>,
    active_tier: ClientTier,
    lines: Vec<CartLine>,
}

impl CartAggregate {
    /// Creates an empty cart priced by `engine`.
    pub fn new(engine: Arc<PricingEngine>, active_tier: ClientTier) -> Self {
        CartAggregate {
            engine,
            active_tier,
            lines: Vec::new(),
        }
    }

    /// The engine pricing this cart.
    pub fn engine(&self) -> &PricingEngine {
        &self.engine
    }

    /// Tier used for the document header and as default for new lines.
    pub fn active_tier(&self) -> ClientTier {
        self.active_tier
    }

    /// Switches the active tier. Existing lines keep their own tier.
    pub fn set_active_tier(&mut self, tier: ClientTier) {
        debug!(from = %self.active_tier, to = %tier, "Active tier changed");
        self.active_tier = tier;
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for a product, if any.
    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id() == product_id)
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line quantities.
    pub fn total_units(&self) -> u64 {
        self.lines.iter().map(|l| l.quantity as u64).sum()
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.product_id() == product_id)
    }

    /// Returns the line after a mutation, checking it still holds a positive
    /// multiple of its increment.
    fn mutated(&self, index: usize) -> &CartLine {
        let line = &self.lines[index];
        debug_assert!(
            is_multiple_of_increment(
                line.quantity,
                self.engine.rules().increment_unit(&line.product)
            ),
            "cart line {} holds {} units",
            line.product_id(),
            line.quantity
        );
        line
    }

    fn below_minimum(product: &Product, requested: u32, minimum: u32) -> CartError {
        warn!(
            product_id = %product.id,
            code = %product.code,
            requested,
            minimum,
            "Quantity below ordering increment rejected"
        );
        CartError::BelowMinimumOrder {
            product_id: product.id.clone(),
            code: product.code.clone(),
            requested,
            minimum,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a product, or increases the quantity of its existing line.
    ///
    /// ## Behavior
    /// - `quantity` below one increment: rejected, cart unchanged
    /// - otherwise snapped to the nearest multiple of the increment
    /// - product already in cart: quantity added, original tier kept
    ///
    /// ## Returns
    /// The line as it is after the mutation.
    pub fn add_item(
        &mut self,
        product: impl Into<Arc<Product>>,
        quantity: u32,
        tier: ClientTier,
    ) -> CartResult<&CartLine> {
        let product = product.into();
        let increment = self.engine.rules().increment_unit(&product);

        if quantity < increment {
            return Err(Self::below_minimum(&product, quantity, increment));
        }

        let normalized = normalize_quantity(quantity, increment);

        let index = match self.position(&product.id) {
            Some(index) => {
                let line = &mut self.lines[index];
                line.quantity = line.quantity.checked_add(normalized).ok_or_else(|| {
                    CartError::QuantityOverflow {
                        product_id: product.id.clone(),
                    }
                })?;
                debug!(
                    product_id = %product.id,
                    added = normalized,
                    quantity = line.quantity,
                    "Cart line quantity increased"
                );
                index
            }
            None => {
                debug!(
                    product_id = %product.id,
                    code = %product.code,
                    quantity = normalized,
                    %tier,
                    "Cart line added"
                );
                self.lines.push(CartLine {
                    product,
                    quantity: normalized,
                    tier,
                });
                self.lines.len() - 1
            }
        };

        Ok(self.mutated(index))
    }

    /// Removes a product's line. Returns the removed line, if there was one.
    pub fn remove_item(&mut self, product_id: &str) -> Option<CartLine> {
        let index = self.position(product_id)?;
        let line = self.lines.remove(index);
        debug!(product_id, "Cart line removed");
        Some(line)
    }

    /// Sets an absolute quantity, snapped to the increment.
    ///
    /// ## Errors
    /// - `LineNotFound` when the product is not in the cart
    /// - `BelowMinimumOrder` when `quantity` is under one increment; the
    ///   line keeps its current quantity
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> CartResult<&CartLine> {
        let index = self
            .position(product_id)
            .ok_or_else(|| CartError::LineNotFound(product_id.to_string()))?;

        let increment = self.engine.rules().increment_unit(&self.lines[index].product);
        if quantity < increment {
            return Err(Self::below_minimum(
                &self.lines[index].product,
                quantity,
                increment,
            ));
        }

        let line = &mut self.lines[index];
        line.quantity = normalize_quantity(quantity, increment);
        debug!(product_id, quantity = line.quantity, "Cart line quantity set");

        Ok(self.mutated(index))
    }

    /// Adds one increment unit to a line.
    pub fn increment_item(&mut self, product_id: &str) -> CartResult<&CartLine> {
        let index = self
            .position(product_id)
            .ok_or_else(|| CartError::LineNotFound(product_id.to_string()))?;

        let increment = self.engine.rules().increment_unit(&self.lines[index].product);
        let line = &mut self.lines[index];
        line.quantity = line
            .quantity
            .checked_add(increment)
            .ok_or_else(|| CartError::QuantityOverflow {
                product_id: product_id.to_string(),
            })?;
        debug!(product_id, quantity = line.quantity, "Cart line incremented");

        Ok(self.mutated(index))
    }

    /// Removes one increment unit from a line.
    ///
    /// A line never drops below one increment: use `remove_item` for that.
    pub fn decrement_item(&mut self, product_id: &str) -> CartResult<&CartLine> {
        let index = self
            .position(product_id)
            .ok_or_else(|| CartError::LineNotFound(product_id.to_string()))?;

        let increment = self.engine.rules().increment_unit(&self.lines[index].product);
        let requested = self.lines[index].quantity.saturating_sub(increment);
        if requested < increment {
            return Err(Self::below_minimum(
                &self.lines[index].product,
                requested,
                increment,
            ));
        }

        let line = &mut self.lines[index];
        line.quantity = requested;
        debug!(product_id, quantity = line.quantity, "Cart line decremented");

        Ok(self.mutated(index))
    }

    /// Empties the cart. The active tier is kept.
    pub fn clear(&mut self) {
        debug!(lines = self.lines.len(), "Cart cleared");
        self.lines.clear();
    }

    // =========================================================================
    // Derived State
    // =========================================================================

    /// Per-family units and boxes over the current lines.
    pub fn compute_family_aggregates(&self) -> FamilyAggregates {
        let rules = self.engine.rules();
        let mut aggregates = FamilyAggregates::new();

        for line in &self.lines {
            aggregates.record(
                &line.product.family,
                line.quantity,
                rules.boxes_for(&line.product, line.quantity),
            );
        }

        aggregates
    }

    /// Prices every line with its own tier against the cart-wide aggregates.
    ///
    /// ## Algorithm
    /// ```text
    /// 1. aggregates = compute_family_aggregates()
    /// 2. for each line:
    ///      priced = engine.price(product, line.tier, qty, aggregates)
    ///      ok  → total += unit_price × qty
    ///      err → failures.push(err)
    /// 3. total stays unrounded; round with CartPricing::grand_total()
    /// ```
    pub fn compute_total(&self) -> CartPricing {
        let aggregates = self.compute_family_aggregates();
        let mut pricing = CartPricing::default();

        for line in &self.lines {
            match self
                .engine
                .price(&line.product, line.tier, line.quantity, &aggregates)
            {
                Ok(priced) => {
                    let line_total = priced.line_total(line.quantity);
                    pricing.total += line_total;
                    pricing.lines.push(ResolvedLine {
                        product: Arc::clone(&line.product),
                        quantity: line.quantity,
                        tier: line.tier,
                        priced,
                        line_total,
                    });
                }
                Err(err) => {
                    warn!(
                        product_id = %err.product_id,
                        code = %err.code,
                        "Line excluded from total: no usable price"
                    );
                    pricing.failures.push(err);
                }
            }
        }

        debug!(
            lines = pricing.lines.len(),
            failures = pricing.failures.len(),
            total = %pricing.total,
            "Cart priced"
        );

        pricing
    }

    /// Builds the quotation document for the current cart.
    pub fn to_quote_document(&self, date: NaiveDate, validity_days: u32) -> QuoteDocument {
        QuoteDocument::from_pricing(
            self.active_tier,
            &self.compute_total(),
            date,
            validity_days,
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PricingRule;
    use crate::test_support::{fixture_rules, product};
    use rust_decimal_macros::dec;

    fn cart() -> CartAggregate {
        CartAggregate::new(
            Arc::new(PricingEngine::new(fixture_rules())),
            ClientTier::Custab,
        )
    }

    fn total_of(cart: &CartAggregate) -> Money {
        cart.compute_total().grand_total()
    }

    #[test]
    fn test_cristal_exact_scenario() {
        let mut cart = cart();
        let test1 = Arc::new(product("p-1", "TEST1", "CRISTAL EXACT", dec!(10.00)));

        let err = cart
            .add_item(Arc::clone(&test1), 8, ClientTier::Custab)
            .unwrap_err();
        assert_eq!(
            err,
            CartError::BelowMinimumOrder {
                product_id: "p-1".to_string(),
                code: "TEST1".to_string(),
                requested: 8,
                minimum: 12,
            }
        );
        assert!(cart.is_empty());

        cart.add_item(Arc::clone(&test1), 12, ClientTier::Custab)
            .unwrap();
        assert_eq!(total_of(&cart), Money::from_cents(12000));

        let test2 = product("p-2", "TEST2", "CRISTAL EXACT", dec!(10.00));
        cart.add_item(test2, 108, ClientTier::Custab).unwrap();

        // 10 boxes in the family: every line of it is repriced at 9.00
        assert_eq!(cart.compute_family_aggregates().boxes("CRISTAL EXACT"), 10);
        assert_eq!(total_of(&cart), Money::from_cents(108000));

        let pricing = cart.compute_total();
        assert!(pricing
            .lines
            .iter()
            .all(|l| l.priced.discount_label.as_deref() == Some("-10%")));
    }

    #[test]
    fn test_adding_same_product_reaches_threshold() {
        let mut cart = cart();
        let test1 = Arc::new(product("p-1", "TEST1", "CRISTAL EXACT", dec!(10.00)));

        cart.add_item(Arc::clone(&test1), 12, ClientTier::Custab)
            .unwrap();
        let line = cart.add_item(test1, 108, ClientTier::Custab).unwrap();
        assert_eq!(line.quantity, 120);
        assert_eq!(cart.len(), 1);
        assert_eq!(total_of(&cart), Money::from_cents(108000));
    }

    #[test]
    fn test_single_line_total_is_unit_price_times_minimum() {
        let cart_engine = PricingEngine::new(fixture_rules());
        let p = product("p-1", "A1", "OTHER", dec!(1.37));

        let mut cart = cart();
        cart.add_item(p.clone(), 12, ClientTier::Custab).unwrap();

        let unit = cart_engine
            .price(&p, ClientTier::Custab, 12, &FamilyAggregates::new())
            .unwrap()
            .unit_price;
        assert_eq!(cart.compute_total().total, unit * dec!(12));
        assert_eq!(total_of(&cart), Money::from_cents(1644));
    }

    #[test]
    fn test_compute_is_idempotent() {
        let mut cart = cart();
        cart.add_item(product("p-1", "A1", "CRISTAL EXACT", dec!(3.10)), 60, ClientTier::Custab)
            .unwrap();
        cart.add_item(product("p-2", "A2", "OTHER", dec!(0.99)), 24, ClientTier::Partner)
            .unwrap();

        assert_eq!(cart.compute_family_aggregates(), cart.compute_family_aggregates());
        assert_eq!(cart.compute_total(), cart.compute_total());
    }

    #[test]
    fn test_line_order_does_not_change_total() {
        let products = vec![
            (product("p-1", "A1", "CRISTAL EXACT", dec!(3.33)), 48),
            (product("p-2", "A2", "CRISTAL EXACT", dec!(1.17)), 36),
            (product("p-3", "A3", "CRISTAL FINE", dec!(2.05)), 24),
            (product("p-4", "A4", "OTHER", dec!(0.37)), 60),
            (product("p-5", "A5", "CRISTAL EXACT", dec!(7.89)), 36),
        ];

        let mut forward = cart();
        for (p, qty) in products.iter() {
            forward.add_item(p.clone(), *qty, ClientTier::Custab).unwrap();
        }

        let mut backward = cart();
        for (p, qty) in products.iter().rev() {
            backward.add_item(p.clone(), *qty, ClientTier::Custab).unwrap();
        }

        // 4 + 3 + 3 = 10 boxes of CRISTAL EXACT in both orders
        assert_eq!(forward.compute_family_aggregates().boxes("CRISTAL EXACT"), 10);
        assert_eq!(forward.compute_total().total, backward.compute_total().total);
        assert_eq!(total_of(&forward), total_of(&backward));
    }

    #[test]
    fn test_volume_threshold_at_exactly_ten_boxes() {
        let mut cart = cart();
        cart.add_item(product("p-1", "A1", "CRISTAL FINE", dec!(5.00)), 108, ClientTier::Custab)
            .unwrap();
        assert_eq!(total_of(&cart), Money::from_cents(54000));

        cart.increment_item("p-1").unwrap();
        let pricing = cart.compute_total();
        assert_eq!(pricing.lines[0].priced.unit_price, dec!(4.50));
        assert_eq!(pricing.grand_total(), Money::from_cents(54000));
    }

    #[test]
    fn test_special_code_boundary_in_cart() {
        let mut special = product("p-s", "SPECIAL1", "OTHER", dec!(2.00));
        special.min_order_qty = 1;
        special.units_per_box = 1;
        special.custab.promo_net_price = Some(dec!(1.50));
        special.promo_discount_pct = Some(dec!(25));

        let mut cart = cart();
        cart.add_item(special, 119, ClientTier::Custab).unwrap();
        assert_eq!(total_of(&cart), Money::from_cents(23800));

        cart.increment_item("p-s").unwrap();
        let pricing = cart.compute_total();
        assert_eq!(pricing.lines[0].priced.rule, PricingRule::SpecialQuantity);
        assert_eq!(pricing.grand_total(), Money::from_cents(18000));
    }

    #[test]
    fn test_add_item_normalizes_quantity() {
        let mut cart = cart();
        let line = cart
            .add_item(product("p-1", "A1", "OTHER", dec!(1)), 20, ClientTier::Custab)
            .unwrap();
        assert_eq!(line.quantity, 24);
    }

    #[test]
    fn test_add_existing_keeps_original_tier() {
        let mut cart = cart();
        let p = Arc::new(product("p-1", "A1", "OTHER", dec!(1)));

        cart.add_item(Arc::clone(&p), 12, ClientTier::Partner).unwrap();
        let line = cart.add_item(p, 12, ClientTier::Custab).unwrap();
        assert_eq!(line.tier, ClientTier::Partner);
        assert_eq!(line.quantity, 24);
    }

    #[test]
    fn test_lines_are_priced_with_their_own_tier() {
        let mut p = product("p-1", "A1", "OTHER", dec!(4.00));
        p.partner.net_price = Some(dec!(3.00));

        let mut cart = cart();
        cart.add_item(p, 12, ClientTier::Partner).unwrap();
        cart.set_active_tier(ClientTier::Custab);

        assert_eq!(total_of(&cart), Money::from_cents(3600));
        assert_eq!(cart.active_tier(), ClientTier::Custab);
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = cart();
        cart.add_item(product("p-1", "A1", "OTHER", dec!(1)), 12, ClientTier::Custab)
            .unwrap();

        assert_eq!(cart.update_quantity("p-1", 50).unwrap().quantity, 48);

        let err = cart.update_quantity("p-1", 5).unwrap_err();
        assert!(matches!(err, CartError::BelowMinimumOrder { minimum: 12, .. }));
        assert_eq!(cart.line("p-1").unwrap().quantity, 48);

        assert_eq!(
            cart.update_quantity("missing", 12).unwrap_err(),
            CartError::LineNotFound("missing".to_string())
        );
    }

    #[test]
    fn test_decrement_never_goes_below_one_increment() {
        let mut cart = cart();
        cart.add_item(product("p-1", "A1", "OTHER", dec!(1)), 24, ClientTier::Custab)
            .unwrap();

        assert_eq!(cart.decrement_item("p-1").unwrap().quantity, 12);
        assert!(cart.decrement_item("p-1").is_err());
        assert_eq!(cart.line("p-1").unwrap().quantity, 12);
    }

    #[test]
    fn test_box_increment_code_steps_by_box() {
        let mut boxed = product("p-b", "BOX1", "OTHER", dec!(1));
        boxed.min_order_qty = 6;
        boxed.units_per_box = 24;

        let mut cart = cart();
        assert!(cart.add_item(boxed.clone(), 12, ClientTier::Custab).is_err());
        assert_eq!(cart.add_item(boxed, 30, ClientTier::Custab).unwrap().quantity, 24);
        assert_eq!(cart.increment_item("p-b").unwrap().quantity, 48);
    }

    #[test]
    fn test_special_catalog_orders_single_units() {
        let mut battery = product("p-d", "BAT1", "BATTERIES", dec!(4.00));
        battery.catalog = "DURACELL".to_string();
        battery.min_order_qty = 10;

        let mut cart = cart();
        assert_eq!(cart.add_item(battery, 3, ClientTier::Custab).unwrap().quantity, 3);
        assert_eq!(total_of(&cart), Money::from_cents(1200));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = cart();
        cart.add_item(product("p-1", "A1", "OTHER", dec!(1)), 12, ClientTier::Custab)
            .unwrap();
        cart.add_item(product("p-2", "A2", "OTHER", dec!(1)), 12, ClientTier::Custab)
            .unwrap();

        assert_eq!(cart.remove_item("p-1").unwrap().product_id(), "p-1");
        assert!(cart.remove_item("p-1").is_none());
        assert_eq!(cart.len(), 1);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.compute_total().total, Decimal::ZERO);
    }

    #[test]
    fn test_unpriceable_line_is_reported_not_zeroed() {
        let mut broken = product("p-x", "X1", "OTHER", dec!(1));
        broken.custab.net_price = None;
        broken.list_price = None;

        let mut cart = cart();
        cart.add_item(product("p-1", "A1", "OTHER", dec!(2.00)), 12, ClientTier::Custab)
            .unwrap();
        cart.add_item(broken, 12, ClientTier::Custab).unwrap();

        let pricing = cart.compute_total();
        assert_eq!(pricing.lines.len(), 1);
        assert_eq!(pricing.failures.len(), 1);
        assert_eq!(pricing.failures[0].product_id, "p-x");
        assert!(!pricing.is_complete());
        assert_eq!(pricing.grand_total(), Money::from_cents(2400));
    }

    #[test]
    fn test_total_units() {
        let mut cart = cart();
        cart.add_item(product("p-1", "A1", "OTHER", dec!(1)), 12, ClientTier::Custab)
            .unwrap();
        cart.add_item(product("p-2", "A2", "OTHER", dec!(1)), 36, ClientTier::Custab)
            .unwrap();
        assert_eq!(cart.total_units(), 48);
    }
}
