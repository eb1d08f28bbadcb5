//! # Pricing Engine
//!
//! Resolves the unit price of one product for one tier, given the cart-wide
//! family aggregates.
//!
//! ## Rule Order (first match wins)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Price Resolution                                │
//! │                                                                         │
//! │  product.code ∈ special_quantity_codes ?                                │
//! │      yes ─► qty < 120  → net                                           │
//! │             qty ≥ 120  → promo (fallback net)          [SpecialQuantity]│
//! │      no                                                                 │
//! │      ▼                                                                  │
//! │  product.family ∈ volume_promotable_families ?                          │
//! │      yes ─► family boxes ≥ 10 → net × 0.90, "-10%"                     │
//! │             otherwise         → net                       [FamilyVolume]│
//! │      no                                                                 │
//! │      ▼                                                                  │
//! │  product.catalog ∈ special_catalogs ?                                   │
//! │      yes ─► net, no discount display                   [SpecialCatalog] │
//! │      no                                                                 │
//! │      ▼                                                                  │
//! │  promo > 0 ? promo (labelled) : net                          [Standard] │
//! │                                                                         │
//! │  "net" is always: tier net price → list price → PricingDataError       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rules never stack: the family volume discount is taken off the plain net
//! price, not off a promo price the product might also carry.
//!
//! ## Rule Tables Are Data
//! Which codes, families and catalogs are special lives in [`PricingRules`],
//! injected into [`PricingEngine::new`]. The defaults reproduce the
//! production tariff; tests substitute small fixtures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use ts_rs::TS;
use tracing::debug;

use crate::error::{PricingDataError, ValidationError};
use crate::types::{ClientTier, Product};
use crate::validation::{validate_percentage, ValidationResult};

// =============================================================================
// Pricing Rules (configuration tables)
// =============================================================================

/// Membership tables and thresholds of the discount rules.
///
/// ## Example Config (TOML)
/// ```toml
/// [pricing]
/// special_quantity_codes = ["8757712", "9203013", "9339613"]
/// special_quantity_threshold = 120
/// box_increment_codes = ["8757704", "8757712", "9203013", "9339613"]
/// volume_promotable_families = ["CRISTAL EXACT", "CRISTAL FINE"]
/// volume_threshold_boxes = 10
/// volume_discount_pct = "10"
/// special_catalogs = ["DURACELL", "BLADE", "LIGHTERS"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRules {
    /// Codes priced by absolute quantity (gift-bundle promotions).
    #[serde(default = "default_special_quantity_codes")]
    pub special_quantity_codes: BTreeSet<String>,

    /// Units at which special codes switch to their promo price.
    #[serde(default = "default_special_quantity_threshold")]
    pub special_quantity_threshold: u32,

    /// Codes ordered in whole boxes (`units_per_box`) instead of `min_order_qty`.
    #[serde(default = "default_box_increment_codes")]
    pub box_increment_codes: BTreeSet<String>,

    /// Families eligible for the cross-product volume discount.
    #[serde(default = "default_volume_promotable_families")]
    pub volume_promotable_families: BTreeSet<String>,

    /// Boxes of one family needed to unlock the volume discount.
    #[serde(default = "default_volume_threshold_boxes")]
    pub volume_threshold_boxes: u32,

    /// Volume discount taken off the plain net price.
    #[serde(default = "default_volume_discount_pct")]
    pub volume_discount_pct: Decimal,

    /// Catalogs sold at plain net price in single units.
    #[serde(default = "default_special_catalogs")]
    pub special_catalogs: BTreeSet<String>,
}

fn string_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_special_quantity_codes() -> BTreeSet<String> {
    string_set(&["8757712", "9203013", "9339613"])
}

fn default_special_quantity_threshold() -> u32 {
    120
}

fn default_box_increment_codes() -> BTreeSet<String> {
    string_set(&["8757704", "8757712", "9203013", "9339613"])
}

fn default_volume_promotable_families() -> BTreeSet<String> {
    string_set(&[
        "CRISTAL EXACT",
        "CRISTAL FINE",
        "CRISTAL LARGE",
        "CRISTAL SOFT",
        "CRISTAL FUN",
        "CRISTAL UP",
        "PLASTIDECOR1",
    ])
}

fn default_volume_threshold_boxes() -> u32 {
    10
}

fn default_volume_discount_pct() -> Decimal {
    Decimal::TEN
}

fn default_special_catalogs() -> BTreeSet<String> {
    string_set(&["DURACELL", "BLADE", "LIGHTERS"])
}

impl Default for PricingRules {
    fn default() -> Self {
        PricingRules {
            special_quantity_codes: default_special_quantity_codes(),
            special_quantity_threshold: default_special_quantity_threshold(),
            box_increment_codes: default_box_increment_codes(),
            volume_promotable_families: default_volume_promotable_families(),
            volume_threshold_boxes: default_volume_threshold_boxes(),
            volume_discount_pct: default_volume_discount_pct(),
            special_catalogs: default_special_catalogs(),
        }
    }
}

impl PricingRules {
    /// Rules with empty tables: every product falls through to the standard rule.
    pub fn empty() -> Self {
        PricingRules {
            special_quantity_codes: BTreeSet::new(),
            box_increment_codes: BTreeSet::new(),
            volume_promotable_families: BTreeSet::new(),
            special_catalogs: BTreeSet::new(),
            ..PricingRules::default()
        }
    }

    /// Whether the code is priced by the absolute quantity threshold.
    pub fn is_special_quantity_code(&self, code: &str) -> bool {
        self.special_quantity_codes.contains(code)
    }

    /// Whether the family takes part in the volume promotion.
    pub fn is_volume_promotable(&self, family: &str) -> bool {
        self.volume_promotable_families.contains(family)
    }

    /// Whether the catalog uses simplified net pricing.
    pub fn is_special_catalog(&self, catalog: &str) -> bool {
        self.special_catalogs.contains(catalog)
    }

    /// The quantity step a cart line of this product grows and shrinks by.
    ///
    /// ```text
    /// special catalog          → 1 (catalog minimum is ignored)
    /// box-increment code       → units_per_box (min_order_qty when 0)
    /// everything else          → min_order_qty
    /// ```
    pub fn increment_unit(&self, product: &Product) -> u32 {
        if self.is_special_catalog(&product.catalog) {
            return 1;
        }

        if self.box_increment_codes.contains(&product.code) && product.units_per_box > 0 {
            return product.units_per_box;
        }

        product.min_order_qty.max(1)
    }

    /// Number of boxes `quantity` represents for this product.
    ///
    /// Cart quantities are kept at multiples of the increment unit, so this
    /// division is exact for every line in a cart.
    pub fn boxes_for(&self, product: &Product, quantity: u32) -> u32 {
        quantity / self.increment_unit(product)
    }

    /// Validates thresholds and percentages.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.special_quantity_threshold == 0 {
            return Err(ValidationError::MustBePositive {
                field: "special_quantity_threshold".to_string(),
            });
        }

        if self.volume_threshold_boxes == 0 {
            return Err(ValidationError::MustBePositive {
                field: "volume_threshold_boxes".to_string(),
            });
        }

        validate_percentage("volume_discount_pct", self.volume_discount_pct)
    }
}

// =============================================================================
// Family Aggregates
// =============================================================================

/// Per-family quantity totals across a whole cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FamilyTotals {
    /// Sum of line quantities (units).
    pub units: u64,
    /// Sum of line quantities expressed in boxes.
    pub boxes: u64,
}

/// Family → totals projection of a cart.
///
/// Never stored on the cart: it is rebuilt from the lines every time it is
/// needed so it cannot drift from them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FamilyAggregates(BTreeMap<String, FamilyTotals>);

impl FamilyAggregates {
    /// Creates an empty projection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one line's units and boxes to its family.
    pub fn record(&mut self, family: &str, units: u32, boxes: u32) {
        let totals = self.0.entry(family.to_string()).or_default();
        totals.units += units as u64;
        totals.boxes += boxes as u64;
    }

    /// Totals for a family (zero when absent).
    pub fn get(&self, family: &str) -> FamilyTotals {
        self.0.get(family).copied().unwrap_or_default()
    }

    /// Boxes accumulated by a family.
    pub fn boxes(&self, family: &str) -> u64 {
        self.get(family).boxes
    }

    /// Iterates families in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FamilyTotals)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// Priced Line
// =============================================================================

/// Which rule resolved a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PricingRule {
    SpecialQuantity,
    FamilyVolume,
    SpecialCatalog,
    Standard,
}

/// Outcome of pricing one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    /// Rule that produced the price.
    pub rule: PricingRule,

    /// Unit price at full precision.
    #[ts(type = "string")]
    pub unit_price: Decimal,

    /// Promotional/volume discount in effect, if any.
    #[ts(type = "string | null")]
    pub applied_discount_pct: Option<Decimal>,

    /// Badge shown next to the line, e.g. "-10%".
    pub discount_label: Option<String>,
}

impl PricedLine {
    fn plain(rule: PricingRule, unit_price: Decimal) -> Self {
        PricedLine {
            rule,
            unit_price,
            applied_discount_pct: None,
            discount_label: None,
        }
    }

    fn discounted(rule: PricingRule, unit_price: Decimal, pct: Option<Decimal>) -> Self {
        let pct = pct.filter(|p| *p > Decimal::ZERO);
        PricedLine {
            rule,
            unit_price,
            applied_discount_pct: pct,
            discount_label: pct.map(discount_label),
        }
    }

    /// Unit price × quantity, unrounded.
    pub fn line_total(&self, quantity: u32) -> Decimal {
        self.unit_price * Decimal::from(quantity)
    }
}

/// Formats a percentage as a badge: `10` → `"-10%"`, `12.50` → `"-12.5%"`.
pub fn discount_label(pct: Decimal) -> String {
    format!("-{}%", pct.normalize())
}

// =============================================================================
// Pricing Engine
// =============================================================================

/// Stateless price resolver over a fixed set of [`PricingRules`].
///
/// ## Usage
/// ```rust
/// use tarifa_core::pricing::{FamilyAggregates, PricingEngine, PricingRules};
/// # use tarifa_core::{ClientTier, Product, TierPricing};
/// # use rust_decimal::Decimal;
/// # let product = Product {
/// #     id: "p-1".into(), code: "A1".into(), description: "Pen".into(), ean: None,
/// #     family: "OTHER".into(), category: String::new(), catalog: String::new(),
/// #     list_price: None, base_discount_pct: Decimal::ZERO,
/// #     custab: TierPricing { net_price: Some(Decimal::new(250, 2)), ..Default::default() },
/// #     partner: TierPricing::default(), promo_discount_pct: None,
/// #     min_order_qty: 1, units_per_box: 0, active: true,
/// # };
///
/// let engine = PricingEngine::new(PricingRules::default());
/// let priced = engine
///     .price(&product, ClientTier::Custab, 1, &FamilyAggregates::new())
///     .unwrap();
/// assert_eq!(priced.unit_price, Decimal::new(250, 2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    rules: PricingRules,
}

impl PricingEngine {
    /// Creates an engine over the given rule tables.
    pub fn new(rules: PricingRules) -> Self {
        PricingEngine { rules }
    }

    /// The rule tables in use.
    pub fn rules(&self) -> &PricingRules {
        &self.rules
    }

    /// Resolves the unit price of `product` for `tier`.
    ///
    /// ## Arguments
    /// * `quantity` - the quantity of THIS line (special-code threshold)
    /// * `aggregates` - family totals of the WHOLE cart, this line included
    ///
    /// ## Errors
    /// `PricingDataError` when the rule needs a net price and neither the
    /// tier net price nor the list price exists.
    pub fn price(
        &self,
        product: &Product,
        tier: ClientTier,
        quantity: u32,
        aggregates: &FamilyAggregates,
    ) -> Result<PricedLine, PricingDataError> {
        let rules = &self.rules;
        let pricing = product.tier(tier);

        let priced = if rules.is_special_quantity_code(&product.code) {
            let net = net_or_list(product, tier)?;
            if quantity >= rules.special_quantity_threshold {
                match pricing.effective_promo() {
                    Some(promo) => PricedLine::discounted(
                        PricingRule::SpecialQuantity,
                        promo,
                        product.promo_discount_pct,
                    ),
                    None => PricedLine::plain(PricingRule::SpecialQuantity, net),
                }
            } else {
                PricedLine::plain(PricingRule::SpecialQuantity, net)
            }
        } else if rules.is_volume_promotable(&product.family) {
            let net = net_or_list(product, tier)?;
            let boxes = aggregates.boxes(&product.family);
            if boxes >= rules.volume_threshold_boxes as u64 {
                let pct = rules.volume_discount_pct;
                let discounted = net * (Decimal::ONE_HUNDRED - pct) / Decimal::ONE_HUNDRED;
                PricedLine::discounted(PricingRule::FamilyVolume, discounted, Some(pct))
            } else {
                PricedLine::plain(PricingRule::FamilyVolume, net)
            }
        } else if rules.is_special_catalog(&product.catalog) {
            PricedLine::plain(PricingRule::SpecialCatalog, net_or_list(product, tier)?)
        } else {
            match pricing.effective_promo() {
                Some(promo) => {
                    PricedLine::discounted(PricingRule::Standard, promo, product.promo_discount_pct)
                }
                None => PricedLine::plain(PricingRule::Standard, net_or_list(product, tier)?),
            }
        };

        debug!(
            product_id = %product.id,
            code = %product.code,
            %tier,
            quantity,
            rule = ?priced.rule,
            unit_price = %priced.unit_price,
            "Resolved unit price"
        );

        Ok(priced)
    }

    /// Prices a product as if it were alone in the cart with `quantity`.
    ///
    /// This is the "add to cart" preview: the family aggregate only contains
    /// the line itself.
    pub fn preview(
        &self,
        product: &Product,
        tier: ClientTier,
        quantity: u32,
    ) -> Result<PricedLine, PricingDataError> {
        let mut aggregates = FamilyAggregates::new();
        aggregates.record(
            &product.family,
            quantity,
            self.rules.boxes_for(product, quantity),
        );
        self.price(product, tier, quantity, &aggregates)
    }
}

/// Tier net price, falling back to the list price.
fn net_or_list(product: &Product, tier: ClientTier) -> Result<Decimal, PricingDataError> {
    product
        .tier(tier)
        .net_price
        .or(product.list_price)
        .ok_or_else(|| PricingDataError {
            product_id: product.id.clone(),
            code: product.code.clone(),
        })
}

// =============================================================================
// Unit Tests
// =============================================================================
