//! # tarifa-core: Pricing Engine and Cart for Tarifa Quotations
//!
//! This crate is the **heart** of Tarifa. It resolves tier prices and
//! volume promotions, aggregates a cart, and produces the quotation
//! document. No I/O happens here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tarifa Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    tarifa-cli (owning context)                  │   │
//! │  │    config ──► JSON catalog ──► order file ──► JSON / text      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tarifa-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  catalog  │  │  pricing  │  │   cart    │  │   quote   │  │   │
//! │  │   │ Accessor  │─►│  Engine   │─►│ Aggregate │─►│ Document  │  │   │
//! │  │   │ InMemory  │  │  Rules    │  │  Lines    │  │ Emitter   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO FILES • NO NETWORK • DETERMINISTIC               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, TierPricing, ClientTier
//! - [`money`] - Rounded output amounts (cents)
//! - [`pricing`] - Rule tables, family aggregates, price resolution
//! - [`cart`] - Cart aggregate and its pricing
//! - [`quote`] - Quotation document and emitter trait
//! - [`catalog`] - Catalog accessor trait and in-memory catalog
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation and quantity normalization
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same cart, same rules, same document
//! 2. **Exact Decimals**: prices stay `Decimal` until they leave the engine
//! 3. **Round Once**: `Money` is produced only at the output boundary
//! 4. **Explicit Errors**: a missing price is an error, never a zero price
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use rust_decimal::Decimal;
//! use tarifa_core::{CartAggregate, ClientTier, PricingEngine, PricingRules, Product, TierPricing};
//!
//! let product = Product {
//!     id: "p-1".into(),
//!     code: "TEST1".into(),
//!     description: "Cristal Exact".into(),
//!     ean: None,
//!     family: "CRISTAL EXACT".into(),
//!     category: String::new(),
//!     catalog: String::new(),
//!     list_price: None,
//!     base_discount_pct: Decimal::ZERO,
//!     custab: TierPricing { net_price: Some(Decimal::TEN), ..Default::default() },
//!     partner: TierPricing::default(),
//!     promo_discount_pct: None,
//!     min_order_qty: 12,
//!     units_per_box: 12,
//!     active: true,
//! };
//!
//! let engine = Arc::new(PricingEngine::new(PricingRules::default()));
//! let mut cart = CartAggregate::new(engine, ClientTier::Custab);
//!
//! // 120 units = 10 boxes of CRISTAL EXACT: the volume discount applies
//! cart.add_item(product, 120, ClientTier::Custab).unwrap();
//! assert_eq!(cart.compute_total().grand_total().to_string(), "1080.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod pricing;
pub mod quote;
pub mod types;
pub mod validation;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{CartAggregate, CartLine, CartPricing, ResolvedLine};
pub use catalog::{CatalogAccessor, InMemoryCatalog, ProductFilter};
pub use error::{CartError, CatalogError, CoreError, PricingDataError, ValidationError};
pub use money::Money;
pub use pricing::{FamilyAggregates, PricedLine, PricingEngine, PricingRule, PricingRules};
pub use quote::{QuoteDocument, QuoteEmitter, QuoteLine, DEFAULT_VALIDITY_DAYS};
pub use types::*;
