//! # File Loading
//!
//! Reads the JSON tariff and order files the commands work on.
//!
//! ## Tariff File
//! Either a bare array of products or an object with a `products` array:
//! ```json
//! [
//!   {
//!     "id": "p-1", "code": "8757704", "description": "Cristal Exact blue",
//!     "family": "CRISTAL EXACT", "catalog": "WRITING",
//!     "listPrice": "12.50", "baseDiscountPct": "25",
//!     "custab": { "discountPct": "5", "netPrice": "8.91" },
//!     "partner": { "discountPct": "8", "netPrice": "8.63" },
//!     "minOrderQty": 12, "unitsPerBox": 12
//!   }
//! ]
//! ```
//!
//! ## Order File
//! ```json
//! {
//!   "tier": "custab",
//!   "lines": [
//!     { "code": "8757704", "quantity": 120 },
//!     { "code": "9203013", "quantity": 24, "tier": "partner" }
//!   ]
//! }
//! ```

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tarifa_core::{
    CartAggregate, CatalogAccessor, ClientTier, InMemoryCatalog, PricingEngine, Product,
};
use tracing::{debug, info, warn};

use crate::error::{CliError, CliResult, ErrorCode};

// =============================================================================
// JSON Helpers
// =============================================================================

fn read_json<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let contents = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
    serde_json::from_str(&contents).map_err(|e| CliError::io(path, e))
}

fn parse_json<T: DeserializeOwned>(what: &str, json: &str) -> CliResult<T> {
    serde_json::from_str(json)
        .map_err(|e| CliError::new(ErrorCode::IoError, format!("Invalid {}: {}", what, e)))
}

// =============================================================================
// Tariff
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum TariffFile {
    List(Vec<Product>),
    Wrapped { products: Vec<Product> },
}

impl TariffFile {
    fn into_products(self) -> Vec<Product> {
        match self {
            TariffFile::List(products) | TariffFile::Wrapped { products } => products,
        }
    }
}

fn build_catalog(tariff: TariffFile) -> InMemoryCatalog {
    let catalog = InMemoryCatalog::new(tariff.into_products());
    if !catalog.rejected().is_empty() {
        warn!(
            skipped = catalog.rejected().len(),
            "Some tariff rows were skipped"
        );
    }
    catalog
}

/// Loads a JSON tariff file.
///
/// Only an unreadable or malformed file fails. Individual rows that do
/// not validate are skipped and listed in `rejected()`.
pub fn load_catalog(path: &Path) -> CliResult<InMemoryCatalog> {
    info!(?path, "Loading catalog");
    let tariff: TariffFile = read_json(path)?;
    let catalog = build_catalog(tariff);
    info!(products = catalog.len(), "Catalog loaded");
    Ok(catalog)
}

/// Parses a tariff from a JSON string.
pub fn parse_catalog(json: &str) -> CliResult<InMemoryCatalog> {
    let tariff: TariffFile = parse_json("catalog", json)?;
    Ok(build_catalog(tariff))
}

// =============================================================================
// Order
// =============================================================================

/// One requested line of an order file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Product code as printed in the tariff.
    pub code: String,
    pub quantity: u32,
    /// Overrides the order tier for this line.
    #[serde(default)]
    pub tier: Option<ClientTier>,
}

/// A quotation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFile {
    #[serde(default)]
    pub tier: Option<ClientTier>,

    /// Quote date; today when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,

    pub lines: Vec<OrderLine>,
}

impl OrderFile {
    /// Reads an order file.
    pub fn load(path: &Path) -> CliResult<Self> {
        debug!(?path, "Loading order");
        read_json(path)
    }

    /// Parses an order from a JSON string.
    pub fn parse(json: &str) -> CliResult<Self> {
        parse_json("order", json)
    }

    /// Fills a cart with the order lines, in file order.
    ///
    /// ## Tier Resolution
    /// ```text
    /// cart tier = --tier  → order "tier"  → config default
    /// line tier = line "tier" → cart tier
    /// ```
    ///
    /// ## Errors
    /// The first line that cannot be added aborts the order: unknown code,
    /// inactive product, or quantity below the ordering increment.
    pub fn build_cart(
        &self,
        catalog: &dyn CatalogAccessor,
        engine: Arc<PricingEngine>,
        tier_override: Option<ClientTier>,
        default_tier: ClientTier,
    ) -> CliResult<CartAggregate> {
        let tier = tier_override.or(self.tier).unwrap_or(default_tier);
        let mut cart = CartAggregate::new(engine, tier);

        for (index, line) in self.lines.iter().enumerate() {
            let product = catalog.find_by_code(&line.code)?;
            ensure_active(&product)?;

            cart.add_item(product, line.quantity, line.tier.unwrap_or(tier))
                .map_err(|e| {
                    let err = CliError::from(e);
                    CliError::new(err.code, format!("Line {}: {}", index + 1, err.message))
                })?;
        }

        debug!(lines = cart.len(), %tier, "Order loaded into cart");
        Ok(cart)
    }
}

/// Inactive products can be looked up but never quoted.
pub fn ensure_active(product: &Product) -> CliResult<()> {
    if product.active {
        Ok(())
    } else {
        Err(CliError::validation(format!(
            "Product {} is inactive",
            product.code
        )))
    }
}
