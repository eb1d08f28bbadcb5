//! # Catalog Access
//!
//! Read-only lookup of products, by id, by code, or by filter.
//!
//! The pricing core never loads products itself: it receives them through
//! [`CatalogAccessor`]. [`InMemoryCatalog`] is the implementation used by
//! the CLI (fed from a JSON tariff file) and by tests.
//!
//! ## Loading
//! One malformed row never takes the whole tariff down. Rows failing
//! validation and repeated ids are skipped with a warning and kept as
//! diagnostics in [`InMemoryCatalog::rejected`].
//!
//! ## Listing Filter
//! ```text
//! list_products(filter)
//!   ├── inactive products        → always hidden
//!   ├── family / category / catalog   exact match (case-insensitive)
//!   ├── search_text              → code, description or EAN contains
//!   ├── promotions_for(tier)     → real promotion for that tier only
//!   └── result                   → sorted by code
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::types::{ClientTier, Product};
use crate::validation::validate_product;

// =============================================================================
// Product Filter
// =============================================================================

/// Criteria for [`CatalogAccessor::list_products`]. Empty fields match all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub family: Option<String>,
    pub category: Option<String>,
    pub catalog: Option<String>,
    pub search_text: Option<String>,
    pub promotions_for: Option<ClientTier>,
}

impl ProductFilter {
    /// Whether an (active) product satisfies every criterion.
    pub fn matches(&self, product: &Product) -> bool {
        fn same(wanted: &Option<String>, actual: &str) -> bool {
            wanted
                .as_deref()
                .map_or(true, |w| w.trim().eq_ignore_ascii_case(actual))
        }

        if !product.active {
            return false;
        }

        if !same(&self.family, &product.family)
            || !same(&self.category, &product.category)
            || !same(&self.catalog, &product.catalog)
        {
            return false;
        }

        if let Some(tier) = self.promotions_for {
            if !product.has_promotion_for(tier) {
                return false;
            }
        }

        match self.search_text.as_deref().map(|s| s.trim().to_lowercase()) {
            Some(needle) if !needle.is_empty() => {
                product.code.to_lowercase().contains(&needle)
                    || product.description.to_lowercase().contains(&needle)
                    || product
                        .ean
                        .as_deref()
                        .is_some_and(|ean| ean.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }
}

// =============================================================================
// Catalog Accessor
// =============================================================================

/// Read-only product provider.
pub trait CatalogAccessor: Send + Sync {
    /// Active products matching `filter`, sorted by code.
    fn list_products(&self, filter: &ProductFilter) -> Vec<Arc<Product>>;

    /// Looks up a product by id (inactive products included).
    fn find_product(&self, id: &str) -> CatalogResult<Arc<Product>>;

    /// Looks up a product by its human-facing code.
    fn find_by_code(&self, code: &str) -> CatalogResult<Arc<Product>>;

    /// Distinct, non-empty family names of active products, sorted.
    fn families(&self) -> Vec<String>;
}

// =============================================================================
// In-Memory Catalog
// =============================================================================

/// Catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    /// Sorted by code.
    products: Vec<Arc<Product>>,
    by_id: HashMap<String, usize>,
    by_code: HashMap<String, usize>,
    /// Rows left out while loading, in load order.
    rejected: Vec<CatalogError>,
}

impl InMemoryCatalog {
    /// Builds a catalog from tariff rows.
    ///
    /// Rows failing `validate_product` are skipped as `InvalidProduct`.
    /// When two rows share an id the first (by code) wins and the other is
    /// skipped as `DuplicateProduct`.
    pub fn new(products: Vec<Product>) -> Self {
        let mut products = products;
        products.sort_by(|a, b| a.code.cmp(&b.code).then_with(|| a.id.cmp(&b.id)));

        let mut catalog = InMemoryCatalog::default();

        for product in products {
            if let Err(source) = validate_product(&product) {
                warn!(id = %product.id, code = %product.code, error = %source, "Skipping invalid product");
                catalog.rejected.push(CatalogError::InvalidProduct {
                    id: product.id,
                    source,
                });
                continue;
            }

            if catalog.by_id.contains_key(&product.id) {
                warn!(id = %product.id, code = %product.code, "Skipping duplicate product id");
                catalog.rejected.push(CatalogError::DuplicateProduct(product.id));
                continue;
            }

            let index = catalog.products.len();
            catalog.by_id.insert(product.id.clone(), index);
            catalog.by_code.entry(product.code.clone()).or_insert(index);
            catalog.products.push(Arc::new(product));
        }

        debug!(
            products = catalog.products.len(),
            rejected = catalog.rejected.len(),
            "Catalog built"
        );
        catalog
    }

    /// Rows that were left out while building the catalog.
    pub fn rejected(&self) -> &[CatalogError] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl CatalogAccessor for InMemoryCatalog {
    fn list_products(&self, filter: &ProductFilter) -> Vec<Arc<Product>> {
        self.products
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect()
    }

    fn find_product(&self, id: &str) -> CatalogResult<Arc<Product>> {
        self.by_id
            .get(id)
            .map(|&i| Arc::clone(&self.products[i]))
            .ok_or_else(|| CatalogError::ProductNotFound(id.to_string()))
    }

    fn find_by_code(&self, code: &str) -> CatalogResult<Arc<Product>> {
        self.by_code
            .get(code.trim())
            .map(|&i| Arc::clone(&self.products[i]))
            .ok_or_else(|| CatalogError::ProductNotFound(code.to_string()))
    }

    fn families(&self) -> Vec<String> {
        self.products
            .iter()
            .filter(|p| p.active && !p.family.trim().is_empty())
            .map(|p| p.family.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
