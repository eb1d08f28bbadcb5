//! `tarifa products`: filtered product listing with tier prices.

use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;
use tarifa_core::validation::validate_search_query;
use tarifa_core::{CatalogAccessor, ClientTier, Money, Product, ProductFilter, PricingRules};

use super::{write_json, Context};
use crate::cli::ProductsArgs;
use crate::emit::{format_currency, format_pct, truncate};
use crate::error::{CliError, CliResult};

/// One listed product, priced for the chosen tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRow {
    pub id: String,
    pub code: String,
    pub description: String,
    pub family: String,
    pub catalog: String,
    pub tier: ClientTier,
    pub list_price: Option<Money>,
    pub net_price: Option<Money>,
    /// Only when the product carries a real promotion for the tier.
    pub promo_net_price: Option<Money>,
    pub promo_discount_pct: Option<Decimal>,
    /// Quantity step of the product in a cart.
    pub increment_unit: u32,
}

impl ProductRow {
    fn new(product: &Product, tier: ClientTier, rules: &PricingRules) -> Self {
        let pricing = product.tier(tier);
        let on_promotion = product.has_promotion_for(tier);

        ProductRow {
            id: product.id.clone(),
            code: product.code.clone(),
            description: product.description.clone(),
            family: product.family.clone(),
            catalog: product.catalog.clone(),
            tier,
            list_price: product.list_price.map(Money::from_decimal),
            net_price: pricing.net_price.map(Money::from_decimal),
            promo_net_price: pricing
                .effective_promo()
                .filter(|_| on_promotion)
                .map(Money::from_decimal),
            promo_discount_pct: product.promo_discount_pct.filter(|_| on_promotion),
            increment_unit: rules.increment_unit(product),
        }
    }
}

/// Builds the catalog filter from the command line.
pub fn filter_from_args(args: &ProductsArgs) -> CliResult<ProductFilter> {
    let search_text = match args.search.as_deref() {
        Some(text) => Some(validate_search_query(text)?),
        None => None,
    };

    Ok(ProductFilter {
        family: args.family.clone(),
        category: args.category.clone(),
        catalog: args.in_catalog.clone(),
        search_text,
        promotions_for: args.promotions,
    })
}

/// Lists products matching the arguments.
pub fn run(args: &ProductsArgs, ctx: &Context, out: &mut dyn Write) -> CliResult<()> {
    let filter = filter_from_args(args)?;
    let tier = args
        .tier
        .or(args.promotions)
        .unwrap_or(ctx.config.quote.default_tier);

    let rows: Vec<ProductRow> = ctx
        .catalog
        .list_products(&filter)
        .iter()
        .map(|p| ProductRow::new(p, tier, ctx.engine.rules()))
        .collect();

    if ctx.json {
        return write_json(out, &rows);
    }

    let symbol = &ctx.config.quote.currency_symbol;
    let money = |m: Option<Money>| m.map(|m| format_currency(m, symbol)).unwrap_or_default();

    writeln!(
        out,
        "{:<10} {:<32} {:<18} {:>10} {:>10} {:>6} {:>5}",
        "Code", "Description", "Family", "Net", "Promo", "Promo%", "Step"
    )
    .map_err(CliError::output)?;

    for row in &rows {
        writeln!(
            out,
            "{:<10} {:<32} {:<18} {:>10} {:>10} {:>6} {:>5}",
            row.code,
            truncate(&row.description, 32),
            truncate(&row.family, 18),
            money(row.net_price),
            money(row.promo_net_price),
            row.promo_discount_pct.map(format_pct).unwrap_or_default(),
            row.increment_unit
        )
        .map_err(CliError::output)?;
    }

    writeln!(out, "{} product(s), {} prices", rows.len(), tier).map_err(CliError::output)
}
