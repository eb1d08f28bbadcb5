//! `tarifa price`: price one product at a quantity.
//!
//! The product goes through a single-line cart, so quantity rules
//! (minimum, increment snapping) and pricing rules apply exactly as they
//! would inside a quotation. The family volume discount can only trigger
//! from this product's own boxes.

use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use tarifa_core::validation::validate_code;
use tarifa_core::{
    CartAggregate, CartPricing, CatalogAccessor, ClientTier, Money, PricingRule,
};
use tracing::debug;

use super::{write_json, Context};
use crate::cli::PriceArgs;
use crate::emit::format_currency;
use crate::error::{CliError, CliResult};
use crate::loader::ensure_active;

/// Result of the price command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceReport {
    pub code: String,
    pub description: String,
    pub tier: ClientTier,
    /// Quantity after snapping to the ordering increment.
    pub quantity: u32,
    pub rule: PricingRule,
    pub unit_price: Money,
    pub line_total: Money,
    pub discount_label: Option<String>,
}

fn rule_name(rule: PricingRule) -> &'static str {
    match rule {
        PricingRule::SpecialQuantity => "special quantity",
        PricingRule::FamilyVolume => "family volume",
        PricingRule::SpecialCatalog => "special catalog",
        PricingRule::Standard => "standard",
    }
}

/// Prices the product named by the arguments.
pub fn price(args: &PriceArgs, ctx: &Context) -> CliResult<PriceReport> {
    validate_code(&args.code)?;
    let product = ctx.catalog.find_by_code(args.code.trim())?;
    ensure_active(&product)?;

    let tier = args.tier.unwrap_or(ctx.config.quote.default_tier);
    let quantity = args
        .quantity
        .unwrap_or_else(|| ctx.engine.rules().increment_unit(&product));

    let mut cart = CartAggregate::new(Arc::clone(&ctx.engine), tier);
    cart.add_item(Arc::clone(&product), quantity, tier)?;

    let CartPricing {
        lines, failures, ..
    } = cart.compute_total();

    if let Some(failure) = failures.into_iter().next() {
        return Err(failure.into());
    }
    let Some(line) = lines.into_iter().next() else {
        return Err(CliError::not_found("Priced line", &product.code));
    };

    debug!(code = %product.code, rule = ?line.priced.rule, "Product priced");

    Ok(PriceReport {
        code: product.code.clone(),
        description: product.description.clone(),
        tier,
        quantity: line.quantity,
        rule: line.priced.rule,
        unit_price: Money::from_decimal(line.priced.unit_price),
        line_total: Money::from_decimal(line.line_total),
        discount_label: line.priced.discount_label,
    })
}

/// Runs the price command.
pub fn run(args: &PriceArgs, ctx: &Context, out: &mut dyn Write) -> CliResult<()> {
    let report = price(args, ctx)?;
    if ctx.json {
        return write_json(out, &report);
    }

    let symbol = &ctx.config.quote.currency_symbol;
    let badge = report
        .discount_label
        .as_deref()
        .map(|label| format!("  ({})", label))
        .unwrap_or_default();

    writeln!(out, "{}  {}", report.code, report.description).map_err(CliError::output)?;
    writeln!(
        out,
        "Tier: {}    Quantity: {}    Rule: {}",
        report.tier,
        report.quantity,
        rule_name(report.rule)
    )
    .map_err(CliError::output)?;
    writeln!(
        out,
        "Unit price: {}{}",
        format_currency(report.unit_price, symbol),
        badge
    )
    .map_err(CliError::output)?;
    writeln!(out, "Total: {}", format_currency(report.line_total, symbol))
        .map_err(CliError::output)
}
