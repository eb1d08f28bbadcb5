//! `tarifa quote`: build a quotation from an order file.
//!
//! ## User Workflow
//! ```text
//! order.json ──► OrderFile ──► CartAggregate ──► QuoteDocument ──► emitter
//!                 (codes)       (quantities)      (priced lines)    (json|text)
//! ```
//!
//! Lines that cannot be priced are listed in the document and left out of
//! the total; the command still succeeds.

use chrono::{Local, NaiveDate};
use std::io::Write;
use std::sync::Arc;
use tarifa_core::{QuoteDocument, QuoteEmitter};
use tracing::{info, warn};

use super::Context;
use crate::cli::{QuoteArgs, QuoteFormat};
use crate::emit::{JsonEmitter, TextEmitter};
use crate::error::CliResult;
use crate::loader::OrderFile;

/// Prices an order into a quotation document.
///
/// The date is `--date`, else the order's `date`, else today.
pub fn build_document(
    order: &OrderFile,
    args: &QuoteArgs,
    ctx: &Context,
) -> CliResult<QuoteDocument> {
    let cart = order.build_cart(
        &ctx.catalog,
        Arc::clone(&ctx.engine),
        args.tier,
        ctx.config.quote.default_tier,
    )?;

    let date: NaiveDate = args
        .date
        .or(order.date)
        .unwrap_or_else(|| Local::now().date_naive());
    let document = cart.to_quote_document(date, ctx.config.quote.validity_days);

    if !document.is_complete() {
        warn!(
            failures = document.failures.len(),
            "Quotation has lines without a usable price"
        );
    }
    info!(
        lines = document.lines.len(),
        total = %document.grand_total,
        tier = %document.tier,
        "Quotation built"
    );

    Ok(document)
}

/// Runs the quote command.
pub fn run(args: &QuoteArgs, ctx: &Context, out: &mut dyn Write) -> CliResult<()> {
    let order = OrderFile::load(&args.order)?;
    let document = build_document(&order, args, ctx)?;

    let format = if ctx.json { QuoteFormat::Json } else { args.format };
    match format {
        QuoteFormat::Json => JsonEmitter::new(out).emit(&document),
        QuoteFormat::Text => {
            TextEmitter::new(out, ctx.config.quote.currency_symbol.as_str()).emit(&document)
        }
    }
}
