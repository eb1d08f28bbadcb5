//! # Quote Emitters
//!
//! Output formats for a finished [`QuoteDocument`].
//!
//! - [`JsonEmitter`] - the document as pretty JSON (amounts as "0.00" strings)
//! - [`TextEmitter`] - a printable table, amounts suffixed with the currency
//!
//! PDF layout is left to the front end, which consumes the JSON form.

use rust_decimal::Decimal;
use std::io::Write;
use tarifa_core::{Money, QuoteDocument, QuoteEmitter};

use crate::error::{CliError, CliResult};

/// Width of the description column in text output.
const DESCRIPTION_WIDTH: usize = 28;

/// Footer printed under every text quotation.
pub const VAT_NOTE: &str = "* Prices exclude VAT.";

/// Placeholder for a column with nothing to show.
const NONE: &str = "-";

// =============================================================================
// Formatting Helpers
// =============================================================================

/// Formats an amount with the currency symbol after it: `1080.00€`.
pub fn format_currency(amount: Money, symbol: &str) -> String {
    format!("{}{}", amount, symbol)
}

/// Formats a percentage without trailing zeros: `12.50` → `12.5%`.
pub fn format_pct(pct: Decimal) -> String {
    format!("{}%", pct.normalize())
}

/// Cuts `text` to `width` characters, marking the cut with `…`.
pub(crate) fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

// =============================================================================
// JSON Emitter
// =============================================================================

/// Writes the document as pretty-printed JSON.
pub struct JsonEmitter<W: Write> {
    out: W,
}

impl<W: Write> JsonEmitter<W> {
    pub fn new(out: W) -> Self {
        JsonEmitter { out }
    }
}

impl<W: Write> QuoteEmitter for JsonEmitter<W> {
    type Error = CliError;

    fn emit(&mut self, document: &QuoteDocument) -> CliResult<()> {
        serde_json::to_writer_pretty(&mut self.out, document).map_err(CliError::output)?;
        writeln!(self.out).map_err(CliError::output)
    }
}

// =============================================================================
// Text Emitter
// =============================================================================

/// Writes the document as a plain-text table.
///
/// ## Layout
/// ```text
/// QUOTATION (custab)
/// Date: 2024-03-15    Valid until: 2024-04-14
///
/// Code       Description                       List   Base Client  Promo      Unit    Qty       Total
/// ----------------------------------------------------------------------------------------------------
/// TEST1      Cristal Exact azul              12.50€    20%     5%      -     9.00€     12     108.00€  -10%
/// TEST2      Cristal Exact negro             12.50€    20%     5%      -     9.00€    108     972.00€  -10%
///
/// Total: 1080.00€
/// * Prices exclude VAT.
/// ```
///
/// Special catalog lines print `-` in every discount column.
pub struct TextEmitter<W: Write> {
    out: W,
    currency_symbol: String,
}

impl<W: Write> TextEmitter<W> {
    pub fn new(out: W, currency_symbol: impl Into<String>) -> Self {
        TextEmitter {
            out,
            currency_symbol: currency_symbol.into(),
        }
    }

    fn money(&self, amount: Money) -> String {
        format_currency(amount, &self.currency_symbol)
    }

    fn write_document(&mut self, doc: &QuoteDocument) -> std::io::Result<()> {
        writeln!(self.out, "QUOTATION ({})", doc.tier)?;
        writeln!(
            self.out,
            "Date: {}    Valid until: {}",
            doc.date, doc.valid_until
        )?;
        writeln!(self.out)?;

        writeln!(
            self.out,
            "{:<10} {:<width$} {:>9} {:>6} {:>6} {:>6} {:>9} {:>6} {:>11}",
            "Code",
            "Description",
            "List",
            "Base",
            "Client",
            "Promo",
            "Unit",
            "Qty",
            "Total",
            width = DESCRIPTION_WIDTH
        )?;
        writeln!(self.out, "{}", "-".repeat(100))?;

        for line in &doc.lines {
            let pct = |value: Option<Decimal>| match value {
                Some(value) if line.show_discounts => format_pct(value),
                _ => NONE.to_string(),
            };
            let label = if line.show_discounts {
                line.discount_label.as_deref().unwrap_or("")
            } else {
                ""
            };
            let tier_note = if line.tier != doc.tier {
                format!(" [{}]", line.tier)
            } else {
                String::new()
            };
            let list = line
                .list_price
                .map(|price| self.money(price))
                .unwrap_or_else(|| NONE.to_string());

            writeln!(
                self.out,
                "{:<10} {:<width$} {:>9} {:>6} {:>6} {:>6} {:>9} {:>6} {:>11}  {}{}",
                line.code,
                truncate(&line.description, DESCRIPTION_WIDTH),
                list,
                pct(Some(line.base_discount_pct)),
                pct(Some(line.tier_discount_pct)),
                pct(line.promo_discount_pct),
                self.money(line.unit_price),
                line.quantity,
                self.money(line.line_total),
                label,
                tier_note,
                width = DESCRIPTION_WIDTH
            )?;
        }

        if !doc.failures.is_empty() {
            writeln!(self.out)?;
            writeln!(self.out, "Not priced (excluded from total):")?;
            for failure in &doc.failures {
                writeln!(self.out, "  {}  {}", failure.code, failure.reason)?;
            }
        }

        writeln!(self.out)?;
        writeln!(self.out, "Total: {}", self.money(doc.grand_total))?;
        writeln!(self.out, "{}", VAT_NOTE)?;
        Ok(())
    }
}

impl<W: Write> QuoteEmitter for TextEmitter<W> {
    type Error = CliError;

    fn emit(&mut self, document: &QuoteDocument) -> CliResult<()> {
        self.write_document(document).map_err(CliError::output)
    }
}
