//! Command line definition.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tarifa_core::ClientTier;

/// Tarifa - price products and build B2B quotations from a tariff
#[derive(Debug, Parser)]
#[command(name = "tarifa")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Tariff JSON file (overrides the configured catalog path)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List active products
    Products(ProductsArgs),

    /// List product families
    Families,

    /// Price one product
    Price(PriceArgs),

    /// Build a quotation from an order file
    Quote(QuoteArgs),
}

/// Arguments for the products command.
#[derive(Debug, Args)]
pub struct ProductsArgs {
    /// Only this family.
    #[arg(long)]
    pub family: Option<String>,

    /// Only this category.
    #[arg(long)]
    pub category: Option<String>,

    /// Only this catalog (e.g. DURACELL).
    #[arg(long = "in-catalog")]
    pub in_catalog: Option<String>,

    /// Text to find in code, description or EAN.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only products on promotion for this tier.
    #[arg(long, value_name = "TIER")]
    pub promotions: Option<ClientTier>,

    /// Tier whose prices are shown.
    #[arg(short, long)]
    pub tier: Option<ClientTier>,
}

/// Arguments for the price command.
#[derive(Debug, Args)]
pub struct PriceArgs {
    /// Product code.
    pub code: String,

    /// Client tier (default: configured tier).
    #[arg(short, long)]
    pub tier: Option<ClientTier>,

    /// Quantity (default: one ordering increment).
    #[arg(short, long)]
    pub quantity: Option<u32>,
}

/// Output format of a quotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum QuoteFormat {
    Json,
    #[default]
    Text,
}

/// Arguments for the quote command.
#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Order JSON file.
    pub order: PathBuf,

    /// Client tier for the whole order.
    #[arg(short, long)]
    pub tier: Option<ClientTier>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = QuoteFormat::Text)]
    pub format: QuoteFormat,

    /// Quote date, YYYY-MM-DD (default: order date, else today).
    #[arg(long)]
    pub date: Option<NaiveDate>,
}
