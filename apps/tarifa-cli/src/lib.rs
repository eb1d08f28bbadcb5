//! # Tarifa CLI
//!
//! Command line front end over `tarifa-core`: browse the tariff, price a
//! single product, and turn an order file into a quotation.
//!
//! ## Module Structure
//! ```text
//! tarifa_cli
//! ├── cli        - clap definition (global flags + subcommands)
//! ├── config     - AppConfig: defaults → TOML → TARIFA_* environment
//! ├── loader     - tariff and order JSON files
//! ├── commands/  - one module per subcommand, sharing a Context
//! ├── emit       - JSON and text QuoteEmitters
//! └── error      - CliError { code, message }
//! ```
//!
//! ## Output Streams
//! Results go to stdout. Logs and errors go to stderr, so
//! `tarifa --json quote order.json > quote.json` stays machine readable.

pub mod cli;
pub mod commands;
pub mod config;
pub mod emit;
pub mod error;
pub mod loader;

#[cfg(test)]
mod testdata;

use std::io::Write;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::Context;
use crate::error::{CliError, CliResult};

/// Initializes the tracing subscriber on stderr.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages from every crate
/// - `RUST_LOG=tarifa_core=trace` - Trace the pricing engine only
/// - Default: WARN, INFO for tarifa crates (DEBUG with `--verbose`)
pub fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,tarifa=debug"
    } else {
        "warn,tarifa=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the context and runs the selected command against stdout.
pub fn run(cli: Cli) -> CliResult<()> {
    let ctx = Context::load(cli.config.as_deref(), cli.catalog.as_deref(), cli.json)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    dispatch(&cli.command, &ctx, &mut out)?;
    out.flush().map_err(CliError::output)
}

/// Runs one command with an already loaded context.
pub fn dispatch(command: &Commands, ctx: &Context, out: &mut dyn Write) -> CliResult<()> {
    match command {
        Commands::Products(args) => commands::products::run(args, ctx, out),
        Commands::Families => commands::families(ctx, out),
        Commands::Price(args) => commands::price::run(args, ctx, out),
        Commands::Quote(args) => commands::quote::run(args, ctx, out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_context::{context, run_to_string};
    use clap::Parser;

    #[test]
    fn test_dispatch_parsed_command() {
        let cli = Cli::parse_from(["tarifa", "price", "TEST1", "--quantity", "24"]);
        let text = run_to_string(|out| dispatch(&cli.command, &context(false), out));
        assert!(text.contains("Quantity: 24"));
        assert!(text.trim_end().ends_with("Total: 240.00€"));
    }
}
