//! # Tarifa Entry Point
//!
//! ```text
//! tarifa products --family "CRISTAL EXACT"
//! tarifa price 8757712 --quantity 120
//! tarifa --catalog demos/tariff.json quote demos/order.json --tier partner
//! ```

use clap::Parser;
use tarifa_cli::cli::Cli;
use tracing::debug;

fn main() {
    let cli = Cli::parse();
    tarifa_cli::init_tracing(cli.verbose);

    let json = cli.json;
    if let Err(err) = tarifa_cli::run(cli) {
        debug!(code = %err.code, "Command failed");

        if json {
            match serde_json::to_string(&err) {
                Ok(body) => eprintln!("{}", body),
                Err(_) => eprintln!("{}", err),
            }
        } else {
            eprintln!("{}", err);
        }
        std::process::exit(1);
    }
}
