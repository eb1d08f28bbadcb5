//! # Command Implementations
//!
//! Each command receives the loaded [`Context`] and a writer for stdout.
//!
//! ```text
//! ┌──────────────┬───────────────────────────────┬────────────────────────┐
//! │ Command      │ Core operations               │ Output                 │
//! ├──────────────┼───────────────────────────────┼────────────────────────┤
//! │ products     │ CatalogAccessor::list_products│ table / JSON array     │
//! │ families     │ CatalogAccessor::families     │ list / JSON array      │
//! │ price        │ CartAggregate (single line)   │ summary / JSON object  │
//! │ quote        │ CartAggregate + QuoteDocument │ QuoteEmitter           │
//! └──────────────┴───────────────────────────────┴────────────────────────┘
//! ```

pub mod price;
pub mod products;
pub mod quote;

use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tarifa_core::{CatalogAccessor, InMemoryCatalog, PricingEngine};

use crate::config::AppConfig;
use crate::error::{CliError, CliResult};
use crate::loader::load_catalog;

/// Everything a command needs, loaded once per invocation.
pub struct Context {
    pub config: AppConfig,
    pub catalog: InMemoryCatalog,
    pub engine: Arc<PricingEngine>,
    /// `--json` was given.
    pub json: bool,
}

impl Context {
    /// Loads config, then the catalog it points to.
    pub fn load(
        config_path: Option<&Path>,
        catalog_override: Option<&Path>,
        json: bool,
    ) -> CliResult<Self> {
        let config = AppConfig::load(config_path)?;
        let catalog = load_catalog(&config.catalog_path(catalog_override)?)?;
        Ok(Context::new(config, catalog, json))
    }

    /// Builds a context from already loaded parts.
    pub fn new(config: AppConfig, catalog: InMemoryCatalog, json: bool) -> Self {
        let engine = Arc::new(PricingEngine::new(config.pricing.clone()));
        Context {
            config,
            catalog,
            engine,
            json,
        }
    }
}

/// Writes a value as pretty JSON followed by a newline.
pub(crate) fn write_json<T: Serialize>(out: &mut dyn Write, value: &T) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(CliError::output)?;
    writeln!(out).map_err(CliError::output)
}

/// Families command: one name per line.
pub fn families(ctx: &Context, out: &mut dyn Write) -> CliResult<()> {
    let families = ctx.catalog.families();
    if ctx.json {
        return write_json(out, &families);
    }

    for family in &families {
        writeln!(out, "{}", family).map_err(CliError::output)?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_context {
    use super::*;
    use crate::loader::parse_catalog;
    use crate::testdata::CATALOG_JSON;

    pub fn context(json: bool) -> Context {
        Context::new(
            AppConfig::default(),
            parse_catalog(CATALOG_JSON).unwrap(),
            json,
        )
    }

    pub fn run_to_string<F>(f: F) -> String
    where
        F: FnOnce(&mut dyn Write) -> CliResult<()>,
    {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }
}
