//! # Application Configuration
//!
//! Where the tariff lives, the pricing rule tables, and quotation defaults.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command line (highest priority)                                    │
//! │     --catalog tariff.json                                              │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     TARIFA_CATALOG_PATH=/srv/tarifa/tariff.json                        │
//! │     TARIFA_DEFAULT_TIER=partner                                        │
//! │     TARIFA_VALIDITY_DAYS=15                                            │
//! │     TARIFA_VOLUME_THRESHOLD_BOXES=12                                   │
//! │                                                                         │
//! │  3. TOML Config File (--config, or the platform config dir)            │
//! │     ~/.config/tarifa/tarifa.toml (Linux)                               │
//! │     ~/Library/Application Support/com.tarifa.tarifa/tarifa.toml        │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! │     production rule tables, custab, 30 days                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # tarifa.toml
//! [catalog]
//! path = "tariff.json"
//!
//! [pricing]
//! special_quantity_threshold = 120
//! volume_threshold_boxes = 10
//! volume_discount_pct = "10"
//! special_catalogs = ["DURACELL", "BLADE", "LIGHTERS"]
//!
//! [quote]
//! default_tier = "custab"
//! validity_days = 30
//! currency_symbol = "€"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tarifa_core::{ClientTier, PricingRules, DEFAULT_VALIDITY_DAYS};
use tracing::{debug, info, warn};

use crate::error::{CliError, CliResult};

/// Name of the config file inside the platform config directory.
const CONFIG_FILE_NAME: &str = "tarifa.toml";

// =============================================================================
// Catalog Settings
// =============================================================================

/// Where to load the product tariff from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// JSON file holding an array of products.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// =============================================================================
// Quote Settings
// =============================================================================

/// Defaults of the quotation document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSettings {
    /// Tier used when neither the order file nor `--tier` names one.
    #[serde(default)]
    pub default_tier: ClientTier,

    /// Days between the quote date and its expiry.
    #[serde(default = "default_validity_days")]
    pub validity_days: u32,

    /// Printed after every amount in text output.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_validity_days() -> u32 {
    DEFAULT_VALIDITY_DAYS
}

fn default_currency_symbol() -> String {
    "€".to_string()
}

impl Default for QuoteSettings {
    fn default() -> Self {
        QuoteSettings {
            default_tier: ClientTier::default(),
            validity_days: default_validity_days(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete configuration of one `tarifa` invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub pricing: PricingRules,

    #[serde(default)]
    pub quote: QuoteSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`tarifa.toml`)
    /// 3. Environment variables
    ///
    /// An explicit `config_path` that does not exist is an error; a missing
    /// file in the default location is not.
    pub fn load(config_path: Option<&Path>) -> CliResult<Self> {
        let mut config = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Self::from_file(path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> CliResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
        Self::from_toml_str(&contents)
            .map_err(|e| CliError::config(format!("{}: {}", path.display(), e.message)))
    }

    /// Parses a TOML document; absent sections and keys take their defaults.
    pub fn from_toml_str(contents: &str) -> CliResult<Self> {
        toml::from_str(contents).map_err(|e: toml::de::Error| CliError::config(e.to_string()))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CliResult<()> {
        self.pricing
            .validate()
            .map_err(|e| CliError::config(format!("[pricing] {}", e)))?;

        if self.quote.validity_days == 0 {
            return Err(CliError::config(
                "[quote] validity_days must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    ///
    /// `lookup` is `std::env::var` in production and a map in tests.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Catalog path
        if let Some(path) = lookup("TARIFA_CATALOG_PATH") {
            debug!(path = %path, "Overriding catalog path from environment");
            self.catalog.path = Some(PathBuf::from(path));
        }

        // Default tier
        if let Some(tier) = lookup("TARIFA_DEFAULT_TIER") {
            match tier.parse::<ClientTier>() {
                Ok(parsed) => {
                    debug!(tier = %parsed, "Overriding default tier from environment");
                    self.quote.default_tier = parsed;
                }
                Err(_) => warn!(tier = %tier, "Unknown tier in environment"),
            }
        }

        // Validity days
        if let Some(days) = lookup("TARIFA_VALIDITY_DAYS") {
            match days.trim().parse::<u32>() {
                Ok(d) => self.quote.validity_days = d,
                Err(_) => warn!(days = %days, "Invalid TARIFA_VALIDITY_DAYS"),
            }
        }

        // Volume threshold
        if let Some(boxes) = lookup("TARIFA_VOLUME_THRESHOLD_BOXES") {
            match boxes.trim().parse::<u32>() {
                Ok(b) => {
                    debug!(boxes = b, "Overriding volume threshold from environment");
                    self.pricing.volume_threshold_boxes = b;
                }
                Err(_) => warn!(boxes = %boxes, "Invalid TARIFA_VOLUME_THRESHOLD_BOXES"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tarifa", "tarifa")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// The catalog file, with `--catalog` taking precedence.
    pub fn catalog_path(&self, cli_override: Option<&Path>) -> CliResult<PathBuf> {
        cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.catalog.path.clone())
            .ok_or_else(|| {
                CliError::config(
                    "No catalog configured: pass --catalog, set TARIFA_CATALOG_PATH \
                     or add [catalog] path to tarifa.toml",
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.quote.default_tier, ClientTier::Custab);
        assert_eq!(config.quote.validity_days, 30);
        assert_eq!(config.pricing.volume_threshold_boxes, 10);
        assert!(config.catalog.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_partial_sections() {
        let config = AppConfig::from_toml_str(
            r#"
            [catalog]
            path = "tariff.json"

            [pricing]
            volume_threshold_boxes = 8
            volume_discount_pct = "12.5"
            special_catalogs = ["DURACELL"]

            [quote]
            default_tier = "partner"
            "#,
        )
        .unwrap();

        assert_eq!(config.catalog.path, Some(PathBuf::from("tariff.json")));
        assert_eq!(config.pricing.volume_threshold_boxes, 8);
        assert_eq!(config.pricing.volume_discount_pct, dec!(12.5));
        assert!(!config.pricing.is_special_catalog("BLADE"));
        // Untouched tables keep their defaults
        assert!(config.pricing.is_special_quantity_code("9203013"));
        assert_eq!(config.quote.default_tier, ClientTier::Partner);
        assert_eq!(config.quote.validity_days, 30);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml_str("[quote]\ndefault_tier = \"retail\"").unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ConfigError);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(env(&[
            ("TARIFA_CATALOG_PATH", "/srv/tariff.json"),
            ("TARIFA_DEFAULT_TIER", "PARTNER"),
            ("TARIFA_VALIDITY_DAYS", "15"),
            ("TARIFA_VOLUME_THRESHOLD_BOXES", "12"),
        ]));

        assert_eq!(config.catalog.path, Some(PathBuf::from("/srv/tariff.json")));
        assert_eq!(config.quote.default_tier, ClientTier::Partner);
        assert_eq!(config.quote.validity_days, 15);
        assert_eq!(config.pricing.volume_threshold_boxes, 12);
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(env(&[
            ("TARIFA_DEFAULT_TIER", "retail"),
            ("TARIFA_VALIDITY_DAYS", "soon"),
        ]));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        config.quote.validity_days = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.pricing.volume_threshold_boxes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_catalog_path_precedence() {
        let mut config = AppConfig::default();
        assert!(config.catalog_path(None).is_err());

        config.catalog.path = Some(PathBuf::from("from-config.json"));
        assert_eq!(
            config.catalog_path(None).unwrap(),
            PathBuf::from("from-config.json")
        );
        assert_eq!(
            config.catalog_path(Some(Path::new("cli.json"))).unwrap(),
            PathBuf::from("cli.json")
        );
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).unwrap();
        assert!(toml_str.contains("[pricing]"));
        assert!(toml_str.contains("[quote]"));
    }
}
