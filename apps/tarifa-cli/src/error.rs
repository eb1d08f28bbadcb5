//! # CLI Error Type
//!
//! Unified error type for every command.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in tarifa                                 │
//! │                                                                         │
//! │  tarifa quote order.json                                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, CliError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  File / JSON / TOML? ─── io / parse error ────────┐             │  │
//! │  │         │                                          │             │  │
//! │  │         ▼                                          ▼             │  │
//! │  │  Core error? ─── CatalogError / CartError ───── CliError ──────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stderr:  error[NOT_FOUND]: Product not found: 9999999                 │
//! │  --json:  {"code":"NOT_FOUND","message":"Product not found: 9999999"}  │
//! │  exit status 1                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use std::path::Path;
use tarifa_core::{CartError, CatalogError, CoreError, PricingDataError, ValidationError};

/// Error reported to the operator when a command fails.
///
/// ## Serialization
/// With `--json` this is what lands on stderr:
/// ```json
/// {
///   "code": "CART_ERROR",
///   "message": "Minimum order for 8757704 is 12 units (requested 8)"
/// }
/// ```
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("error[{code}]: {message}")]
pub struct CliError {
    /// Machine-readable error code for scripts
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product or line not found
    NotFound,

    /// Input validation failed (bad code, tier, quantity, product data)
    ValidationError,

    /// Cart mutation rejected
    CartError,

    /// Configuration could not be loaded or is invalid
    ConfigError,

    /// File could not be read, parsed or written
    IoError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::CartError => "CART_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::IoError => "IO_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type for commands.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Creates a new CLI error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CliError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        CliError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::ConfigError, message)
    }

    /// Creates an I/O error tied to a file.
    pub fn io(path: &Path, err: impl std::fmt::Display) -> Self {
        CliError::new(ErrorCode::IoError, format!("{}: {}", path.display(), err))
    }

    /// Creates an I/O error for a failed write to the output stream.
    pub fn output(err: impl std::fmt::Display) -> Self {
        CliError::new(ErrorCode::IoError, format!("Failed to write output: {}", err))
    }
}

/// Converts catalog errors to CLI errors.
impl From<CatalogError> for CliError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ProductNotFound(id) => CliError::not_found("Product", &id),
            CatalogError::DuplicateProduct(_) | CatalogError::InvalidProduct { .. } => {
                CliError::validation(err.to_string())
            }
        }
    }
}

/// Converts cart errors to CLI errors.
impl From<CartError> for CliError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::LineNotFound(id) => CliError::not_found("Cart line", &id),
            other => CliError::new(ErrorCode::CartError, other.to_string()),
        }
    }
}

impl From<PricingDataError> for CliError {
    fn from(err: PricingDataError) -> Self {
        CliError::validation(err.to_string())
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::validation(err.to_string())
    }
}

/// Converts core errors to CLI errors.
impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Pricing(e) => e.into(),
            CoreError::Cart(e) => e.into(),
            CoreError::Catalog(e) => e.into(),
            CoreError::Validation(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_serialize_screaming_snake_case() {
        let err = CliError::not_found("Product", "123");
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(
            json,
            r#"{"code":"NOT_FOUND","message":"Product not found: 123"}"#
        );
    }

    #[test]
    fn test_cart_error_mapping() {
        let err: CliError = CartError::BelowMinimumOrder {
            product_id: "p-1".into(),
            code: "8757704".into(),
            requested: 8,
            minimum: 12,
        }
        .into();
        assert_eq!(err.code, ErrorCode::CartError);
        assert_eq!(
            err.to_string(),
            "error[CART_ERROR]: Minimum order for 8757704 is 12 units (requested 8)"
        );
    }

    #[test]
    fn test_core_error_mapping() {
        let err: CliError = CoreError::from(CatalogError::ProductNotFound("X".into())).into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: CliError = CoreError::from(ValidationError::MustBePositive {
            field: "quantity".into(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_output_error() {
        let err = CliError::output("broken pipe");
        assert_eq!(err.code, ErrorCode::IoError);
        assert_eq!(err.message, "Failed to write output: broken pipe");
    }
}
