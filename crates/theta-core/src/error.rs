//! Error types for theta-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid recommendation: {0}")]
    InvalidRecommendation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Decimal parse error: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
