//! Strategy error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid symbol configuration: {0}")]
    Symbol(#[from] theta_core::CoreError),
}

pub type StrategyResult<T> = Result<T, StrategyError>;
