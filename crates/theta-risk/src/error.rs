//! Risk error types.

use thiserror::Error;

/// Invalid input, as opposed to a policy rejection.
///
/// Policy rejections are reported through `RiskCheckResult`, never as errors.
#[derive(Debug, Error)]
pub enum RiskError {
    #[error("Invalid recommendation: {0}")]
    InvalidRecommendation(#[from] theta_core::CoreError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type RiskResult<T> = Result<T, RiskError>;
