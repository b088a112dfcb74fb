//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Symbol configuration error: {0}")]
    Core(#[from] theta_core::CoreError),

    #[error("Strategy error: {0}")]
    Strategy(#[from] theta_strategy::StrategyError),

    #[error("Risk error: {0}")]
    Risk(#[from] theta_risk::RiskError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] theta_telemetry::TelemetryError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
