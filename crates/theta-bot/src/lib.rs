//! ThetaGang decision engine application.
//!
//! Wires the library crates into a single decision cycle:
//! - Configuration loading with per-symbol defaults
//! - Market snapshot input
//! - Strategy selection and analysis per symbol
//! - Risk validation of every recommendation
//! - JSON cycle report

pub mod config;
pub mod cycle;
pub mod error;
pub mod snapshot;

pub use config::{AppConfig, LoggingConfig, SymbolOverrides, SymbolsConfig};
pub use cycle::{
    CycleReport, DecisionEngine, InvalidRecommendation, StopLossAlert, TradeDecision,
};
pub use error::{AppError, AppResult};
pub use snapshot::{MarketSnapshot, SymbolMarketData};
