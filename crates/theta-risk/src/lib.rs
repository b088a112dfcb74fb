//! Risk validation for options trade recommendations.
//!
//! Every recommendation passes through the validator before it is acted on:
//! - Volatility: VIX ceiling for openings, size reduction above a threshold
//! - Margin: projected margin usage against net liquidation
//! - PositionLimits: portfolio-wide and per-symbol position counts
//! - Concentration: per-symbol exposure against net liquidation
//! - BuyingPower: collateral for cash-secured puts
//!
//! Also provides:
//! - Stop-loss evaluation for short option positions
//! - PortfolioRiskSnapshot: aggregate exposure for reporting

pub mod config;
pub mod error;
pub mod portfolio;
pub mod result;
pub mod validator;

pub use config::RiskConfig;
pub use error::{RiskError, RiskResult};
pub use portfolio::PortfolioRiskSnapshot;
pub use result::{RiskCheckResult, RiskViolation};
pub use validator::{estimated_margin, new_exposure, RiskValidator};
