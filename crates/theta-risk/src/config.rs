//! Risk limit configuration.

use crate::error::{RiskError, RiskResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Portfolio-wide risk limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Maximum margin used as a fraction of net liquidation.
    #[serde(default = "default_max_portfolio_margin_usage")]
    pub max_portfolio_margin_usage: Decimal,
    /// Maximum exposure to one symbol as a fraction of net liquidation.
    #[serde(default = "default_max_concentration_per_symbol")]
    pub max_concentration_per_symbol: Decimal,
    /// No new positions while VIX is above this level.
    #[serde(default)]
    pub max_vix_for_new_positions: Option<Decimal>,
    /// Shrink new positions while VIX is above this level.
    #[serde(default = "default_reduce_size_when_vix_above")]
    pub reduce_size_when_vix_above: Option<Decimal>,
    /// Multiplier applied to quantity when VIX reduction is active.
    #[serde(default = "default_vix_size_reduction_factor")]
    pub vix_size_reduction_factor: Decimal,
    #[serde(default)]
    pub enable_stop_loss: bool,
    /// Loss, as a percentage of entry credit, that trips the stop.
    #[serde(default = "default_stop_loss_percent")]
    pub stop_loss_percent: Decimal,
    #[serde(default)]
    pub max_total_positions: Option<u32>,
}

fn default_max_portfolio_margin_usage() -> Decimal {
    Decimal::new(5, 1) // 0.5
}

fn default_max_concentration_per_symbol() -> Decimal {
    Decimal::new(25, 2) // 0.25
}

fn default_reduce_size_when_vix_above() -> Option<Decimal> {
    Some(Decimal::from(30))
}

fn default_vix_size_reduction_factor() -> Decimal {
    Decimal::new(5, 1) // 0.5
}

fn default_stop_loss_percent() -> Decimal {
    Decimal::from(50)
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_portfolio_margin_usage: default_max_portfolio_margin_usage(),
            max_concentration_per_symbol: default_max_concentration_per_symbol(),
            max_vix_for_new_positions: None,
            reduce_size_when_vix_above: default_reduce_size_when_vix_above(),
            vix_size_reduction_factor: default_vix_size_reduction_factor(),
            enable_stop_loss: false,
            stop_loss_percent: default_stop_loss_percent(),
            max_total_positions: None,
        }
    }
}

fn in_unit_interval(value: Decimal) -> bool {
    value > Decimal::ZERO && value <= Decimal::ONE
}

impl RiskConfig {
    /// Validate configuration.
    pub fn validate(&self) -> RiskResult<()> {
        if !in_unit_interval(self.max_portfolio_margin_usage) {
            return Err(RiskError::ConfigError(format!(
                "max_portfolio_margin_usage ({}) must be in (0, 1]",
                self.max_portfolio_margin_usage
            )));
        }

        if !in_unit_interval(self.max_concentration_per_symbol) {
            return Err(RiskError::ConfigError(format!(
                "max_concentration_per_symbol ({}) must be in (0, 1]",
                self.max_concentration_per_symbol
            )));
        }

        if !in_unit_interval(self.vix_size_reduction_factor) {
            return Err(RiskError::ConfigError(format!(
                "vix_size_reduction_factor ({}) must be in (0, 1]",
                self.vix_size_reduction_factor
            )));
        }

        if self.stop_loss_percent <= Decimal::ZERO {
            return Err(RiskError::ConfigError(format!(
                "stop_loss_percent ({}) must be positive",
                self.stop_loss_percent
            )));
        }

        Ok(())
    }
}
