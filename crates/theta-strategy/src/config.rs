//! Strategy configuration.

use crate::error::{StrategyError, StrategyResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which strategy families may be selected, plus spread parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default = "default_wheel_enabled")]
    pub wheel_enabled: bool,
    #[serde(default)]
    pub iron_condor_enabled: bool,
    #[serde(default)]
    pub iron_condor: IronCondorConfig,
}

fn default_wheel_enabled() -> bool {
    true
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            wheel_enabled: default_wheel_enabled(),
            iron_condor_enabled: false,
            iron_condor: IronCondorConfig::default(),
        }
    }
}

impl StrategyConfig {
    /// Validate configuration.
    pub fn validate(&self) -> StrategyResult<()> {
        if !self.wheel_enabled && !self.iron_condor_enabled {
            return Err(StrategyError::ConfigError(
                "at least one strategy must be enabled".to_string(),
            ));
        }
        self.iron_condor.validate()
    }
}

/// Iron condor entry and management parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IronCondorConfig {
    /// Distance in strike points between each short leg and its wing.
    #[serde(default = "default_wing_width")]
    pub wing_width: Decimal,
    /// Minimum net credit per share to open.
    #[serde(default = "default_min_credit")]
    pub min_credit: Decimal,
    /// Close once this percentage of the entry credit is captured.
    #[serde(default = "default_profit_target_percent")]
    pub profit_target_percent: Decimal,
    /// Close once the loss reaches this percentage of the entry credit.
    #[serde(default = "default_max_loss_percent")]
    pub max_loss_percent: Decimal,
    /// Adjust when the stock is within this fraction of a short strike.
    #[serde(default = "default_adjustment_threshold")]
    pub adjustment_threshold: Decimal,
    /// Absolute delta for both short legs.
    #[serde(default = "default_short_delta")]
    pub short_delta: Decimal,
    /// Volatility above which the strategy is considered incompatible.
    #[serde(default = "default_max_volatility")]
    pub max_volatility: Decimal,
}

fn default_wing_width() -> Decimal {
    Decimal::from(5)
}

fn default_min_credit() -> Decimal {
    Decimal::ONE
}

fn default_profit_target_percent() -> Decimal {
    Decimal::from(50)
}

fn default_max_loss_percent() -> Decimal {
    Decimal::from(200)
}

fn default_adjustment_threshold() -> Decimal {
    Decimal::new(10, 2) // 0.10
}

fn default_short_delta() -> Decimal {
    Decimal::new(30, 2) // 0.30
}

fn default_max_volatility() -> Decimal {
    Decimal::new(30, 2) // 0.30
}

impl Default for IronCondorConfig {
    fn default() -> Self {
        Self {
            wing_width: default_wing_width(),
            min_credit: default_min_credit(),
            profit_target_percent: default_profit_target_percent(),
            max_loss_percent: default_max_loss_percent(),
            adjustment_threshold: default_adjustment_threshold(),
            short_delta: default_short_delta(),
            max_volatility: default_max_volatility(),
        }
    }
}

impl IronCondorConfig {
    /// Validate configuration.
    pub fn validate(&self) -> StrategyResult<()> {
        if self.wing_width <= Decimal::ZERO {
            return Err(StrategyError::ConfigError(format!(
                "wing_width ({}) must be positive",
                self.wing_width
            )));
        }

        if self.min_credit.is_sign_negative() {
            return Err(StrategyError::ConfigError(format!(
                "min_credit ({}) must be non-negative",
                self.min_credit
            )));
        }

        if self.short_delta <= Decimal::ZERO || self.short_delta >= Decimal::ONE {
            return Err(StrategyError::ConfigError(format!(
                "short_delta ({}) must be between 0 and 1",
                self.short_delta
            )));
        }

        if self.profit_target_percent <= Decimal::ZERO || self.max_loss_percent <= Decimal::ZERO {
            return Err(StrategyError::ConfigError(
                "profit_target_percent and max_loss_percent must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
