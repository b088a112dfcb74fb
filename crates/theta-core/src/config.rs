//! Per-symbol trading configuration.
//!
//! Shared by strategies (entry/exit rules) and risk validation (per-symbol
//! position and concentration limits).

use crate::error::{CoreError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trading parameters for one underlying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolConfig {
    pub symbol: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Maximum concurrent short contracts (wheel) or spreads (iron condor).
    #[serde(default = "default_max_positions")]
    pub max_positions: u32,
    /// Absolute delta to target when selling options.
    #[serde(default = "default_target_delta")]
    pub target_delta: Decimal,
    /// Minimum mid-price premium per share. Zero disables the filter.
    #[serde(default)]
    pub min_premium: Decimal,
    /// Minimum premium as a percentage of stock price. Zero disables the filter.
    #[serde(default)]
    pub min_premium_percent: Decimal,
    #[serde(default = "default_dte_min")]
    pub dte_min: i64,
    #[serde(default = "default_dte_max")]
    pub dte_max: i64,
    /// Roll a short leg once DTE falls to this value.
    #[serde(default = "default_roll_when_dte")]
    pub roll_when_dte: i64,
    /// Close a short leg once this percentage of premium has been captured.
    #[serde(default = "default_roll_when_pnl_percent")]
    pub roll_when_pnl_percent: Decimal,
    #[serde(default = "default_write_calls_on_assignment")]
    pub write_calls_on_assignment: bool,
    /// Per-symbol concentration cap as a percentage of net liquidation.
    /// Zero disables the per-symbol cap.
    #[serde(default = "default_max_position_size_percent")]
    pub max_position_size_percent: Decimal,
}

fn default_enabled() -> bool {
    true
}

fn default_max_positions() -> u32 {
    1
}

fn default_target_delta() -> Decimal {
    Decimal::new(30, 2) // 0.30
}

fn default_dte_min() -> i64 {
    30
}

fn default_dte_max() -> i64 {
    45
}

fn default_roll_when_dte() -> i64 {
    21
}

fn default_roll_when_pnl_percent() -> Decimal {
    Decimal::from(50)
}

fn default_write_calls_on_assignment() -> bool {
    true
}

fn default_max_position_size_percent() -> Decimal {
    Decimal::from(10)
}

impl SymbolConfig {
    /// Configuration with default parameters for `symbol`.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            enabled: default_enabled(),
            max_positions: default_max_positions(),
            target_delta: default_target_delta(),
            min_premium: Decimal::ZERO,
            min_premium_percent: Decimal::ZERO,
            dte_min: default_dte_min(),
            dte_max: default_dte_max(),
            roll_when_dte: default_roll_when_dte(),
            roll_when_pnl_percent: default_roll_when_pnl_percent(),
            write_calls_on_assignment: default_write_calls_on_assignment(),
            max_position_size_percent: default_max_position_size_percent(),
        }
    }

    /// Validate parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.target_delta <= Decimal::ZERO || self.target_delta >= Decimal::ONE {
            return Err(CoreError::InvalidConfig(format!(
                "{}: target_delta ({}) must be between 0 and 1",
                self.symbol, self.target_delta
            )));
        }

        if self.dte_min > self.dte_max {
            return Err(CoreError::InvalidConfig(format!(
                "{}: dte_min ({}) must be <= dte_max ({})",
                self.symbol, self.dte_min, self.dte_max
            )));
        }

        if self.roll_when_dte > self.dte_min {
            return Err(CoreError::InvalidConfig(format!(
                "{}: roll_when_dte ({}) must be <= dte_min ({})",
                self.symbol, self.roll_when_dte, self.dte_min
            )));
        }

        if self.min_premium.is_sign_negative() || self.min_premium_percent.is_sign_negative() {
            return Err(CoreError::InvalidConfig(format!(
                "{}: premium filters must be non-negative",
                self.symbol
            )));
        }

        Ok(())
    }

    /// Per-symbol concentration cap as a fraction, when configured.
    pub fn max_position_fraction(&self) -> Option<Decimal> {
        if self.max_position_size_percent > Decimal::ZERO {
            Some(self.max_position_size_percent / Decimal::ONE_HUNDRED)
        } else {
            None
        }
    }
}
