//! Account balance snapshot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Balances of the trading account at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    #[serde(default)]
    pub account_id: String,
    pub net_liquidation: Decimal,
    #[serde(default)]
    pub cash: Decimal,
    pub buying_power: Decimal,
    #[serde(default)]
    pub available_funds: Decimal,
    #[serde(default)]
    pub excess_liquidity: Decimal,
    #[serde(default)]
    pub margin_used: Decimal,
    #[serde(default)]
    pub margin_available: Decimal,
}

impl AccountSnapshot {
    /// Fraction of net liquidation currently consumed by margin.
    ///
    /// Returns `None` when net liquidation is not positive.
    pub fn margin_usage(&self) -> Option<Decimal> {
        if self.net_liquidation <= Decimal::ZERO {
            return None;
        }
        Some(self.margin_used / self.net_liquidation)
    }

    /// True when the account carries a usable (positive) net liquidation.
    #[inline]
    pub fn has_equity(&self) -> bool {
        self.net_liquidation > Decimal::ZERO
    }
}
