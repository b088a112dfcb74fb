//! Held positions as reported by the broker.

use crate::decimal::Price;
use crate::option::OptionRight;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Contract terms of an option position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionContract {
    pub strike: Price,
    pub expiration: NaiveDate,
    pub right: OptionRight,
}

/// What a position holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Instrument {
    Equity,
    Option(OptionContract),
}

/// A held instrument.
///
/// Quantity is signed: shares for equity, contracts for options, negative
/// when short.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub instrument: Instrument,
    pub quantity: i64,
    /// Average cost basis as reported by the broker.
    pub avg_cost: Decimal,
    /// Current market value (negative for short options).
    pub market_value: Decimal,
    #[serde(default)]
    pub unrealized_pnl: Decimal,
    #[serde(default)]
    pub realized_pnl: Decimal,
}

impl Position {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.quantity != 0
    }

    #[inline]
    pub fn is_short(&self) -> bool {
        self.quantity < 0
    }

    #[inline]
    pub fn is_equity(&self) -> bool {
        matches!(self.instrument, Instrument::Equity)
    }

    #[inline]
    pub fn is_option(&self) -> bool {
        matches!(self.instrument, Instrument::Option(_))
    }

    /// Option terms, or `None` for equity.
    #[inline]
    pub fn option_contract(&self) -> Option<&OptionContract> {
        match &self.instrument {
            Instrument::Option(contract) => Some(contract),
            Instrument::Equity => None,
        }
    }

    #[inline]
    pub fn right(&self) -> Option<OptionRight> {
        self.option_contract().map(|c| c.right)
    }

    #[inline]
    pub fn is_put(&self) -> bool {
        self.right() == Some(OptionRight::Put)
    }

    #[inline]
    pub fn is_call(&self) -> bool {
        self.right() == Some(OptionRight::Call)
    }

    #[inline]
    pub fn is_short_option(&self) -> bool {
        self.is_option() && self.is_short()
    }

    /// Premium originally collected (or paid), unsigned.
    #[inline]
    pub fn entry_credit(&self) -> Decimal {
        self.avg_cost.abs()
    }

    /// Absolute number of contracts (or shares).
    #[inline]
    pub fn abs_quantity(&self) -> u32 {
        u32::try_from(self.quantity.unsigned_abs()).unwrap_or(u32::MAX)
    }

    /// Profit captured on a short premium position, as a percentage of the
    /// entry credit. Zero when there is no entry credit to measure against.
    pub fn premium_captured_percent(&self) -> Decimal {
        let entry = self.entry_credit();
        if entry <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (entry - self.market_value.abs()) / entry * Decimal::ONE_HUNDRED
    }
}
