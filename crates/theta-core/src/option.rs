//! Option chain market data.

use crate::decimal::Price;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Put or call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionRight {
    #[serde(alias = "P", alias = "PUT")]
    Put,
    #[serde(alias = "C", alias = "CALL")]
    Call,
}

impl fmt::Display for OptionRight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Put => write!(f, "put"),
            Self::Call => write!(f, "call"),
        }
    }
}

/// Option Greeks as supplied by the data source.
///
/// Every field is optional because providers frequently omit model
/// output for illiquid strikes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greeks {
    #[serde(default)]
    pub delta: Option<Decimal>,
    #[serde(default)]
    pub gamma: Option<Decimal>,
    #[serde(default)]
    pub theta: Option<Decimal>,
    #[serde(default)]
    pub vega: Option<Decimal>,
    #[serde(default)]
    pub implied_volatility: Option<Decimal>,
}

/// One tradable option contract as seen in a chain snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionQuote {
    /// Underlying symbol.
    pub symbol: String,
    pub strike: Price,
    pub expiration: NaiveDate,
    pub right: OptionRight,
    pub bid: Price,
    pub ask: Price,
    #[serde(default = "default_last")]
    pub last: Price,
    #[serde(default)]
    pub volume: u64,
    #[serde(default)]
    pub open_interest: u64,
    #[serde(default, flatten)]
    pub greeks: Greeks,
}

fn default_last() -> Price {
    Price::ZERO
}

impl OptionQuote {
    /// Midpoint of the current bid/ask.
    #[inline]
    pub fn mid(&self) -> Price {
        Price::mid(self.bid, self.ask)
    }

    /// True when both sides of the market are quoted.
    #[inline]
    pub fn has_two_sided_market(&self) -> bool {
        self.bid.is_positive() && self.ask.is_positive()
    }

    #[inline]
    pub fn delta(&self) -> Option<Decimal> {
        self.greeks.delta
    }

    /// Calendar days from `as_of` until expiration (negative once expired).
    #[inline]
    pub fn days_to_expiration(&self, as_of: NaiveDate) -> i64 {
        days_between(as_of, self.expiration)
    }
}

/// Calendar days from `from` to `to`.
#[inline]
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}
