//! Strategy contract shared by all option strategies.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use theta_core::{AccountSnapshot, OptionQuote, Position, Price, StrategyKind, TradeRecommendation};

/// Directional bias supplied by an external signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Bearish => write!(f, "bearish"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

/// Everything a strategy looks at for one symbol in one cycle.
///
/// `positions` may contain other symbols; strategies only consider their own.
#[derive(Debug, Clone, Copy)]
pub struct MarketContext<'a> {
    /// Date all DTE figures are measured from.
    pub as_of: NaiveDate,
    pub stock_price: Price,
    pub chain: &'a [OptionQuote],
    pub positions: &'a [Position],
    pub account: &'a AccountSnapshot,
}

impl<'a> MarketContext<'a> {
    /// Open positions belonging to `symbol`.
    pub fn positions_for(&self, symbol: &str) -> Vec<&'a Position> {
        self.positions
            .iter()
            .filter(|p| p.symbol == symbol && p.is_open())
            .collect()
    }
}

/// An options strategy.
///
/// Implementations hold only immutable configuration, so `analyze` is a pure
/// function of its context and may be called from any thread.
pub trait Strategy: Send + Sync {
    /// Strategy family.
    fn kind(&self) -> StrategyKind;

    /// Underlying this instance trades.
    fn symbol(&self) -> &str;

    /// Produce recommendations for the current market state.
    ///
    /// An empty result means nothing to do; it is never an error.
    fn analyze(&self, ctx: &MarketContext<'_>) -> Vec<TradeRecommendation>;

    /// Whether current conditions suit this strategy.
    fn is_compatible(
        &self,
        _stock_price: Price,
        _volatility: Option<Decimal>,
        _trend: Option<Trend>,
    ) -> bool {
        true
    }
}

impl fmt::Debug for dyn Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy")
            .field("kind", &self.kind())
            .field("symbol", &self.symbol())
            .finish()
    }
}
