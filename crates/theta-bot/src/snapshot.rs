//! Market snapshot input.
//!
//! One JSON document describing the account, its positions, and the market
//! for each symbol at a single point in time.

use crate::error::{AppError, AppResult};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use theta_core::{AccountSnapshot, OptionQuote, Position, Price};
use theta_strategy::{SymbolOutlook, Trend};

/// Market data for one underlying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMarketData {
    pub symbol: String,
    pub stock_price: Price,
    /// Annualized volatility as a fraction (0.25 = 25%).
    #[serde(default)]
    pub volatility: Option<Decimal>,
    #[serde(default)]
    pub trend: Option<Trend>,
    #[serde(default)]
    pub chain: Vec<OptionQuote>,
}

impl SymbolMarketData {
    pub fn outlook(&self) -> SymbolOutlook {
        SymbolOutlook {
            symbol: self.symbol.clone(),
            stock_price: self.stock_price,
            volatility: self.volatility,
            trend: self.trend,
        }
    }
}

/// Everything one decision cycle consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Evaluation date. Defaults to today's local date when absent.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
    pub account: AccountSnapshot,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub vix: Option<Decimal>,
    #[serde(default)]
    pub symbols: Vec<SymbolMarketData>,
}

impl MarketSnapshot {
    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Snapshot(format!("Failed to read snapshot {}: {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Evaluation date, falling back to today's local date.
    pub fn evaluation_date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn market(&self, symbol: &str) -> Option<&SymbolMarketData> {
        self.symbols.iter().find(|s| s.symbol == symbol)
    }
}
