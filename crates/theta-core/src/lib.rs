//! Core domain types for the ThetaGang options decision engine.
//!
//! This crate provides the value types every other crate works with:
//! - `Price`: precision-safe price type
//! - `OptionQuote`, `OptionRight`: option chain snapshots
//! - `Position`, `AccountSnapshot`: broker state as read-only input
//! - `TradeRecommendation`, `Action`: strategy output
//! - `SymbolConfig`: per-underlying trading parameters

pub mod account;
pub mod config;
pub mod decimal;
pub mod error;
pub mod option;
pub mod position;
pub mod recommendation;

pub use account::AccountSnapshot;
pub use config::SymbolConfig;
pub use decimal::{Price, CONTRACT_MULTIPLIER};
pub use error::{CoreError, Result};
pub use option::{days_between, Greeks, OptionQuote, OptionRight};
pub use position::{Instrument, OptionContract, Position};
pub use recommendation::{
    Action, Legs, RollTarget, SingleLeg, SpreadLegs, StrategyKind, TradeRecommendation,
};
