//! Options strategies and strategy selection.
//!
//! Strategies turn a market snapshot into trade recommendations:
//! - `WheelStrategy`: cash-secured puts and covered calls, closed or rolled
//! - `IronCondorStrategy`: four-leg neutral spreads with active management
//! - `StrategySelector`: picks a strategy per symbol from positions and regime
//!
//! All strategies are pure: no I/O, no clock, no shared mutable state.

pub mod chain;
pub mod config;
pub mod error;
pub mod iron_condor;
pub mod selector;
pub mod spread;
pub mod strategy;
pub mod wheel;

pub use chain::{
    find_option_at_strike, find_option_by_delta, find_options_by_strike_range, valid_expirations,
    DteWindow,
};
pub use config::{IronCondorConfig, StrategyConfig};
pub use error::{StrategyError, StrategyResult};
pub use iron_condor::IronCondorStrategy;
pub use selector::{MarketRegime, StrategyCounts, StrategySelector, SymbolOutlook};
pub use spread::{identify_iron_condors, CondorLeg, IronCondorPosition};
pub use strategy::{MarketContext, Strategy, Trend};
pub use wheel::WheelStrategy;
