//! Strategy selection.
//!
//! Chooses which strategy trades a symbol. Existing positions take priority
//! so a running wheel or condor is never abandoned mid-cycle. Otherwise the
//! choice follows a coarse market regime built from volatility and trend.

use crate::config::StrategyConfig;
use crate::iron_condor::IronCondorStrategy;
use crate::strategy::{Strategy, Trend};
use crate::wheel::WheelStrategy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use theta_core::{Position, Price, StrategyKind, SymbolConfig};
use tracing::{debug, info, warn};

/// Coarse market classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketRegime {
    HighVolatility,
    LowVolatility,
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HighVolatility => write!(f, "high_volatility"),
            Self::LowVolatility => write!(f, "low_volatility"),
            Self::Bullish => write!(f, "bullish"),
            Self::Bearish => write!(f, "bearish"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

/// Volatility above which the regime is high-volatility.
const HIGH_VOL_THRESHOLD: Decimal = Decimal::from_parts(35, 0, 0, false, 2);
/// Volatility below which the regime is low-volatility.
const LOW_VOL_THRESHOLD: Decimal = Decimal::from_parts(20, 0, 0, false, 2);
/// Neutral markets below this volatility favour iron condors.
const CONDOR_VOL_CEILING: Decimal = Decimal::from_parts(25, 0, 0, false, 2);

/// Market view of one symbol, used for bulk allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolOutlook {
    pub symbol: String,
    pub stock_price: Price,
    #[serde(default)]
    pub volatility: Option<Decimal>,
    #[serde(default)]
    pub trend: Option<Trend>,
}

/// Number of symbols running each strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyCounts {
    pub wheel: usize,
    pub iron_condor: usize,
    pub other: usize,
}

/// Picks strategies for symbols.
#[derive(Debug, Clone)]
pub struct StrategySelector {
    config: StrategyConfig,
    symbols: HashMap<String, SymbolConfig>,
}

impl StrategySelector {
    pub fn new(config: StrategyConfig, symbols: impl IntoIterator<Item = SymbolConfig>) -> Self {
        let symbols = symbols
            .into_iter()
            .map(|cfg| (cfg.symbol.clone(), cfg))
            .collect();
        Self { config, symbols }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn symbol_config(&self, symbol: &str) -> Option<&SymbolConfig> {
        self.symbols.get(symbol)
    }

    pub fn is_enabled(&self, kind: StrategyKind) -> bool {
        match kind {
            StrategyKind::Wheel => self.config.wheel_enabled,
            StrategyKind::IronCondor => self.config.iron_condor_enabled,
        }
    }

    fn build(&self, kind: StrategyKind, symbol_config: &SymbolConfig) -> Box<dyn Strategy> {
        match kind {
            StrategyKind::Wheel => Box::new(WheelStrategy::new(symbol_config.clone())),
            StrategyKind::IronCondor => Box::new(IronCondorStrategy::new(
                symbol_config.clone(),
                self.config.iron_condor.clone(),
            )),
        }
    }

    /// Select the single strategy to run for `symbol`.
    ///
    /// `positions` may span the whole portfolio; only the symbol's own open
    /// positions are used for continuity.
    pub fn select(
        &self,
        symbol: &str,
        stock_price: Price,
        volatility: Option<Decimal>,
        trend: Option<Trend>,
        positions: &[Position],
    ) -> Option<Box<dyn Strategy>> {
        let Some(symbol_config) = self.symbols.get(symbol) else {
            debug!(symbol, "No configuration for symbol");
            return None;
        };

        let held = positions.iter().filter(|p| p.symbol == symbol);
        if let Some(kind) = Self::detect_current_strategy(held) {
            if self.is_enabled(kind) {
                info!(symbol, strategy = %kind, "Continuing with current strategy");
                return Some(self.build(kind, symbol_config));
            }
            debug!(symbol, strategy = %kind, "Current strategy disabled, reselecting");
        }

        let regime = Self::classify_regime(volatility, trend);
        debug!(symbol, %stock_price, %regime, "Market regime");

        let low_vol_neutral =
            regime == MarketRegime::Neutral && volatility.is_some_and(|v| v < CONDOR_VOL_CEILING);
        if low_vol_neutral && self.config.iron_condor_enabled {
            info!(symbol, "Selected iron condor (neutral, low vol)");
            return Some(self.build(StrategyKind::IronCondor, symbol_config));
        }

        if self.config.wheel_enabled {
            match regime {
                MarketRegime::Bullish | MarketRegime::Bearish | MarketRegime::HighVolatility => {
                    info!(symbol, %regime, "Selected wheel");
                }
                _ => info!(symbol, "Defaulting to wheel"),
            }
            return Some(self.build(StrategyKind::Wheel, symbol_config));
        }

        warn!(symbol, %regime, "No strategy selected");
        None
    }

    /// Classify the market from volatility first, then trend.
    pub fn classify_regime(volatility: Option<Decimal>, trend: Option<Trend>) -> MarketRegime {
        if let Some(vol) = volatility {
            if vol > HIGH_VOL_THRESHOLD {
                return MarketRegime::HighVolatility;
            }
            if vol < LOW_VOL_THRESHOLD {
                return MarketRegime::LowVolatility;
            }
        }

        match trend {
            Some(Trend::Bullish) => MarketRegime::Bullish,
            Some(Trend::Bearish) => MarketRegime::Bearish,
            Some(Trend::Neutral) | None => MarketRegime::Neutral,
        }
    }

    /// Infer the running strategy from one symbol's positions.
    ///
    /// Any stock or a lone option leg means the wheel; four option legs
    /// split two puts and two calls means an iron condor.
    pub fn detect_current_strategy<'a>(
        positions: impl IntoIterator<Item = &'a Position>,
    ) -> Option<StrategyKind> {
        let mut options = Vec::new();
        for position in positions.into_iter().filter(|p| p.is_open()) {
            if position.is_equity() {
                return Some(StrategyKind::Wheel);
            }
            options.push(position);
        }

        match options.len() {
            1 => Some(StrategyKind::Wheel),
            4 => {
                let puts = options.iter().filter(|p| p.is_put()).count();
                let calls = options.iter().filter(|p| p.is_call()).count();
                (puts == 2 && calls == 2).then_some(StrategyKind::IronCondor)
            }
            _ => None,
        }
    }

    /// Every enabled strategy compatible with current conditions.
    pub fn compatible_strategies(
        &self,
        symbol: &str,
        stock_price: Price,
        volatility: Option<Decimal>,
        trend: Option<Trend>,
    ) -> Vec<Box<dyn Strategy>> {
        let Some(symbol_config) = self.symbols.get(symbol) else {
            warn!(symbol, "No configuration for symbol");
            return Vec::new();
        };

        let strategies: Vec<Box<dyn Strategy>> = [StrategyKind::Wheel, StrategyKind::IronCondor]
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
            .map(|kind| self.build(kind, symbol_config))
            .filter(|s| s.is_compatible(stock_price, volatility, trend))
            .collect();

        if strategies.is_empty() {
            warn!(symbol, "No compatible strategies found");
        }
        strategies
    }

    /// Compatible strategies for each symbol, keyed by symbol.
    pub fn allocate(&self, outlooks: &[SymbolOutlook]) -> BTreeMap<String, Vec<Box<dyn Strategy>>> {
        outlooks
            .iter()
            .map(|o| {
                let strategies =
                    self.compatible_strategies(&o.symbol, o.stock_price, o.volatility, o.trend);
                (o.symbol.clone(), strategies)
            })
            .collect()
    }

    /// Count symbols by the strategy their positions indicate.
    pub fn strategy_counts(positions: &[Position]) -> StrategyCounts {
        let mut by_symbol: BTreeMap<&str, Vec<&Position>> = BTreeMap::new();
        for position in positions {
            by_symbol.entry(position.symbol.as_str()).or_default().push(position);
        }

        let mut counts = StrategyCounts::default();
        for held in by_symbol.values() {
            match Self::detect_current_strategy(held.iter().copied()) {
                Some(StrategyKind::Wheel) => counts.wheel += 1,
                Some(StrategyKind::IronCondor) => counts.iron_condor += 1,
                None => counts.other += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spread::test_support::{make_condor, make_leg};
    use rust_decimal_macros::dec;
    use theta_core::{Instrument, OptionRight};

    fn selector(wheel: bool, condor: bool) -> StrategySelector {
        let config = StrategyConfig {
            wheel_enabled: wheel,
            iron_condor_enabled: condor,
            ..Default::default()
        };
        StrategySelector::new(config, [SymbolConfig::new("SPY"), SymbolConfig::new("QQQ")])
    }

    fn stock(symbol: &str) -> Position {
        Position {
            symbol: symbol.to_string(),
            instrument: Instrument::Equity,
            quantity: 100,
            avg_cost: dec!(440),
            market_value: dec!(45000),
            unrealized_pnl: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
        }
    }

    fn spot() -> Price {
        Price::new(dec!(450))
    }

    #[test]
    fn test_classify_regime() {
        use MarketRegime::*;
        let classify = StrategySelector::classify_regime;
        assert_eq!(classify(Some(dec!(0.40)), Some(Trend::Neutral)), HighVolatility);
        assert_eq!(classify(Some(dec!(0.15)), Some(Trend::Bullish)), LowVolatility);
        assert_eq!(classify(Some(dec!(0.25)), Some(Trend::Bullish)), Bullish);
        assert_eq!(classify(Some(dec!(0.25)), Some(Trend::Bearish)), Bearish);
        assert_eq!(classify(Some(dec!(0.25)), None), Neutral);
        assert_eq!(StrategySelector::classify_regime(None, None), Neutral);
    }

    #[test]
    fn test_neutral_low_vol_selects_condor() {
        let s = selector(true, true)
            .select("SPY", spot(), Some(dec!(0.22)), Some(Trend::Neutral), &[])
            .unwrap();
        assert_eq!(s.kind(), StrategyKind::IronCondor);
        assert_eq!(s.symbol(), "SPY");
    }

    #[test]
    fn test_neutral_without_volatility_defaults_to_wheel() {
        let s = selector(true, true)
            .select("SPY", spot(), None, Some(Trend::Neutral), &[])
            .unwrap();
        assert_eq!(s.kind(), StrategyKind::Wheel);
    }

    #[test]
    fn test_directional_selects_wheel() {
        let sel = selector(true, true);
        for trend in [Trend::Bullish, Trend::Bearish] {
            let s = sel.select("SPY", spot(), Some(dec!(0.22)), Some(trend), &[]).unwrap();
            assert_eq!(s.kind(), StrategyKind::Wheel);
        }
        let s = sel.select("SPY", spot(), Some(dec!(0.50)), None, &[]).unwrap();
        assert_eq!(s.kind(), StrategyKind::Wheel);
    }

    #[test]
    fn test_condor_only_falls_to_none_when_directional() {
        let sel = selector(false, true);
        assert!(sel.select("SPY", spot(), Some(dec!(0.22)), Some(Trend::Bullish), &[]).is_none());
    }

    #[test]
    fn test_unknown_symbol() {
        assert!(selector(true, true).select("IWM", spot(), None, None, &[]).is_none());
    }

    #[test]
    fn test_existing_stock_keeps_wheel() {
        // Regime alone would pick a condor
        let s = selector(true, true)
            .select("SPY", spot(), Some(dec!(0.22)), Some(Trend::Neutral), &[stock("SPY")])
            .unwrap();
        assert_eq!(s.kind(), StrategyKind::Wheel);
    }

    #[test]
    fn test_existing_condor_kept_when_trend_turns() {
        let positions = make_condor(35, dec!(100), dec!(25));
        let s = selector(true, true)
            .select("SPY", spot(), Some(dec!(0.50)), Some(Trend::Bullish), &positions)
            .unwrap();
        assert_eq!(s.kind(), StrategyKind::IronCondor);
    }

    #[test]
    fn test_other_symbol_positions_ignored() {
        let s = selector(true, true)
            .select("SPY", spot(), Some(dec!(0.22)), Some(Trend::Neutral), &[stock("QQQ")])
            .unwrap();
        assert_eq!(s.kind(), StrategyKind::IronCondor);
    }

    #[test]
    fn test_detect_current_strategy() {
        let single = vec![make_leg(OptionRight::Put, dec!(440), 35, -1, dec!(250), dec!(-100))];
        assert_eq!(StrategySelector::detect_current_strategy(&single), Some(StrategyKind::Wheel));

        let condor = make_condor(35, dec!(100), dec!(25));
        assert_eq!(
            StrategySelector::detect_current_strategy(&condor),
            Some(StrategyKind::IronCondor)
        );

        let two_legs = vec![
            make_leg(OptionRight::Put, dec!(440), 35, -1, dec!(250), dec!(-100)),
            make_leg(OptionRight::Call, dec!(460), 35, -1, dec!(250), dec!(-100)),
        ];
        assert_eq!(StrategySelector::detect_current_strategy(&two_legs), None);
        assert_eq!(StrategySelector::detect_current_strategy(&[]), None);
    }

    #[test]
    fn test_compatible_strategies() {
        let sel = selector(true, true);
        let both = sel.compatible_strategies("SPY", spot(), Some(dec!(0.20)), Some(Trend::Neutral));
        assert_eq!(both.len(), 2);

        let wheel_only =
            sel.compatible_strategies("SPY", spot(), Some(dec!(0.20)), Some(Trend::Bullish));
        assert_eq!(wheel_only.len(), 1);
        assert_eq!(wheel_only[0].kind(), StrategyKind::Wheel);

        assert!(sel.compatible_strategies("IWM", spot(), None, None).is_empty());
    }

    #[test]
    fn test_allocate() {
        let sel = selector(true, true);
        let outlooks = vec![
            SymbolOutlook {
                symbol: "SPY".to_string(),
                stock_price: spot(),
                volatility: Some(dec!(0.20)),
                trend: Some(Trend::Neutral),
            },
            SymbolOutlook {
                symbol: "QQQ".to_string(),
                stock_price: Price::new(dec!(380)),
                volatility: Some(dec!(0.45)),
                trend: None,
            },
        ];
        let allocation = sel.allocate(&outlooks);
        assert_eq!(allocation["SPY"].len(), 2);
        assert_eq!(allocation["QQQ"].len(), 1);
    }

    #[test]
    fn test_strategy_counts() {
        let mut positions = make_condor(35, dec!(100), dec!(25));
        positions.push(stock("QQQ"));
        let mut iwm = make_leg(OptionRight::Put, dec!(200), 35, -1, dec!(100), dec!(-50));
        iwm.symbol = "IWM".to_string();
        let mut iwm_call = make_leg(OptionRight::Call, dec!(220), 35, -1, dec!(100), dec!(-50));
        iwm_call.symbol = "IWM".to_string();
        positions.extend([iwm, iwm_call]);

        let counts = StrategySelector::strategy_counts(&positions);
        assert_eq!(
            counts,
            StrategyCounts {
                wheel: 1,
                iron_condor: 1,
                other: 1,
            }
        );
    }
}
