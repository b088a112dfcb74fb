//! Recommendation risk validation.
//!
//! Every check runs on every recommendation and their findings are unioned,
//! so a rejection lists everything that is wrong, not just the first thing.
//!
//! # Checks
//! - Volatility: block or shrink openings while VIX is elevated
//! - Margin: projected margin usage against net liquidation
//! - Position count: portfolio-wide and per-symbol
//! - Concentration: per-symbol exposure against net liquidation
//! - Buying power: collateral for cash-secured puts

use crate::config::RiskConfig;
use crate::error::RiskResult;
use crate::portfolio::PortfolioRiskSnapshot;
use crate::result::{RiskCheckResult, RiskViolation};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use theta_core::{AccountSnapshot, Action, Position, SymbolConfig, TradeRecommendation};
use tracing::{debug, error, info, warn};

fn pct(fraction: Decimal) -> Decimal {
    (fraction * Decimal::ONE_HUNDRED).round_dp(1)
}

/// Validates recommendations against portfolio risk limits.
#[derive(Debug, Clone)]
pub struct RiskValidator {
    config: RiskConfig,
    symbols: HashMap<String, SymbolConfig>,
}

impl RiskValidator {
    pub fn new(config: RiskConfig, symbols: impl IntoIterator<Item = SymbolConfig>) -> Self {
        let symbols = symbols
            .into_iter()
            .map(|cfg| (cfg.symbol.clone(), cfg))
            .collect();
        Self { config, symbols }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Validate one recommendation.
    ///
    /// Returns an error only when the recommendation itself is malformed
    /// (for example a close without the position it closes). Limit breaches
    /// come back as an unapproved `RiskCheckResult`.
    pub fn validate(
        &self,
        recommendation: &TradeRecommendation,
        positions: &[Position],
        account: &AccountSnapshot,
        vix: Option<Decimal>,
    ) -> RiskResult<RiskCheckResult> {
        recommendation.validate()?;

        if !account.has_equity() {
            error!(
                account = %account.account_id,
                net_liquidation = %account.net_liquidation,
                "Account has no positive net liquidation"
            );
        }

        let mut result = RiskCheckResult::pass();
        if let Some(vix) = vix {
            result.merge(self.check_volatility(recommendation, vix));
        }
        result.merge(self.check_margin(recommendation, account));
        result.merge(self.check_position_limits(recommendation, positions));
        result.merge(self.check_concentration(recommendation, positions, account));
        result.merge(self.check_buying_power(recommendation, account));

        if result.approved {
            info!(
                action = %recommendation.action,
                quantity = result.effective_quantity(recommendation.quantity),
                symbol = %recommendation.symbol,
                "Trade approved"
            );
        } else {
            warn!(
                action = %recommendation.action,
                quantity = recommendation.quantity,
                symbol = %recommendation.symbol,
                "Trade rejected"
            );
            for reason in &result.reasons {
                warn!(symbol = %recommendation.symbol, %reason, "Rejection reason");
            }
        }

        Ok(result)
    }

    /// Block or shrink openings while VIX is elevated.
    pub fn check_volatility(
        &self,
        recommendation: &TradeRecommendation,
        vix: Decimal,
    ) -> RiskCheckResult {
        let mut result = RiskCheckResult::pass();
        if !recommendation.action.is_opening() {
            return result;
        }

        if let Some(max_vix) = self.config.max_vix_for_new_positions {
            if vix > max_vix {
                result.add_violation(
                    RiskViolation::VixTooHigh,
                    format!("VIX {:.1} exceeds maximum {} for new positions", vix, max_vix),
                );
            }
        }

        if let Some(reduce_above) = self.config.reduce_size_when_vix_above {
            if vix > reduce_above {
                let quantity = recommendation.quantity;
                let reduced = (Decimal::from(quantity) * self.config.vix_size_reduction_factor)
                    .floor()
                    .to_u32()
                    .unwrap_or(0);
                if reduced < quantity {
                    let adjusted = reduced.max(1);
                    result.reduce_to(
                        adjusted,
                        format!(
                            "VIX {:.1} above {}: reducing position size from {} to {}",
                            vix, reduce_above, quantity, adjusted
                        ),
                    );
                }
            }
        }

        result
    }

    /// Projected margin usage after the trade.
    pub fn check_margin(
        &self,
        recommendation: &TradeRecommendation,
        account: &AccountSnapshot,
    ) -> RiskCheckResult {
        if !account.has_equity() {
            return RiskCheckResult::reject(
                RiskViolation::MarginExceeded,
                "Total equity is zero or negative",
            );
        }

        let incremental = estimated_margin(recommendation);
        let current_usage = account.margin_used / account.net_liquidation;
        let new_usage = (account.margin_used + incremental) / account.net_liquidation;
        let limit = self.config.max_portfolio_margin_usage;

        debug!(
            symbol = %recommendation.symbol,
            current = %pct(current_usage),
            after_trade = %pct(new_usage),
            limit = %pct(limit),
            "Margin usage"
        );

        if new_usage > limit {
            return RiskCheckResult::reject(
                RiskViolation::MarginExceeded,
                format!(
                    "Trade would increase margin usage to {}% (limit: {}%)",
                    pct(new_usage),
                    pct(limit)
                ),
            );
        }

        RiskCheckResult::pass()
    }

    /// Portfolio-wide and per-symbol open position counts.
    pub fn check_position_limits(
        &self,
        recommendation: &TradeRecommendation,
        positions: &[Position],
    ) -> RiskCheckResult {
        let mut result = RiskCheckResult::pass();
        if !recommendation.action.is_opening() {
            return result;
        }

        let total_open = positions.iter().filter(|p| p.is_open()).count();
        if let Some(max_total) = self.config.max_total_positions {
            if total_open >= max_total as usize {
                result.add_violation(
                    RiskViolation::PositionLimitExceeded,
                    format!("Already at maximum total positions ({max_total})"),
                );
            }
        }

        if let Some(symbol_config) = self.symbols.get(&recommendation.symbol) {
            let symbol_open = positions
                .iter()
                .filter(|p| p.is_open() && p.symbol == recommendation.symbol)
                .count();
            if symbol_open >= symbol_config.max_positions as usize {
                result.add_violation(
                    RiskViolation::PositionLimitExceeded,
                    format!(
                        "Already at maximum positions for {} ({})",
                        recommendation.symbol, symbol_config.max_positions
                    ),
                );
            }
        }

        result
    }

    /// Symbol exposure after the trade against global and per-symbol caps.
    pub fn check_concentration(
        &self,
        recommendation: &TradeRecommendation,
        positions: &[Position],
        account: &AccountSnapshot,
    ) -> RiskCheckResult {
        if !account.has_equity() {
            return RiskCheckResult::reject(
                RiskViolation::ConcentrationExceeded,
                "Cannot calculate concentration: total equity is zero or negative",
            );
        }

        let current_exposure: Decimal = positions
            .iter()
            .filter(|p| p.symbol == recommendation.symbol)
            .map(|p| p.market_value.abs())
            .sum();
        let concentration =
            (current_exposure + new_exposure(recommendation)) / account.net_liquidation;
        let limit = self.config.max_concentration_per_symbol;

        debug!(
            symbol = %recommendation.symbol,
            current = %pct(current_exposure / account.net_liquidation),
            after_trade = %pct(concentration),
            limit = %pct(limit),
            "Concentration"
        );

        let mut result = RiskCheckResult::pass();
        if concentration > limit {
            result.add_violation(
                RiskViolation::ConcentrationExceeded,
                format!(
                    "Trade would increase {} concentration to {}% (limit: {}%)",
                    recommendation.symbol,
                    pct(concentration),
                    pct(limit)
                ),
            );
        }

        if let Some(symbol_limit) = self
            .symbols
            .get(&recommendation.symbol)
            .and_then(SymbolConfig::max_position_fraction)
        {
            if concentration > symbol_limit {
                result.add_violation(
                    RiskViolation::ConcentrationExceeded,
                    format!(
                        "Trade would increase {} concentration to {}% (symbol limit: {}%)",
                        recommendation.symbol,
                        pct(concentration),
                        pct(symbol_limit)
                    ),
                );
            }
        }

        result
    }

    /// Collateral for the trade against available buying power.
    pub fn check_buying_power(
        &self,
        recommendation: &TradeRecommendation,
        account: &AccountSnapshot,
    ) -> RiskCheckResult {
        let required = estimated_margin(recommendation);

        debug!(
            symbol = %recommendation.symbol,
            required = %required,
            available = %account.buying_power,
            "Buying power"
        );

        if required > account.buying_power {
            return RiskCheckResult::reject(
                RiskViolation::BuyingPowerInsufficient,
                format!(
                    "Insufficient buying power: need ${:.2}, have ${:.2}",
                    required, account.buying_power
                ),
            );
        }

        RiskCheckResult::pass()
    }

    /// Whether a short option has lost more than the configured stop.
    pub fn check_stop_loss(&self, position: &Position, current_market_value: Decimal) -> bool {
        if !self.config.enable_stop_loss || !position.is_short_option() {
            return false;
        }

        let entry = position.entry_credit();
        if entry <= Decimal::ZERO {
            return false;
        }

        let loss_pct = (current_market_value.abs() - entry) / entry * Decimal::ONE_HUNDRED;
        if loss_pct > self.config.stop_loss_percent {
            warn!(
                symbol = %position.symbol,
                loss_pct = %loss_pct.round_dp(1),
                stop_loss_pct = %self.config.stop_loss_percent,
                "Stop loss triggered"
            );
            return true;
        }

        false
    }

    /// Aggregate risk figures for reporting.
    pub fn portfolio_risk(
        &self,
        positions: &[Position],
        account: &AccountSnapshot,
    ) -> PortfolioRiskSnapshot {
        let snapshot = PortfolioRiskSnapshot::compute(positions, account);
        info!(
            positions = snapshot.total_positions,
            margin_pct = %pct(snapshot.margin_usage),
            max_concentration_pct = %pct(snapshot.max_concentration),
            "Portfolio risk"
        );
        snapshot
    }
}

/// Margin a recommendation would consume. Only cash-secured puts tie up
/// collateral; covered calls are backed by stock and closes release margin.
pub fn estimated_margin(recommendation: &TradeRecommendation) -> Decimal {
    match (recommendation.action, recommendation.strike()) {
        (Action::OpenPut, Some(strike)) => strike.contract_notional(recommendation.quantity),
        _ => Decimal::ZERO,
    }
}

/// Notional exposure a single-leg opening adds to its symbol.
pub fn new_exposure(recommendation: &TradeRecommendation) -> Decimal {
    match (recommendation.action, recommendation.strike()) {
        (Action::OpenPut | Action::OpenCall, Some(strike)) => {
            strike.contract_notional(recommendation.quantity)
        }
        _ => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RiskError;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use theta_core::{Instrument, OptionContract, OptionRight, Price, SingleLeg, SpreadLegs};

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 16).unwrap()
    }

    fn test_account() -> AccountSnapshot {
        AccountSnapshot {
            account_id: "DU123".to_string(),
            net_liquidation: dec!(100000),
            cash: dec!(100000),
            buying_power: dec!(200000),
            available_funds: dec!(100000),
            excess_liquidity: dec!(100000),
            margin_used: Decimal::ZERO,
            margin_available: dec!(100000),
        }
    }

    fn put_leg(strike: Decimal) -> SingleLeg {
        SingleLeg {
            strike: Price::new(strike),
            expiration: expiry(),
            right: OptionRight::Put,
            premium: Some(Price::new(dec!(2.50))),
            delta: Some(dec!(-0.30)),
        }
    }

    fn open_put(symbol: &str, strike: Decimal, quantity: u32) -> TradeRecommendation {
        TradeRecommendation::open_leg(
            Action::OpenPut,
            symbol,
            quantity,
            put_leg(strike),
            "sell put",
        )
    }

    fn short_put_position(symbol: &str) -> Position {
        Position {
            symbol: symbol.to_string(),
            instrument: Instrument::Option(OptionContract {
                strike: Price::new(dec!(440)),
                expiration: expiry(),
                right: OptionRight::Put,
            }),
            quantity: -1,
            avg_cost: dec!(250),
            market_value: dec!(-200),
            unrealized_pnl: dec!(50),
            realized_pnl: Decimal::ZERO,
        }
    }

    fn validator(config: RiskConfig) -> RiskValidator {
        let spy = SymbolConfig {
            max_positions: 5,
            max_position_size_percent: dec!(50),
            ..SymbolConfig::new("SPY")
        };
        RiskValidator::new(config, [spy])
    }

    #[test]
    fn test_small_put_approved() {
        let v = validator(RiskConfig::default());
        // 10,000 collateral: 10% margin, 10% concentration
        let result = v
            .validate(&open_put("SPY", dec!(100), 1), &[], &test_account(), None)
            .unwrap();
        assert!(result.approved);
        assert!(result.violations.is_empty());
        assert_eq!(result.adjusted_quantity, None);
    }

    #[test]
    fn test_margin_and_concentration_both_reported() {
        let v = validator(RiskConfig::default());
        // 440 * 100 * 2 = 88,000 -> 88% margin, 88% concentration
        let result = v
            .validate(&open_put("SPY", dec!(440), 2), &[], &test_account(), None)
            .unwrap();

        assert!(!result.approved);
        assert!(result.has_violation(RiskViolation::MarginExceeded));
        assert!(result.has_violation(RiskViolation::ConcentrationExceeded));
        assert!(result.reasons.iter().any(|r| r.contains("margin usage to 88.0%")));
        assert!(result.reasons.iter().any(|r| r.contains("symbol limit: 50.0%")));
    }

    #[test]
    fn test_vix_reduction_keeps_approval() {
        let v = validator(RiskConfig::default());
        let result = v
            .validate(&open_put("SPY", dec!(20), 4), &[], &test_account(), Some(dec!(35)))
            .unwrap();

        assert!(result.approved);
        assert_eq!(result.adjusted_quantity, Some(2));
        assert_eq!(result.effective_quantity(4), 2);
        assert!(result.reasons[0].contains("reducing position size from 4 to 2"));
    }

    #[test]
    fn test_vix_reduction_floors_at_one() {
        let v = validator(RiskConfig::default());
        let result = v.check_volatility(&open_put("SPY", dec!(20), 1), dec!(35));
        // floor(0.5) = 0 clamps to 1
        assert_eq!(result.adjusted_quantity, Some(1));

        let result = v.check_volatility(&open_put("SPY", dec!(20), 3), dec!(35));
        assert_eq!(result.adjusted_quantity, Some(1));
    }

    #[test]
    fn test_vix_ceiling_blocks_openings_only() {
        let v = validator(RiskConfig {
            max_vix_for_new_positions: Some(dec!(40)),
            ..Default::default()
        });
        let result = v.check_volatility(&open_put("SPY", dec!(20), 1), dec!(45));
        assert!(result.has_violation(RiskViolation::VixTooHigh));

        let pos = short_put_position("SPY");
        let contract = *pos.option_contract().unwrap();
        let close = TradeRecommendation::close_leg(Action::ClosePut, &pos, contract, "close");
        let result = v.check_volatility(&close, dec!(45));
        assert!(result.approved);
        assert_eq!(result.adjusted_quantity, None);
    }

    #[test]
    fn test_vix_absent_skips_check() {
        let v = validator(RiskConfig {
            max_vix_for_new_positions: Some(dec!(10)),
            ..Default::default()
        });
        let result = v
            .validate(&open_put("SPY", dec!(20), 4), &[], &test_account(), None)
            .unwrap();
        assert!(result.approved);
        assert_eq!(result.adjusted_quantity, None);
    }

    #[test]
    fn test_position_limits() {
        let v = RiskValidator::new(
            RiskConfig {
                max_total_positions: Some(2),
                ..Default::default()
            },
            [SymbolConfig::new("SPY")],
        );
        let positions = vec![short_put_position("SPY"), short_put_position("QQQ")];
        let result = v.check_position_limits(&open_put("SPY", dec!(20), 1), &positions);

        assert_eq!(result.violations.len(), 2);
        assert!(result.reasons[0].contains("maximum total positions (2)"));
        assert!(result.reasons[1].contains("maximum positions for SPY (1)"));
    }

    #[test]
    fn test_position_limits_ignore_closed_and_closing() {
        let v = validator(RiskConfig {
            max_total_positions: Some(1),
            ..Default::default()
        });
        let mut flat = short_put_position("SPY");
        flat.quantity = 0;
        assert!(v
            .check_position_limits(&open_put("SPY", dec!(20), 1), &[flat])
            .approved);

        let pos = short_put_position("SPY");
        let contract = *pos.option_contract().unwrap();
        let close = TradeRecommendation::close_leg(Action::ClosePut, &pos, contract, "close");
        assert!(v.check_position_limits(&close, &[pos.clone(), pos]).approved);
    }

    #[test]
    fn test_zero_equity_rejects() {
        let v = validator(RiskConfig::default());
        let account = AccountSnapshot {
            net_liquidation: Decimal::ZERO,
            ..test_account()
        };
        let result = v
            .validate(&open_put("SPY", dec!(20), 1), &[], &account, None)
            .unwrap();
        assert!(result.has_violation(RiskViolation::MarginExceeded));
        assert!(result.has_violation(RiskViolation::ConcentrationExceeded));
    }

    #[test]
    fn test_buying_power() {
        let v = validator(RiskConfig::default());
        let account = AccountSnapshot {
            buying_power: dec!(1000),
            ..test_account()
        };
        let result = v.check_buying_power(&open_put("SPY", dec!(20), 1), &account);
        assert!(result.has_violation(RiskViolation::BuyingPowerInsufficient));
        assert!(result.reasons[0].contains("need $2000.00, have $1000.00"));
    }

    #[test]
    fn test_close_needs_no_margin() {
        let v = validator(RiskConfig::default());
        let pos = short_put_position("SPY");
        let contract = *pos.option_contract().unwrap();
        let close = TradeRecommendation::close_leg(Action::ClosePut, &pos, contract, "close");
        assert_eq!(estimated_margin(&close), Decimal::ZERO);
        assert_eq!(new_exposure(&close), Decimal::ZERO);

        let result = v
            .validate(&close, &[pos.clone()], &test_account(), Some(dec!(50)))
            .unwrap();
        assert!(result.approved);
    }

    #[test]
    fn test_close_without_position_is_an_error() {
        let v = validator(RiskConfig::default());
        let pos = short_put_position("SPY");
        let contract = *pos.option_contract().unwrap();
        let mut close = TradeRecommendation::close_leg(Action::ClosePut, &pos, contract, "close");
        close.existing_positions.clear();

        let err = v.validate(&close, &[pos], &test_account(), None).unwrap_err();
        assert!(matches!(err, RiskError::InvalidRecommendation(_)));
    }

    fn open_condor(symbol: &str) -> TradeRecommendation {
        TradeRecommendation::spread(
            Action::OpenSpread,
            symbol,
            1,
            SpreadLegs {
                long_put_strike: Price::new(dec!(430)),
                short_put_strike: Price::new(dec!(435)),
                short_call_strike: Price::new(dec!(465)),
                long_call_strike: Price::new(dec!(470)),
                expiration: expiry(),
                net_credit: Some(Price::new(dec!(2))),
                expected_credit: Some(dec!(200)),
                max_loss: Some(dec!(300)),
                max_profit: Some(dec!(200)),
            },
            Vec::new(),
            "condor",
        )
    }

    fn condor_leg(strike: Decimal, right: OptionRight, quantity: i64) -> Position {
        Position {
            symbol: "SPY".to_string(),
            instrument: Instrument::Option(OptionContract {
                strike: Price::new(strike),
                expiration: expiry(),
                right,
            }),
            quantity,
            avg_cost: dec!(100),
            market_value: Decimal::from(quantity) * dec!(-100),
            unrealized_pnl: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
        }
    }

    #[test]
    fn test_spread_opening_skips_vix_gate() {
        let v = validator(RiskConfig {
            max_vix_for_new_positions: Some(dec!(30)),
            reduce_size_when_vix_above: Some(dec!(25)),
            ..Default::default()
        });
        let rec = open_condor("SPY");
        let result = v.validate(&rec, &[], &test_account(), Some(dec!(35))).unwrap();

        assert!(result.approved);
        assert!(!result.has_violation(RiskViolation::VixTooHigh));
        assert_eq!(result.adjusted_quantity, None);
        assert_eq!(estimated_margin(&rec), Decimal::ZERO);

        let put = v
            .validate(&open_put("SPY", dec!(20), 1), &[], &test_account(), Some(dec!(35)))
            .unwrap();
        assert!(put.has_violation(RiskViolation::VixTooHigh));
    }

    #[test]
    fn test_second_condor_not_blocked_by_leg_count() {
        let spy = SymbolConfig {
            max_positions: 2,
            max_position_size_percent: dec!(50),
            ..SymbolConfig::new("SPY")
        };
        let v = RiskValidator::new(RiskConfig::default(), [spy]);
        let positions = vec![
            condor_leg(dec!(430), OptionRight::Put, 1),
            condor_leg(dec!(435), OptionRight::Put, -1),
            condor_leg(dec!(465), OptionRight::Call, -1),
            condor_leg(dec!(470), OptionRight::Call, 1),
        ];

        let result = v
            .validate(&open_condor("SPY"), &positions, &test_account(), None)
            .unwrap();
        assert!(result.approved, "{:?}", result.reasons);
        assert!(!result.has_violation(RiskViolation::PositionLimitExceeded));

        // the same book still caps single-leg sales
        let put = v.check_position_limits(&open_put("SPY", dec!(20), 1), &positions);
        assert!(put.has_violation(RiskViolation::PositionLimitExceeded));
    }

    #[test]
    fn test_stop_loss() {
        let v = validator(RiskConfig {
            enable_stop_loss: true,
            stop_loss_percent: dec!(100),
            ..Default::default()
        });
        let pos = short_put_position("SPY");
        // entry 250; 600 is a 140% loss
        assert!(v.check_stop_loss(&pos, dec!(-600)));
        // 400 is a 60% loss
        assert!(!v.check_stop_loss(&pos, dec!(-400)));

        let disabled = validator(RiskConfig::default());
        assert!(!disabled.check_stop_loss(&pos, dec!(-600)));

        let mut long = pos.clone();
        long.quantity = 1;
        assert!(!v.check_stop_loss(&long, dec!(-600)));
    }

    #[test]
    fn test_portfolio_risk() {
        let v = validator(RiskConfig::default());
        let account = AccountSnapshot {
            margin_used: dec!(25000),
            ..test_account()
        };
        let snapshot = v.portfolio_risk(&[short_put_position("SPY")], &account);
        assert_eq!(snapshot.total_positions, 1);
        assert_eq!(snapshot.margin_usage, dec!(0.25));
        assert_eq!(snapshot.max_concentration, dec!(0.002));
    }
}
