//! Iron condor: a short put spread and a short call spread on one expiration.
//!
//! Existing condors are managed before new ones are considered. Each condor
//! gets at most one action per cycle, checked in order: profit target, loss
//! limit, roll window, tested short strike.

use crate::chain::{find_option_at_strike, find_option_by_delta, valid_expirations, DteWindow};
use crate::config::IronCondorConfig;
use crate::spread::{identify_iron_condors, IronCondorPosition};
use crate::strategy::{MarketContext, Strategy, Trend};
use rust_decimal::Decimal;
use theta_core::{
    days_between, Action, OptionRight, Price, SpreadLegs, StrategyKind, SymbolConfig,
    TradeRecommendation, CONTRACT_MULTIPLIER,
};
use tracing::{debug, info};

/// Four-leg neutral premium-selling strategy for one symbol.
#[derive(Debug, Clone)]
pub struct IronCondorStrategy {
    config: SymbolConfig,
    params: IronCondorConfig,
}

impl IronCondorStrategy {
    pub fn new(config: SymbolConfig, params: IronCondorConfig) -> Self {
        Self { config, params }
    }

    pub fn config(&self) -> &SymbolConfig {
        &self.config
    }

    pub fn params(&self) -> &IronCondorConfig {
        &self.params
    }

    fn window(&self) -> DteWindow {
        DteWindow::new(self.config.dte_min, self.config.dte_max)
    }

    fn manage(
        &self,
        ctx: &MarketContext<'_>,
        condor: &IronCondorPosition<'_>,
    ) -> Option<TradeRecommendation> {
        let dte = days_between(ctx.as_of, condor.expiration);
        let profit_pct = condor.profit_percent();

        debug!(
            symbol = %self.config.symbol,
            expiration = %condor.expiration,
            dte,
            profit_pct = %profit_pct.round_dp(1),
            "Checking iron condor"
        );

        let (action, reasoning) = if profit_pct >= self.params.profit_target_percent {
            (
                Action::CloseSpread,
                format!(
                    "Close iron condor for {:.1}% profit (target {}%)",
                    profit_pct, self.params.profit_target_percent
                ),
            )
        } else if profit_pct < Decimal::ZERO && -profit_pct >= self.params.max_loss_percent {
            (
                Action::CloseSpread,
                format!(
                    "Close iron condor for loss: {:.1}% (max loss {}%)",
                    profit_pct, self.params.max_loss_percent
                ),
            )
        } else if dte <= self.config.roll_when_dte {
            (Action::RollSpread, format!("Roll iron condor with {dte} DTE"))
        } else if self.is_tested(ctx.stock_price, condor) {
            (
                Action::AdjustSpread,
                format!(
                    "Price testing strikes: ${:.2} near ${:.2} or ${:.2}",
                    ctx.stock_price.inner(),
                    condor.short_put.strike().inner(),
                    condor.short_call.strike().inner()
                ),
            )
        } else {
            return None;
        };

        info!(
            symbol = %self.config.symbol,
            action = %action,
            expiration = %condor.expiration,
            reasoning = %reasoning,
            "Iron condor management"
        );

        Some(TradeRecommendation::spread(
            action,
            self.config.symbol.clone(),
            condor.quantity(),
            condor.spread_legs(),
            condor.positions(),
            reasoning,
        ))
    }

    /// Stock within the adjustment threshold of either short strike.
    fn is_tested(&self, stock_price: Price, condor: &IronCondorPosition<'_>) -> bool {
        let threshold = self.params.adjustment_threshold;
        [condor.short_put.strike(), condor.short_call.strike()]
            .into_iter()
            .filter_map(|strike| strike.distance_fraction(stock_price))
            .any(|distance| distance < threshold)
    }

    fn open(&self, ctx: &MarketContext<'_>) -> Option<TradeRecommendation> {
        let window = self.window();
        let expirations = valid_expirations(ctx.chain, ctx.as_of, window);
        let Some(target_exp) = expirations.first().copied() else {
            debug!(symbol = %self.config.symbol, "No valid expirations for iron condor");
            return None;
        };

        let short_delta = self.params.short_delta;
        let wing = self.params.wing_width;

        let short_put =
            find_option_by_delta(ctx.chain, OptionRight::Put, short_delta, ctx.as_of, window)
                .filter(|q| q.expiration == target_exp);
        let Some(short_put) = short_put else {
            debug!(
                symbol = %self.config.symbol,
                expiration = %target_exp,
                "Could not find suitable short put"
            );
            return None;
        };

        let short_call =
            find_option_by_delta(ctx.chain, OptionRight::Call, short_delta, ctx.as_of, window)
                .filter(|q| q.expiration == target_exp);
        let Some(short_call) = short_call else {
            debug!(
                symbol = %self.config.symbol,
                expiration = %target_exp,
                "Could not find suitable short call"
            );
            return None;
        };

        let long_put_strike = Price::new(short_put.strike.inner() - wing);
        let long_put =
            find_option_at_strike(ctx.chain, OptionRight::Put, long_put_strike, target_exp);
        let Some(long_put) = long_put else {
            debug!(
                symbol = %self.config.symbol,
                strike = %long_put_strike,
                "Could not find suitable long put"
            );
            return None;
        };

        let long_call_strike = Price::new(short_call.strike.inner() + wing);
        let long_call =
            find_option_at_strike(ctx.chain, OptionRight::Call, long_call_strike, target_exp);
        let Some(long_call) = long_call else {
            debug!(
                symbol = %self.config.symbol,
                strike = %long_call_strike,
                "Could not find suitable long call"
            );
            return None;
        };

        let net_credit = (short_put.mid() + short_call.mid()) - (long_put.mid() + long_call.mid());
        if net_credit.inner() < self.params.min_credit {
            debug!(
                symbol = %self.config.symbol,
                net_credit = %net_credit,
                min_credit = %self.params.min_credit,
                "Net credit below minimum"
            );
            return None;
        }

        let put_width = short_put.strike.inner() - long_put.strike.inner();
        let call_width = long_call.strike.inner() - short_call.strike.inner();
        let max_loss = put_width.max(call_width) - net_credit.inner();

        let legs = SpreadLegs {
            long_put_strike: long_put.strike,
            short_put_strike: short_put.strike,
            short_call_strike: short_call.strike,
            long_call_strike: long_call.strike,
            expiration: target_exp,
            net_credit: Some(net_credit),
            expected_credit: Some(net_credit.inner() * CONTRACT_MULTIPLIER),
            max_loss: Some(max_loss * CONTRACT_MULTIPLIER),
            max_profit: Some(net_credit.inner() * CONTRACT_MULTIPLIER),
        };

        let reasoning = format!(
            "Sell iron condor: ${:.0}/${:.0}/${:.0}/${:.0} for ${:.2} credit",
            long_put.strike.inner(),
            short_put.strike.inner(),
            short_call.strike.inner(),
            long_call.strike.inner(),
            net_credit.inner()
        );

        info!(
            symbol = %self.config.symbol,
            expiration = %target_exp,
            net_credit = %net_credit,
            max_loss = %max_loss,
            "Opening iron condor"
        );

        Some(TradeRecommendation::spread(
            Action::OpenSpread,
            self.config.symbol.clone(),
            1,
            legs,
            Vec::new(),
            reasoning,
        ))
    }
}

impl Strategy for IronCondorStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::IronCondor
    }

    fn symbol(&self) -> &str {
        &self.config.symbol
    }

    fn analyze(&self, ctx: &MarketContext<'_>) -> Vec<TradeRecommendation> {
        let mut recommendations = Vec::new();

        if !self.config.enabled {
            debug!(symbol = %self.config.symbol, "Symbol disabled, skipping");
            return recommendations;
        }

        let positions = ctx.positions_for(&self.config.symbol);
        let condors = identify_iron_condors(positions.iter().copied());
        debug!(symbol = %self.config.symbol, count = condors.len(), "Found iron condor positions");

        for condor in &condors {
            if let Some(rec) = self.manage(ctx, condor) {
                recommendations.push(rec);
            }
        }

        let open_count = u32::try_from(condors.len()).unwrap_or(u32::MAX);
        if open_count < self.config.max_positions {
            recommendations.extend(self.open(ctx));
        }

        recommendations
    }

    fn is_compatible(
        &self,
        _stock_price: Price,
        volatility: Option<Decimal>,
        trend: Option<Trend>,
    ) -> bool {
        if let Some(trend) = trend {
            if trend != Trend::Neutral {
                debug!(symbol = %self.config.symbol, %trend, "Iron condor prefers neutral trends");
                return false;
            }
        }

        if let Some(vol) = volatility {
            if vol > self.params.max_volatility {
                debug!(
                    symbol = %self.config.symbol,
                    volatility = %vol,
                    "Iron condor prefers low volatility"
                );
                return false;
            }
        }

        true
    }
}
