//! The wheel: sell cash-secured puts, take assignment, sell covered calls.
//!
//! State is inferred from positions on every call:
//! - existing short legs are closed at the profit target or rolled near expiry
//! - stock without short calls gets covered calls
//! - no stock and no short puts gets a cash-secured put

use crate::chain::{find_option_by_delta, DteWindow};
use crate::strategy::{MarketContext, Strategy};
use rust_decimal::Decimal;
use theta_core::{
    days_between, Action, OptionQuote, OptionRight, Position, Price, RollTarget, SingleLeg,
    StrategyKind, SymbolConfig, TradeRecommendation,
};
use tracing::{debug, info, warn};

/// Shares per contract, as an integer for share-count arithmetic.
const SHARES_PER_CONTRACT: i64 = 100;

/// Single-leg premium-selling strategy for one symbol.
#[derive(Debug, Clone)]
pub struct WheelStrategy {
    config: SymbolConfig,
}

impl WheelStrategy {
    pub fn new(config: SymbolConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SymbolConfig {
        &self.config
    }

    fn window(&self) -> DteWindow {
        DteWindow::new(self.config.dte_min, self.config.dte_max)
    }

    fn find_candidate<'c>(
        &self,
        ctx: &MarketContext<'c>,
        right: OptionRight,
    ) -> Option<&'c OptionQuote> {
        find_option_by_delta(ctx.chain, right, self.config.target_delta, ctx.as_of, self.window())
    }

    /// Close at profit target, else roll once inside the roll window.
    fn manage_leg(
        &self,
        ctx: &MarketContext<'_>,
        position: &Position,
    ) -> Option<TradeRecommendation> {
        let contract = *position.option_contract()?;
        let dte = days_between(ctx.as_of, contract.expiration);
        let pnl_percent = position.premium_captured_percent();

        debug!(
            symbol = %self.config.symbol,
            right = %contract.right,
            strike = %contract.strike,
            dte,
            pnl_percent = %pnl_percent.round_dp(1),
            "Checking short leg"
        );

        let (close_action, roll_action) = match contract.right {
            OptionRight::Put => (Action::ClosePut, Action::RollPut),
            OptionRight::Call => (Action::CloseCall, Action::RollCall),
        };

        if pnl_percent >= self.config.roll_when_pnl_percent {
            return Some(TradeRecommendation::close_leg(
                close_action,
                position,
                contract,
                format!(
                    "Close {} for {:.1}% profit (target {}%)",
                    contract.right, pnl_percent, self.config.roll_when_pnl_percent
                ),
            ));
        }

        if dte > self.config.roll_when_dte {
            return None;
        }

        let Some(replacement) = self.find_candidate(ctx, contract.right) else {
            warn!(
                symbol = %self.config.symbol,
                right = %contract.right,
                dte,
                "No replacement contract found for roll"
            );
            return None;
        };

        Some(TradeRecommendation::roll_leg(
            roll_action,
            position,
            contract,
            RollTarget {
                strike: replacement.strike,
                expiration: replacement.expiration,
                premium: replacement.mid(),
                delta: replacement.delta(),
            },
            format!(
                "Roll {} with {} DTE (threshold {})",
                contract.right, dte, self.config.roll_when_dte
            ),
        ))
    }

    /// Premium floor checks, both in dollars and as a percent of spot.
    fn passes_premium_filters(&self, quote: &OptionQuote, stock_price: Price) -> bool {
        let mid = quote.mid();

        if self.config.min_premium > Decimal::ZERO && mid.inner() < self.config.min_premium {
            debug!(
                symbol = %self.config.symbol,
                premium = %mid,
                min_premium = %self.config.min_premium,
                "Premium below minimum"
            );
            return false;
        }

        if self.config.min_premium_percent > Decimal::ZERO {
            let premium_percent = mid.pct_of(stock_price).unwrap_or(Decimal::ZERO);
            if premium_percent < self.config.min_premium_percent {
                debug!(
                    symbol = %self.config.symbol,
                    premium_percent = %premium_percent.round_dp(2),
                    min_premium_percent = %self.config.min_premium_percent,
                    "Premium percent below minimum"
                );
                return false;
            }
        }

        true
    }

    fn open_leg(
        &self,
        quote: &OptionQuote,
        action: Action,
        quantity: u32,
        label: &str,
    ) -> TradeRecommendation {
        let premium = quote.mid();
        let delta = quote.delta().unwrap_or(Decimal::ZERO);
        let reasoning = format!(
            "Sell {label}: ${} {} @ ${:.2} (delta {:.2})",
            quote.strike,
            quote.expiration.format("%Y-%m-%d"),
            premium,
            delta
        );

        info!(
            symbol = %self.config.symbol,
            action = %action,
            strike = %quote.strike,
            expiration = %quote.expiration,
            premium = %premium,
            quantity,
            "Opening recommendation"
        );

        TradeRecommendation::open_leg(
            action,
            self.config.symbol.clone(),
            quantity,
            SingleLeg {
                strike: quote.strike,
                expiration: quote.expiration,
                right: quote.right,
                premium: Some(premium),
                delta: quote.delta(),
            },
            reasoning,
        )
    }

    fn open_covered_call(
        &self,
        ctx: &MarketContext<'_>,
        quantity: u32,
    ) -> Option<TradeRecommendation> {
        let Some(quote) = self.find_candidate(ctx, OptionRight::Call) else {
            debug!(symbol = %self.config.symbol, "No suitable call found");
            return None;
        };

        if !self.passes_premium_filters(quote, ctx.stock_price) {
            return None;
        }

        Some(self.open_leg(quote, Action::OpenCall, quantity, "covered call"))
    }

    fn open_cash_secured_put(
        &self,
        ctx: &MarketContext<'_>,
        quantity: u32,
    ) -> Option<TradeRecommendation> {
        let Some(quote) = self.find_candidate(ctx, OptionRight::Put) else {
            debug!(symbol = %self.config.symbol, "No suitable put found");
            return None;
        };

        if !self.passes_premium_filters(quote, ctx.stock_price) {
            return None;
        }

        let required = quote.strike.contract_notional(quantity);
        if required > ctx.account.buying_power {
            warn!(
                symbol = %self.config.symbol,
                required = %required,
                buying_power = %ctx.account.buying_power,
                "Insufficient buying power for cash-secured put"
            );
            return None;
        }

        Some(self.open_leg(quote, Action::OpenPut, quantity, "cash-secured put"))
    }
}

fn contracts(legs: &[&Position]) -> u32 {
    legs.iter().map(|p| p.abs_quantity()).sum()
}

impl Strategy for WheelStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Wheel
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
        let short_puts: Vec<&Position> = positions
            .iter()
            .copied()
            .filter(|p| p.is_put() && p.is_short())
            .collect();
        let short_calls: Vec<&Position> = positions
            .iter()
            .copied()
            .filter(|p| p.is_call() && p.is_short())
            .collect();
        let shares: i64 = positions
            .iter()
            .filter(|p| p.is_equity() && p.quantity > 0)
            .map(|p| p.quantity)
            .sum();

        debug!(
            symbol = %self.config.symbol,
            shares,
            short_puts = short_puts.len(),
            short_calls = short_calls.len(),
            "Wheel state"
        );

        for position in short_puts.iter().chain(short_calls.iter()) {
            if let Some(rec) = self.manage_leg(ctx, position) {
                recommendations.push(rec);
            }
        }

        if shares > 0 && short_calls.is_empty() {
            if !self.config.write_calls_on_assignment {
                debug!(symbol = %self.config.symbol, "Covered calls disabled for assigned stock");
                return recommendations;
            }
            let covered = shares / SHARES_PER_CONTRACT - i64::from(contracts(&short_calls));
            if let Ok(quantity) = u32::try_from(covered) {
                if quantity > 0 {
                    recommendations.extend(self.open_covered_call(ctx, quantity));
                }
            }
        } else if shares <= 0 && short_puts.is_empty() {
            let quantity = self.config.max_positions.saturating_sub(contracts(&short_puts));
            if quantity > 0 {
                recommendations.extend(self.open_cash_secured_put(ctx, quantity));
            }
        }

        recommendations
    }
}
