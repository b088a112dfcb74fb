//! One decision cycle: select, analyze, validate, report.

use crate::config::AppConfig;
use crate::snapshot::MarketSnapshot;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use theta_core::{Action, OptionContract, Position, TradeRecommendation};
use theta_risk::{PortfolioRiskSnapshot, RiskCheckResult, RiskValidator};
use theta_strategy::{MarketContext, StrategyCounts, StrategySelector};
use theta_telemetry::{CycleStats, Outcome};
use tracing::{info, warn};

/// A recommendation and its risk verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeDecision {
    pub recommendation: TradeRecommendation,
    pub risk: RiskCheckResult,
    /// Contracts to trade after risk adjustment. Zero when rejected.
    pub approved_quantity: u32,
}

impl TradeDecision {
    fn new(recommendation: TradeRecommendation, risk: RiskCheckResult) -> Self {
        let approved_quantity = if risk.approved {
            risk.effective_quantity(recommendation.quantity)
        } else {
            0
        };
        Self {
            recommendation,
            risk,
            approved_quantity,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.risk.approved
    }

    /// The recommendation with its quantity replaced by the approved one.
    pub fn approved_recommendation(&self) -> Option<TradeRecommendation> {
        self.is_approved()
            .then(|| self.recommendation.clone().with_quantity(self.approved_quantity))
    }
}

/// A recommendation that failed structural validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidRecommendation {
    pub symbol: String,
    pub action: Action,
    pub error: String,
}

/// A short option position past its stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopLossAlert {
    pub symbol: String,
    pub contract: OptionContract,
    pub quantity: i64,
    pub entry_credit: Decimal,
    pub market_value: Decimal,
}

/// Output of one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub as_of: NaiveDate,
    pub dry_run: bool,
    pub vix: Option<Decimal>,
    pub portfolio: PortfolioRiskSnapshot,
    pub strategy_counts: StrategyCounts,
    pub decisions: Vec<TradeDecision>,
    pub invalid: Vec<InvalidRecommendation>,
    pub stop_loss_alerts: Vec<StopLossAlert>,
    pub stats: CycleStats,
}

impl CycleReport {
    pub fn approved(&self) -> impl Iterator<Item = &TradeDecision> {
        self.decisions.iter().filter(|d| d.is_approved())
    }

    pub fn rejected(&self) -> impl Iterator<Item = &TradeDecision> {
        self.decisions.iter().filter(|d| !d.is_approved())
    }
}

/// Strategy selection and risk validation wired from configuration.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    symbols: Vec<String>,
    selector: StrategySelector,
    validator: RiskValidator,
    dry_run: bool,
}

impl DecisionEngine {
    pub fn new(config: &AppConfig) -> Self {
        let symbol_configs = config.symbol_configs();
        let symbols = symbol_configs.iter().map(|c| c.symbol.clone()).collect();

        Self {
            symbols,
            selector: StrategySelector::new(config.strategy.clone(), symbol_configs.clone()),
            validator: RiskValidator::new(config.risk.clone(), symbol_configs),
            dry_run: config.dry_run,
        }
    }

    pub fn selector(&self) -> &StrategySelector {
        &self.selector
    }

    pub fn validator(&self) -> &RiskValidator {
        &self.validator
    }

    /// Run every configured symbol through selection, analysis and risk.
    ///
    /// Every decision is validated against the snapshot as given; approvals
    /// earlier in the cycle do not consume limits for later ones.
    pub fn run_cycle(&self, snapshot: &MarketSnapshot) -> CycleReport {
        let as_of = snapshot.evaluation_date();
        let positions = snapshot.positions.as_slice();
        let account = &snapshot.account;

        info!(
            %as_of,
            symbols = self.symbols.len(),
            positions = positions.len(),
            vix = ?snapshot.vix,
            dry_run = self.dry_run,
            "Starting decision cycle"
        );

        let portfolio = self.validator.portfolio_risk(positions, account);
        let mut stats = CycleStats::new();
        let mut decisions = Vec::new();
        let mut invalid = Vec::new();

        for symbol in &self.symbols {
            let Some(market) = snapshot.market(symbol) else {
                warn!(symbol = %symbol, "No market data in snapshot, skipping");
                stats.record_skipped(symbol);
                continue;
            };

            let Some(strategy) = self.selector.select(
                symbol,
                market.stock_price,
                market.volatility,
                market.trend,
                positions,
            ) else {
                stats.record_skipped(symbol);
                continue;
            };

            let ctx = MarketContext {
                as_of,
                stock_price: market.stock_price,
                chain: &market.chain,
                positions,
                account,
            };

            for recommendation in strategy.analyze(&ctx) {
                match self
                    .validator
                    .validate(&recommendation, positions, account, snapshot.vix)
                {
                    Ok(risk) => {
                        let decision = TradeDecision::new(recommendation, risk);
                        stats.record(
                            symbol,
                            if decision.is_approved() {
                                Outcome::Approved {
                                    reduced: decision.approved_quantity
                                        < decision.recommendation.quantity,
                                }
                            } else {
                                Outcome::Rejected
                            },
                        );
                        decisions.push(decision);
                    }
                    Err(e) => {
                        warn!(
                            symbol = %symbol,
                            action = %recommendation.action,
                            error = %e,
                            "Discarding invalid recommendation"
                        );
                        stats.record(symbol, Outcome::Invalid);
                        invalid.push(InvalidRecommendation {
                            symbol: symbol.clone(),
                            action: recommendation.action,
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        let stop_loss_alerts = self.stop_loss_alerts(positions);
        stats.log_summary();

        CycleReport {
            as_of,
            dry_run: self.dry_run,
            vix: snapshot.vix,
            portfolio,
            strategy_counts: StrategySelector::strategy_counts(positions),
            decisions,
            invalid,
            stop_loss_alerts,
            stats,
        }
    }

    fn stop_loss_alerts(&self, positions: &[Position]) -> Vec<StopLossAlert> {
        positions
            .iter()
            .filter(|p| p.is_open())
            .filter(|p| self.validator.check_stop_loss(p, p.market_value))
            .filter_map(|p| {
                p.option_contract().map(|contract| StopLossAlert {
                    symbol: p.symbol.clone(),
                    contract: *contract,
                    quantity: p.quantity,
                    entry_credit: p.entry_credit(),
                    market_value: p.market_value,
                })
            })
            .collect()
    }
}
