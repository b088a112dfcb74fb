//! Portfolio-level risk snapshot for reporting.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use theta_core::{AccountSnapshot, Position};

/// Aggregate exposure figures across all positions.
///
/// Delta and theta are placeholders until position Greeks are supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioRiskSnapshot {
    pub total_positions: usize,
    pub total_margin_used: Decimal,
    /// Margin used as a fraction of net liquidation.
    pub margin_usage: Decimal,
    /// Per-symbol exposure as a fraction of net liquidation.
    pub concentration: BTreeMap<String, Decimal>,
    pub max_concentration: Decimal,
    pub total_delta: Decimal,
    pub total_theta: Decimal,
}

impl PortfolioRiskSnapshot {
    pub fn compute(positions: &[Position], account: &AccountSnapshot) -> Self {
        let open: Vec<&Position> = positions.iter().filter(|p| p.is_open()).collect();

        let mut exposure: BTreeMap<String, Decimal> = BTreeMap::new();
        for position in &open {
            *exposure.entry(position.symbol.clone()).or_default() += position.market_value.abs();
        }

        let concentration: BTreeMap<String, Decimal> = if account.has_equity() {
            exposure
                .into_iter()
                .map(|(symbol, value)| (symbol, value / account.net_liquidation))
                .collect()
        } else {
            BTreeMap::new()
        };

        let max_concentration = concentration
            .values()
            .copied()
            .max()
            .unwrap_or(Decimal::ZERO);

        Self {
            total_positions: open.len(),
            total_margin_used: account.margin_used,
            margin_usage: account.margin_usage().unwrap_or(Decimal::ZERO),
            concentration,
            max_concentration,
            total_delta: Decimal::ZERO,
            total_theta: Decimal::ZERO,
        }
    }
}
