//! Per-cycle decision statistics.
//!
//! Counts what happened to each symbol during one decision cycle:
//! - recommendations: emitted by the selected strategy
//! - approved / rejected: outcome of risk validation
//! - reduced: approved with a smaller quantity
//! - invalid: recommendations that failed structural validation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Decision counts for one symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolCycleStats {
    pub recommendations: u32,
    pub approved: u32,
    pub rejected: u32,
    pub reduced: u32,
    pub invalid: u32,
}

/// Outcome of validating one recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Approved { reduced: bool },
    Rejected,
    Invalid,
}

/// Cycle statistics keyed by symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleStats {
    pub symbols: BTreeMap<String, SymbolCycleStats>,
    /// Symbols for which no strategy was selected.
    pub skipped: Vec<String>,
}

impl CycleStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, symbol: &str, outcome: Outcome) {
        let stats = self.symbols.entry(symbol.to_string()).or_default();
        stats.recommendations += 1;
        match outcome {
            Outcome::Approved { reduced } => {
                stats.approved += 1;
                if reduced {
                    stats.reduced += 1;
                }
            }
            Outcome::Rejected => stats.rejected += 1,
            Outcome::Invalid => stats.invalid += 1,
        }
    }

    pub fn record_skipped(&mut self, symbol: &str) {
        self.skipped.push(symbol.to_string());
    }

    /// Sum over all symbols.
    pub fn totals(&self) -> SymbolCycleStats {
        self.symbols
            .values()
            .fold(SymbolCycleStats::default(), |acc, s| SymbolCycleStats {
                recommendations: acc.recommendations + s.recommendations,
                approved: acc.approved + s.approved,
                rejected: acc.rejected + s.rejected,
                reduced: acc.reduced + s.reduced,
                invalid: acc.invalid + s.invalid,
            })
    }

    /// Emit one summary line per symbol and a total.
    pub fn log_summary(&self) {
        for (symbol, stats) in &self.symbols {
            info!(
                symbol = %symbol,
                recommendations = stats.recommendations,
                approved = stats.approved,
                rejected = stats.rejected,
                reduced = stats.reduced,
                invalid = stats.invalid,
                "Cycle symbol summary"
            );
        }

        let totals = self.totals();
        info!(
            symbols = self.symbols.len(),
            skipped = self.skipped.len(),
            recommendations = totals.recommendations,
            approved = totals.approved,
            rejected = totals.rejected,
            "Cycle summary"
        );
    }
}
