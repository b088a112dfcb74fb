//! Risk check outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of limit a recommendation breached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskViolation {
    MarginExceeded,
    ConcentrationExceeded,
    PositionLimitExceeded,
    VixTooHigh,
    BuyingPowerInsufficient,
    PortfolioOverexposed,
    StopLossTriggered,
}

impl fmt::Display for RiskViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MarginExceeded => "margin_exceeded",
            Self::ConcentrationExceeded => "concentration_exceeded",
            Self::PositionLimitExceeded => "position_limit_exceeded",
            Self::VixTooHigh => "vix_too_high",
            Self::BuyingPowerInsufficient => "buying_power_insufficient",
            Self::PortfolioOverexposed => "portfolio_overexposed",
            Self::StopLossTriggered => "stop_loss_triggered",
        };
        write!(f, "{s}")
    }
}

/// Outcome of validating one recommendation.
///
/// Reasons cover both violations and non-rejecting notes such as a size
/// reduction, so a result can be approved and still carry reasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCheckResult {
    pub approved: bool,
    pub violations: Vec<RiskViolation>,
    pub reasons: Vec<String>,
    /// Smaller quantity to trade instead of the one recommended.
    pub adjusted_quantity: Option<u32>,
}

impl Default for RiskCheckResult {
    fn default() -> Self {
        Self::pass()
    }
}

impl RiskCheckResult {
    pub fn pass() -> Self {
        Self {
            approved: true,
            violations: Vec::new(),
            reasons: Vec::new(),
            adjusted_quantity: None,
        }
    }

    pub fn reject(violation: RiskViolation, reason: impl Into<String>) -> Self {
        let mut result = Self::pass();
        result.add_violation(violation, reason);
        result
    }

    pub fn add_violation(&mut self, violation: RiskViolation, reason: impl Into<String>) {
        self.violations.push(violation);
        self.reasons.push(reason.into());
        self.approved = false;
    }

    /// Record a quantity reduction. Does not affect approval.
    pub fn reduce_to(&mut self, quantity: u32, reason: impl Into<String>) {
        self.adjusted_quantity = Some(quantity);
        self.reasons.push(reason.into());
    }

    /// Fold another check's outcome into this one.
    pub fn merge(&mut self, other: RiskCheckResult) {
        self.violations.extend(other.violations);
        self.reasons.extend(other.reasons);
        if other.adjusted_quantity.is_some() {
            self.adjusted_quantity = other.adjusted_quantity;
        }
        self.approved = self.violations.is_empty();
    }

    #[inline]
    pub fn is_approved(&self) -> bool {
        self.approved
    }

    pub fn has_violation(&self, violation: RiskViolation) -> bool {
        self.violations.contains(&violation)
    }

    /// Quantity to actually trade.
    pub fn effective_quantity(&self, recommended: u32) -> u32 {
        self.adjusted_quantity.unwrap_or(recommended)
    }
}
