//! Trade recommendations produced by strategies.
//!
//! A recommendation is a proposal, not an order: it describes what a
//! strategy wants to do and why, and is handed to risk validation before
//! anything downstream acts on it.

use crate::decimal::Price;
use crate::error::{CoreError, Result};
use crate::option::OptionRight;
use crate::position::{OptionContract, Position};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy family that owns a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Cash-secured puts rolling into covered calls.
    Wheel,
    /// Short put spread plus short call spread.
    IronCondor,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wheel => write!(f, "wheel"),
            Self::IronCondor => write!(f, "iron_condor"),
        }
    }
}

/// What a recommendation asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    OpenPut,
    OpenCall,
    RollPut,
    RollCall,
    ClosePut,
    CloseCall,
    OpenSpread,
    CloseSpread,
    RollSpread,
    AdjustSpread,
    NoAction,
}

impl Action {
    /// Strategy family this action belongs to. `None` for `NoAction`.
    pub fn strategy_kind(&self) -> Option<StrategyKind> {
        match self {
            Self::OpenPut
            | Self::OpenCall
            | Self::RollPut
            | Self::RollCall
            | Self::ClosePut
            | Self::CloseCall => Some(StrategyKind::Wheel),
            Self::OpenSpread | Self::CloseSpread | Self::RollSpread | Self::AdjustSpread => {
                Some(StrategyKind::IronCondor)
            }
            Self::NoAction => None,
        }
    }

    /// Single-leg put or call sales. Gated by the VIX and position-count checks;
    /// condor openings are sized by the strategy's own `max_positions` count.
    #[inline]
    pub fn is_opening(&self) -> bool {
        matches!(self, Self::OpenPut | Self::OpenCall)
    }

    #[inline]
    pub fn is_close(&self) -> bool {
        matches!(self, Self::ClosePut | Self::CloseCall | Self::CloseSpread)
    }

    #[inline]
    pub fn is_roll(&self) -> bool {
        matches!(self, Self::RollPut | Self::RollCall | Self::RollSpread)
    }

    /// Actions that operate on something already held.
    #[inline]
    pub fn acts_on_existing(&self) -> bool {
        self.is_close() || self.is_roll() || matches!(self, Self::AdjustSpread)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::OpenPut => "open_put",
            Self::OpenCall => "open_call",
            Self::RollPut => "roll_put",
            Self::RollCall => "roll_call",
            Self::ClosePut => "close_put",
            Self::CloseCall => "close_call",
            Self::OpenSpread => "open_spread",
            Self::CloseSpread => "close_spread",
            Self::RollSpread => "roll_spread",
            Self::AdjustSpread => "adjust_spread",
            Self::NoAction => "no_action",
        };
        write!(f, "{s}")
    }
}

/// Terms of a single option leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleLeg {
    pub strike: Price,
    pub expiration: NaiveDate,
    pub right: OptionRight,
    /// Per-share premium (mid) for openings.
    #[serde(default)]
    pub premium: Option<Price>,
    #[serde(default)]
    pub delta: Option<Decimal>,
}

impl From<OptionContract> for SingleLeg {
    fn from(contract: OptionContract) -> Self {
        Self {
            strike: contract.strike,
            expiration: contract.expiration,
            right: contract.right,
            premium: None,
            delta: None,
        }
    }
}

/// Terms of a four-leg iron condor.
///
/// Credit and loss figures are only filled in for openings. `net_credit`
/// is per share; the other three are dollars per spread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadLegs {
    pub long_put_strike: Price,
    pub short_put_strike: Price,
    pub short_call_strike: Price,
    pub long_call_strike: Price,
    pub expiration: NaiveDate,
    #[serde(default)]
    pub net_credit: Option<Price>,
    #[serde(default)]
    pub expected_credit: Option<Decimal>,
    #[serde(default)]
    pub max_loss: Option<Decimal>,
    #[serde(default)]
    pub max_profit: Option<Decimal>,
}

/// Leg detail of a recommendation. Exactly one shape is ever present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Legs {
    Single(SingleLeg),
    Spread(SpreadLegs),
}

/// Replacement contract for a single-leg roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollTarget {
    pub strike: Price,
    pub expiration: NaiveDate,
    pub premium: Price,
    #[serde(default)]
    pub delta: Option<Decimal>,
}

/// A proposed trade action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecommendation {
    pub action: Action,
    pub symbol: String,
    /// Contracts.
    pub quantity: u32,
    pub strategy: StrategyKind,
    #[serde(default)]
    pub legs: Option<Legs>,
    /// Positions being closed, rolled or adjusted.
    #[serde(default)]
    pub existing_positions: Vec<Position>,
    #[serde(default)]
    pub roll_to: Option<RollTarget>,
    pub reasoning: String,
}

impl TradeRecommendation {
    /// New single-leg sale (cash-secured put or covered call).
    pub fn open_leg(
        action: Action,
        symbol: impl Into<String>,
        quantity: u32,
        leg: SingleLeg,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            action,
            symbol: symbol.into(),
            quantity,
            strategy: StrategyKind::Wheel,
            legs: Some(Legs::Single(leg)),
            existing_positions: Vec::new(),
            roll_to: None,
            reasoning: reasoning.into(),
        }
    }

    /// Buy back an existing short leg.
    pub fn close_leg(
        action: Action,
        position: &Position,
        contract: OptionContract,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            action,
            symbol: position.symbol.clone(),
            quantity: position.abs_quantity(),
            strategy: StrategyKind::Wheel,
            legs: Some(Legs::Single(contract.into())),
            existing_positions: vec![position.clone()],
            roll_to: None,
            reasoning: reasoning.into(),
        }
    }

    /// Close an existing short leg and re-open it at `target`.
    pub fn roll_leg(
        action: Action,
        position: &Position,
        contract: OptionContract,
        target: RollTarget,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            roll_to: Some(target),
            ..Self::close_leg(action, position, contract, reasoning)
        }
    }

    /// Any iron condor action.
    pub fn spread(
        action: Action,
        symbol: impl Into<String>,
        quantity: u32,
        legs: SpreadLegs,
        existing_positions: Vec<Position>,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            action,
            symbol: symbol.into(),
            quantity,
            strategy: StrategyKind::IronCondor,
            legs: Some(Legs::Spread(legs)),
            existing_positions,
            roll_to: None,
            reasoning: reasoning.into(),
        }
    }

    /// Copy with a risk-adjusted quantity.
    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn single_leg(&self) -> Option<&SingleLeg> {
        match &self.legs {
            Some(Legs::Single(leg)) => Some(leg),
            _ => None,
        }
    }

    pub fn spread_legs(&self) -> Option<&SpreadLegs> {
        match &self.legs {
            Some(Legs::Spread(legs)) => Some(legs),
            _ => None,
        }
    }

    /// Strike of a single-leg recommendation.
    #[inline]
    pub fn strike(&self) -> Option<Price> {
        self.single_leg().map(|leg| leg.strike)
    }

    /// Check the structural invariants of this recommendation.
    ///
    /// The leg shape must match the action's strategy family, and anything
    /// that acts on a held position must carry that position.
    pub fn validate(&self) -> Result<()> {
        let expected = self.action.strategy_kind();

        if let Some(kind) = expected {
            if kind != self.strategy {
                return Err(CoreError::InvalidRecommendation(format!(
                    "{} belongs to {} but recommendation is tagged {}",
                    self.action, kind, self.strategy
                )));
            }
        }

        match (expected, &self.legs) {
            (None, None)
            | (Some(StrategyKind::Wheel), Some(Legs::Single(_)))
            | (Some(StrategyKind::IronCondor), Some(Legs::Spread(_))) => {}
            (_, legs) => {
                let shape = match legs {
                    None => "no legs",
                    Some(Legs::Single(_)) => "single-leg detail",
                    Some(Legs::Spread(_)) => "spread detail",
                };
                return Err(CoreError::InvalidRecommendation(format!(
                    "{} cannot carry {shape}",
                    self.action
                )));
            }
        }

        if self.action.acts_on_existing() && self.existing_positions.is_empty() {
            return Err(CoreError::InvalidRecommendation(format!(
                "{} on {} has no existing position reference",
                self.action, self.symbol
            )));
        }

        if matches!(self.action, Action::RollPut | Action::RollCall) && self.roll_to.is_none() {
            return Err(CoreError::InvalidRecommendation(format!(
                "{} on {} has no roll target",
                self.action, self.symbol
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Instrument;
    use rust_decimal_macros::dec;

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 16).unwrap()
    }

    fn contract() -> OptionContract {
        OptionContract {
            strike: Price::new(dec!(440)),
            expiration: expiry(),
            right: OptionRight::Put,
        }
    }

    fn short_put() -> Position {
        Position {
            symbol: "SPY".to_string(),
            instrument: Instrument::Option(contract()),
            quantity: -2,
            avg_cost: dec!(250),
            market_value: dec!(-100),
            unrealized_pnl: dec!(150),
            realized_pnl: Decimal::ZERO,
        }
    }

    #[test]
    fn test_action_classification() {
        assert!(Action::OpenPut.is_opening());
        assert!(Action::OpenCall.is_opening());
        assert!(!Action::OpenSpread.is_opening());
        assert!(!Action::RollPut.is_opening());
        assert!(Action::AdjustSpread.acts_on_existing());
        assert_eq!(Action::CloseCall.strategy_kind(), Some(StrategyKind::Wheel));
        assert_eq!(
            Action::RollSpread.strategy_kind(),
            Some(StrategyKind::IronCondor)
        );
        assert_eq!(Action::NoAction.strategy_kind(), None);
    }

    #[test]
    fn test_close_leg_carries_position() {
        let pos = short_put();
        let rec = TradeRecommendation::close_leg(Action::ClosePut, &pos, contract(), "take profit");
        assert_eq!(rec.quantity, 2);
        assert_eq!(rec.strike(), Some(Price::new(dec!(440))));
        assert_eq!(rec.existing_positions.len(), 1);
        assert!(rec.validate().is_ok());
    }

    #[test]
    fn test_close_without_position_is_invalid() {
        let mut rec =
            TradeRecommendation::close_leg(Action::ClosePut, &short_put(), contract(), "x");
        rec.existing_positions.clear();
        assert!(matches!(
            rec.validate(),
            Err(CoreError::InvalidRecommendation(_))
        ));
    }

    #[test]
    fn test_roll_requires_target() {
        let rec = TradeRecommendation::close_leg(Action::RollPut, &short_put(), contract(), "x");
        assert!(rec.validate().is_err());

        let rolled = TradeRecommendation::roll_leg(
            Action::RollPut,
            &short_put(),
            contract(),
            RollTarget {
                strike: Price::new(dec!(435)),
                expiration: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
                premium: Price::new(dec!(2.10)),
                delta: Some(dec!(-0.29)),
            },
            "roll",
        );
        assert!(rolled.validate().is_ok());
    }

    #[test]
    fn test_leg_shape_must_match_action() {
        let mut rec = TradeRecommendation::open_leg(
            Action::OpenPut,
            "SPY",
            1,
            contract().into(),
            "sell put",
        );
        assert!(rec.validate().is_ok());

        rec.action = Action::OpenSpread;
        assert!(rec.validate().is_err());

        rec.strategy = StrategyKind::IronCondor;
        assert!(rec.validate().is_err());
    }

    #[test]
    fn test_with_quantity() {
        let rec = TradeRecommendation::open_leg(Action::OpenPut, "SPY", 4, contract().into(), "x")
            .with_quantity(2);
        assert_eq!(rec.quantity, 2);
    }

    #[test]
    fn test_serializes_action_snake_case() {
        let rec = TradeRecommendation::open_leg(Action::OpenPut, "SPY", 1, contract().into(), "x");
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["action"], "open_put");
        assert_eq!(json["strategy"], "wheel");
        assert_eq!(json["legs"]["type"], "single");
    }
}
