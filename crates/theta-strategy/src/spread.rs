//! Reconstruction of iron condors from flat broker positions.
//!
//! Brokers report each leg separately. A condor is recognised per
//! expiration when exactly two puts and two calls are open and the signs
//! line up: the inner strikes short, the wings long.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use theta_core::{OptionContract, OptionRight, Position, Price, SpreadLegs};

/// One leg of a reconstructed spread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CondorLeg<'a> {
    pub position: &'a Position,
    pub contract: OptionContract,
}

impl CondorLeg<'_> {
    #[inline]
    pub fn strike(&self) -> Price {
        self.contract.strike
    }
}

/// Four legs sharing one expiration.
#[derive(Debug, Clone, PartialEq)]
pub struct IronCondorPosition<'a> {
    pub expiration: NaiveDate,
    pub long_put: CondorLeg<'a>,
    pub short_put: CondorLeg<'a>,
    pub short_call: CondorLeg<'a>,
    pub long_call: CondorLeg<'a>,
}

impl<'a> IronCondorPosition<'a> {
    /// Net credit received at entry: short premiums minus wing premiums.
    pub fn entry_credit(&self) -> Decimal {
        let cost = |leg: &CondorLeg<'_>| leg.position.avg_cost.abs();
        let shorts = cost(&self.short_put) + cost(&self.short_call);
        let longs = cost(&self.long_put) + cost(&self.long_call);
        shorts - longs
    }

    /// Sum of absolute leg market values.
    pub fn current_value(&self) -> Decimal {
        self.legs()
            .iter()
            .map(|leg| leg.position.market_value.abs())
            .sum()
    }

    /// Profit as a percentage of entry credit. Zero when no credit was taken.
    pub fn profit_percent(&self) -> Decimal {
        let entry = self.entry_credit();
        if entry <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (entry - self.current_value()) / entry * Decimal::ONE_HUNDRED
    }

    /// Spread count, taken from the short put.
    pub fn quantity(&self) -> u32 {
        self.short_put.position.abs_quantity()
    }

    pub fn legs(&self) -> [CondorLeg<'a>; 4] {
        [self.long_put, self.short_put, self.short_call, self.long_call]
    }

    /// Owned copies of the four leg positions.
    pub fn positions(&self) -> Vec<Position> {
        self.legs().iter().map(|leg| leg.position.clone()).collect()
    }

    /// Strike detail for a management recommendation.
    pub fn spread_legs(&self) -> SpreadLegs {
        SpreadLegs {
            long_put_strike: self.long_put.strike(),
            short_put_strike: self.short_put.strike(),
            short_call_strike: self.short_call.strike(),
            long_call_strike: self.long_call.strike(),
            expiration: self.expiration,
            net_credit: None,
            expected_credit: None,
            max_loss: None,
            max_profit: None,
        }
    }
}

/// Group open option positions into iron condors.
///
/// Groups are returned in ascending expiration order. A group with any
/// other shape, or with a sign on the wrong leg, is skipped.
pub fn identify_iron_condors<'a, I>(positions: I) -> Vec<IronCondorPosition<'a>>
where
    I: IntoIterator<Item = &'a Position>,
{
    let mut by_expiration: BTreeMap<NaiveDate, Vec<CondorLeg<'a>>> = BTreeMap::new();
    for position in positions {
        if !position.is_open() {
            continue;
        }
        if let Some(contract) = position.option_contract() {
            by_expiration
                .entry(contract.expiration)
                .or_default()
                .push(CondorLeg {
                    position,
                    contract: *contract,
                });
        }
    }

    by_expiration
        .into_iter()
        .filter_map(|(expiration, legs)| assemble(expiration, legs))
        .collect()
}

fn assemble(expiration: NaiveDate, legs: Vec<CondorLeg<'_>>) -> Option<IronCondorPosition<'_>> {
    let (mut puts, mut calls): (Vec<_>, Vec<_>) = legs
        .into_iter()
        .partition(|leg| leg.contract.right == OptionRight::Put);

    if puts.len() != 2 || calls.len() != 2 {
        return None;
    }

    puts.sort_by_key(|leg| leg.strike());
    calls.sort_by_key(|leg| leg.strike());

    let condor = IronCondorPosition {
        expiration,
        long_put: puts[0],
        short_put: puts[1],
        short_call: calls[0],
        long_call: calls[1],
    };

    let signs_ok = condor.short_put.position.is_short()
        && condor.short_call.position.is_short()
        && condor.long_put.position.quantity > 0
        && condor.long_call.position.quantity > 0;

    signs_ok.then_some(condor)
}
