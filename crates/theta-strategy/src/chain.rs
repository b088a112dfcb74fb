//! Option chain search helpers.
//!
//! All searches skip contracts without a two-sided market (bid and ask both
//! positive) and preserve chain input order, so results are deterministic
//! for a given snapshot.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use theta_core::{OptionQuote, OptionRight, Price};

/// Inclusive days-to-expiration window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DteWindow {
    pub min: i64,
    pub max: i64,
}

impl DteWindow {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, dte: i64) -> bool {
        dte >= self.min && dte <= self.max
    }
}

fn is_tradable(
    quote: &OptionQuote,
    right: OptionRight,
    as_of: NaiveDate,
    window: DteWindow,
) -> bool {
    quote.right == right
        && window.contains(quote.days_to_expiration(as_of))
        && quote.has_two_sided_market()
}

/// Find the contract whose delta is closest to `target_delta`.
///
/// The target is negated for puts, so callers pass the absolute delta.
/// Contracts without a delta are ignored. On equal distance the earliest
/// contract in the chain wins.
pub fn find_option_by_delta(
    chain: &[OptionQuote],
    right: OptionRight,
    target_delta: Decimal,
    as_of: NaiveDate,
    window: DteWindow,
) -> Option<&OptionQuote> {
    let target = match right {
        OptionRight::Put => -target_delta.abs(),
        OptionRight::Call => target_delta.abs(),
    };

    let mut best: Option<(&OptionQuote, Decimal)> = None;
    for quote in chain.iter().filter(|q| is_tradable(q, right, as_of, window)) {
        let Some(delta) = quote.delta() else {
            continue;
        };
        let distance = (delta - target).abs();
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((quote, distance)),
        }
    }

    best.map(|(quote, _)| quote)
}

/// All contracts of one right with strike in `[min_strike, max_strike]` on
/// the given expiration.
pub fn find_options_by_strike_range(
    chain: &[OptionQuote],
    right: OptionRight,
    min_strike: Price,
    max_strike: Price,
    expiration: NaiveDate,
    as_of: NaiveDate,
    window: DteWindow,
) -> Vec<&OptionQuote> {
    chain
        .iter()
        .filter(|q| {
            is_tradable(q, right, as_of, window)
                && q.expiration == expiration
                && q.strike >= min_strike
                && q.strike <= max_strike
        })
        .collect()
}

/// Exact strike and expiration lookup. No nearest-strike fallback.
pub fn find_option_at_strike(
    chain: &[OptionQuote],
    right: OptionRight,
    strike: Price,
    expiration: NaiveDate,
) -> Option<&OptionQuote> {
    chain.iter().find(|q| {
        q.right == right
            && q.strike == strike
            && q.expiration == expiration
            && q.has_two_sided_market()
    })
}

/// Distinct expirations inside the window, ascending.
pub fn valid_expirations(
    chain: &[OptionQuote],
    as_of: NaiveDate,
    window: DteWindow,
) -> Vec<NaiveDate> {
    chain
        .iter()
        .filter(|q| window.contains(q.days_to_expiration(as_of)))
        .map(|q| q.expiration)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
