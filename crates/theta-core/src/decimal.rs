//! Precision-safe decimal types for option pricing.
//!
//! Uses `rust_decimal` for exact decimal arithmetic, so strikes, premiums
//! and collateral figures never pick up floating-point drift.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

/// Shares controlled by one equity option contract.
pub const CONTRACT_MULTIPLIER: Decimal = Decimal::ONE_HUNDRED;

/// Price with exact decimal precision.
///
/// Wraps `Decimal` so stock prices, strikes and premiums cannot be mixed
/// up with fractions or percentages in calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Midpoint of a bid/ask pair.
    #[inline]
    pub fn mid(bid: Price, ask: Price) -> Self {
        Self((bid.0 + ask.0) / Decimal::TWO)
    }

    /// Dollar value of `contracts` option contracts at this per-share price.
    ///
    /// For a strike this is the cash needed to secure a short put.
    #[inline]
    pub fn contract_notional(&self, contracts: u32) -> Decimal {
        self.0 * CONTRACT_MULTIPLIER * Decimal::from(contracts)
    }

    /// Absolute distance from `reference` as a fraction of `reference`.
    ///
    /// Returns `None` when the reference price is not positive.
    #[inline]
    pub fn distance_fraction(&self, reference: Price) -> Option<Decimal> {
        if !reference.is_positive() {
            return None;
        }
        Some((self.0 - reference.0).abs() / reference.0)
    }

    /// This price as a percentage of `reference`.
    #[inline]
    pub fn pct_of(&self, reference: Price) -> Option<Decimal> {
        if !reference.is_positive() {
            return None;
        }
        Some(self.0 / reference.0 * Decimal::ONE_HUNDRED)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<Decimal> for Price {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}
