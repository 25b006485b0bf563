use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use crate::config::RoundingMode;

/// currency amount, exact until explicitly rounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d)
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(Decimal::from_str_exact(s)?))
    }

    /// create from integer amount (soles, dollars, etc)
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from minor amount (cents)
    pub fn from_minor(amount: i64, scale: u32) -> Self {
        Money(Decimal::new(amount, scale))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// round to `dp` places with the given strategy, keeping trailing zeros
    pub fn round_with(&self, dp: u32, mode: RoundingMode) -> Self {
        let mut d = self.0.round_dp_with_strategy(dp, mode.strategy());
        d.rescale(dp);
        Money(d)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// strictly lower than zero
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// number of fractional digits carried
    pub fn scale(&self) -> u32 {
        self.0.scale()
    }

    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl From<i32> for Money {
    fn from(i: i32) -> Self {
        Money::from_major(i as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, x| acc + *x)
    }
}

/// nominal annual interest rate, stored as a percentage (15.00 means 15%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    /// create from a percentage figure (e.g., 15.5 for 15.5%)
    pub fn from_percentage(p: Decimal) -> Self {
        Rate(p)
    }

    /// create from a fraction (e.g., 0.155 for 15.5%)
    pub fn from_fraction(f: Decimal) -> Self {
        Rate(f * Decimal::ONE_HUNDRED)
    }

    /// get as percentage
    pub fn as_percentage(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// monthly periodic rate as a fraction: annual / (12 * 100)
    pub fn monthly_rate(&self, scale: u32, mode: RoundingMode) -> Decimal {
        (self.0 / Decimal::from(1200)).round_dp_with_strategy(scale, mode.strategy())
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl FromStr for Rate {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Rate(Decimal::from_str_exact(s)?))
    }
}

impl From<Decimal> for Rate {
    fn from(d: Decimal) -> Self {
        Rate::from_percentage(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_half_up_rounding() {
        let m = Money::from_decimal(dec!(10.125));
        assert_eq!(m.round_with(2, RoundingMode::HalfUp).to_string(), "10.13");
        assert_eq!(m.round_with(2, RoundingMode::HalfEven).to_string(), "10.12");
        assert_eq!(m.round_with(2, RoundingMode::Down).to_string(), "10.12");
    }

    #[test]
    fn test_rounding_keeps_currency_scale() {
        let m = Money::from_major(150);
        assert_eq!(m.round_with(2, RoundingMode::HalfUp).to_string(), "150.00");
    }

    #[test]
    fn test_exact_arithmetic() {
        let a = Money::from_str_exact("0.10").unwrap();
        let b = Money::from_str_exact("0.20").unwrap();
        assert_eq!(a + b, Money::from_str_exact("0.30").unwrap());

        let total: Money = vec![a, b, a].into_iter().sum();
        assert_eq!(total, Money::from_minor(40, 2));
    }

    #[test]
    fn test_monthly_rate() {
        let rate = Rate::from_percentage(dec!(15.00));
        assert_eq!(rate.monthly_rate(10, RoundingMode::HalfUp), dec!(0.0125));

        // 10/1200 = 0.00833333333...
        let rate = Rate::from_percentage(dec!(10));
        assert_eq!(rate.monthly_rate(10, RoundingMode::HalfUp), dec!(0.0083333333));

        // 20/1200 = 0.01666666666...
        let rate = Rate::from_percentage(dec!(20));
        assert_eq!(rate.monthly_rate(10, RoundingMode::HalfUp), dec!(0.0166666667));
        assert_eq!(rate.monthly_rate(10, RoundingMode::Down), dec!(0.0166666666));
    }

    #[test]
    fn test_rate_from_fraction() {
        assert_eq!(Rate::from_fraction(dec!(0.155)).as_percentage(), dec!(15.5));
        assert_eq!(Rate::from_fraction(dec!(0.155)).to_string(), "15.500%");
    }
}
