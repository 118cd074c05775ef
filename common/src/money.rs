//! [`Money`]-related definitions.

use std::{fmt, iter::Sum, ops, str::FromStr};

#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::{prelude::ToPrimitive as _, Decimal};

/// Signed amount of money in the platform currency (euro).
///
/// Negative amounts represent charges, positive ones represent earnings.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(transparent)
)]
pub struct Money(Decimal);

impl Money {
    /// [`Money`] amount of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Money`] from the provided [`Decimal`] amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Returns the inner [`Decimal`] amount of this [`Money`].
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Rounds this [`Money`] to cents, with ties going away from zero.
    #[must_use]
    pub fn rounded(self) -> Self {
        use rust_decimal::RoundingStrategy;

        Self(self.0.round_dp_with_strategy(
            2,
            RoundingStrategy::MidpointAwayFromZero,
        ))
    }

    /// Indicates whether this [`Money`] is less than zero.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(amount) = self;
        if amount.is_integer() {
            write!(f, "{}", amount.to_i128().expect("integer"))
        } else {
            write!(f, "{}", amount.round_dp(2))
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s).map(Self).map_err(|_| "invalid amount")
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl ops::Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl ops::Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl ops::Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl ops::Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, ops::Add::add)
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::Money;

    fn money(s: &str) -> Money {
        Money::new(s.parse().unwrap())
    }

    #[test]
    fn from_str() {
        assert_eq!(Money::from_str("123.45").unwrap(), money("123.45"));
        assert_eq!(Money::from_str("-40").unwrap(), money("-40"));
        assert_eq!(Money::from_str("0.005").unwrap(), money("0.005"));

        assert!(Money::from_str("").is_err());
        assert!(Money::from_str("12,50").is_err());
        assert!(Money::from_str("12.50EUR").is_err());
    }

    #[test]
    fn to_string() {
        assert_eq!(money("123.45").to_string(), "123.45");
        assert_eq!(money("123.00").to_string(), "123");
        assert_eq!(money("-150").to_string(), "-150");
        assert_eq!(money("0.1299").to_string(), "0.13");
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(money("157.505").rounded(), money("157.51"));
        assert_eq!(money("157.504").rounded(), money("157.50"));
        assert_eq!(money("-10.005").rounded(), money("-10.01"));
        assert_eq!(money("42").rounded(), money("42"));
    }

    #[test]
    fn arithmetic() {
        assert_eq!(money("100") + money("-150"), money("-50"));
        assert_eq!(money("100") - money("40"), money("60"));
        assert_eq!(-money("250"), money("-250"));
        assert_eq!(money("50") * Decimal::from(3), money("150"));
        assert_eq!(
            [money("400"), money("-150"), money("-250")]
                .into_iter()
                .sum::<Money>(),
            Money::ZERO,
        );
    }

    #[test]
    fn sign() {
        assert!(money("-0.01").is_negative());
        assert!(!money("0").is_negative());
        assert!(!money("-0").is_negative());
        assert!(!money("0.01").is_negative());
    }
}
