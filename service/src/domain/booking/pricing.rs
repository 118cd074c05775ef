//! [`Booking`] pricing rules.

use common::{Money, Percent};
use rust_decimal::Decimal;

#[cfg(doc)]
use super::Booking;
use super::{PaymentMethod, People};

/// Pricing configuration.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Surcharge applied to [`PaymentMethod`]s with processing costs.
    pub payment_surcharge: Percent,
}

impl Default for Config {
    fn default() -> Self {
        #[expect(unsafe_code, reason = "5 is in the `0..=100` range")]
        let payment_surcharge =
            unsafe { Percent::new_unchecked(Decimal::from(5)) };

        Self { payment_surcharge }
    }
}

/// Computed money fields of a [`Booking`].
///
/// `discount` and `tax` are recorded on the [`Booking`] but intentionally
/// not folded into the totals, matching the books this system replaces.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Quote {
    /// Full contract value.
    pub total: Money,

    /// Amount remaining after the deposit.
    ///
    /// Goes negative when the deposit exceeds the total.
    pub to_pay: Money,
}

impl Quote {
    /// Calculates the [`Quote`] of a [`Booking`].
    ///
    /// `total` is the per-person `price` times the party size, surcharged
    /// for non-cash [`PaymentMethod`]s and rounded to cents.
    #[must_use]
    pub fn calculate(
        config: &Config,
        price: Money,
        people: People,
        method: PaymentMethod,
        deposit: Money,
    ) -> Self {
        let base = price * Decimal::from(people.get());
        let total = if method.has_surcharge() {
            config.payment_surcharge.added_to(base)
        } else {
            base
        }
        .rounded();

        Self {
            total,
            to_pay: (total - deposit).rounded(),
        }
    }
}

#[cfg(test)]
mod spec {
    use super::{Config, Money, PaymentMethod, People, Quote};

    fn money(s: &str) -> Money {
        Money::new(s.parse().unwrap())
    }

    fn quote(price: &str, people: i32, method: PaymentMethod) -> Quote {
        Quote::calculate(
            &Config::default(),
            money(price),
            People::new(people).unwrap(),
            method,
            Money::ZERO,
        )
    }

    #[test]
    fn surcharges_card_payments() {
        let q = quote("50", 3, PaymentMethod::Card);

        assert_eq!(q.total, money("157.50"));
        assert_eq!(q.to_pay, money("157.50"));
    }

    #[test]
    fn surcharges_pos_and_transfer_payments() {
        assert_eq!(quote("50", 3, PaymentMethod::Pos).total, money("157.50"));
        assert_eq!(
            quote("50", 3, PaymentMethod::Transfer).total,
            money("157.50"),
        );
    }

    #[test]
    fn cash_pays_face_value() {
        assert_eq!(quote("50", 3, PaymentMethod::Cash).total, money("150"));
    }

    #[test]
    fn rounds_total_to_cents() {
        // 33.333 * 3 * 1.05 = 104.99895
        assert_eq!(
            quote("33.333", 3, PaymentMethod::Card).total,
            money("105.00"),
        );
    }

    #[test]
    fn overpaid_deposit_goes_negative() {
        let q = Quote::calculate(
            &Config::default(),
            money("50"),
            People::new(2).unwrap(),
            PaymentMethod::Cash,
            money("120"),
        );

        assert_eq!(q.total, money("100"));
        assert_eq!(q.to_pay, money("-20"));
    }
}
