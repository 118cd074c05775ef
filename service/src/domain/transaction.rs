//! [`Transaction`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::worker;
#[cfg(doc)]
use crate::domain::{Booking, Worker};

/// Append-only entry in a [`Worker`]'s wallet ledger.
///
/// Transactions are never updated or deleted once posted. Corrections are
/// posted as offsetting entries.
#[derive(Clone, Debug, From)]
pub struct Transaction {
    /// ID of this [`Transaction`].
    pub id: Id,

    /// [`Worker`] whose wallet this [`Transaction`] belongs to.
    pub worker_id: worker::Id,

    /// [`Kind`] of this [`Transaction`].
    pub kind: Kind,

    /// [`Category`] of this [`Transaction`].
    pub category: Category,

    /// Signed amount of this [`Transaction`].
    ///
    /// Positive for earnings, negative for charges.
    pub amount: Money,

    /// Wallet balance right after this [`Transaction`] was posted.
    pub balance_after: Money,

    /// Human-readable [`Description`] of this [`Transaction`].
    pub description: Description,

    /// Opaque [`Reference`] correlating this [`Transaction`] with its
    /// source, if any.
    pub reference: Option<Reference>,

    /// [`Status`] of this [`Transaction`].
    pub status: Status,

    /// [`Worker`] who posted this [`Transaction`].
    pub created_by: worker::Id,

    /// [`DateTime`] when this [`Transaction`] was posted.
    pub created_at: CreationDateTime,
}

/// ID of a [`Transaction`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Kind of a [`Transaction`]."]
    enum Kind {
        #[doc = "Earning credited to the wallet."]
        Commission = 1,

        #[doc = "Charge debited from the wallet."]
        Expense = 2,
    }
}

impl Kind {
    /// Returns the [`Kind`] matching the sign of the provided amount.
    #[must_use]
    pub fn of(amount: Money) -> Self {
        if amount.is_negative() {
            Self::Expense
        } else {
            Self::Commission
        }
    }
}

define_kind! {
    #[doc = "Category of a [`Transaction`]."]
    enum Category {
        #[doc = "Commission earned on a [`Booking`]."]
        Booking = 1,

        #[doc = "Staff housing rent charge."]
        Rent = 2,

        #[doc = "Discretionary bonus."]
        Bonus = 3,

        #[doc = "Disciplinary fine."]
        Fine = 4,

        #[doc = "Manual balance adjustment."]
        Adjustment = 5,
    }
}

define_kind! {
    #[doc = "Status of a [`Transaction`]."]
    enum Status {
        #[doc = "The [`Transaction`] is settled."]
        Completed = 1,

        #[doc = "The [`Transaction`] awaits settlement."]
        Pending = 2,

        #[doc = "The [`Transaction`] was voided by an offsetting entry."]
        Cancelled = 3,
    }
}

/// Human-readable description of a [`Transaction`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `description` matches the
    /// format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(description: impl Into<String>) -> Self {
        Self(description.into())
    }

    /// Creates a new [`Description`] if the given `description` is valid.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Option<Self> {
        let description = description.into();
        Self::check(&description).then_some(Self(description))
    }

    /// Checks whether the given `description` is a valid [`Description`].
    fn check(description: impl AsRef<str>) -> bool {
        let description = description.as_ref();
        description.trim() == description
            && !description.is_empty()
            && description.len() <= 512
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// Opaque reference correlating a [`Transaction`] with its source record,
/// e.g. a [`Booking`] ID or a rent batch tag.
///
/// [`Booking`]: crate::domain::Booking
#[derive(AsRef, Clone, Debug, Display, Eq, From, Hash, Into, PartialEq)]
#[as_ref(str, String)]
#[from(&str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Reference(String);

/// [`DateTime`] when a [`Transaction`] was posted.
pub type CreationDateTime = DateTimeOf<(Transaction, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::Money;

    use super::Kind;

    #[test]
    fn kind_follows_amount_sign() {
        fn money(s: &str) -> Money {
            Money::new(s.parse().unwrap())
        }

        assert_eq!(Kind::of(money("400")), Kind::Commission);
        assert_eq!(Kind::of(money("0")), Kind::Commission);
        assert_eq!(Kind::of(money("-150")), Kind::Expense);
    }
}
