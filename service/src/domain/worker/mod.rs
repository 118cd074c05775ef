//! [`Worker`] definitions.

pub mod principal;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::property;
#[cfg(doc)]
use crate::domain::{property::Property, Transaction};

pub use self::principal::Principal;

/// Staff member holding a wallet.
#[derive(Clone, Debug, From)]
pub struct Worker {
    /// ID of this [`Worker`].
    pub id: Id,

    /// [`Name`] of this [`Worker`].
    pub name: Name,

    /// [`Role`] of this [`Worker`].
    pub role: Role,

    /// Cached balance of this [`Worker`]'s wallet.
    ///
    /// Must equal the `balance_after` of the latest [`Transaction`] posted
    /// to the wallet, or zero when there are none.
    pub wallet_balance: Money,

    /// Rent charged to this [`Worker`] per billing period, if any.
    pub rent_amount: Option<Money>,

    /// Billing cadence of the [`rent_amount`].
    ///
    /// [`rent_amount`]: Worker::rent_amount
    pub rent_type: Option<RentType>,

    /// [`Property`] this [`Worker`] is housed in, if any.
    pub property_id: Option<property::Id>,

    /// Indicator whether this [`Worker`] is currently employed.
    pub is_active: bool,

    /// [`DateTime`] when this [`Worker`] was created.
    pub created_at: CreationDateTime,
}

impl Worker {
    /// Indicates whether this [`Worker`] should be charged by a rent batch.
    ///
    /// Requires an assigned [`Property`], a configured rent, and active
    /// employment.
    #[must_use]
    pub fn is_rent_chargeable(&self) -> bool {
        self.is_active
            && self.rent_amount.is_some()
            && self.rent_type.is_some()
            && self.property_id.is_some()
    }
}

/// ID of a [`Worker`].
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

/// Name of a [`Worker`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

define_kind! {
    #[doc = "Role of a [`Worker`]."]
    enum Role {
        #[doc = "Full administrative access, including financial state."]
        SuperAdmin = 1,

        #[doc = "Operational access without financial overrides."]
        Admin = 2,

        #[doc = "Books events on behalf of clients."]
        Promoter = 3,
    }
}

define_kind! {
    #[doc = "Billing cadence of a [`Worker`]'s rent."]
    enum RentType {
        #[doc = "Rent is charged per week."]
        Weekly = 1,

        #[doc = "Rent is charged per month."]
        Monthly = 2,
    }
}

/// [`DateTime`] when a [`Worker`] was created.
pub type CreationDateTime = DateTimeOf<(Worker, unit::Creation)>;
