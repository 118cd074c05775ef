//! [`Booking`] definitions.

pub mod pricing;

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::worker;
#[cfg(doc)]
use crate::domain::Worker;

pub use self::pricing::Quote;

/// Event reservation made by a client.
#[derive(Clone, Debug, From)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// Human-readable ID of this [`Booking`].
    pub booking_id: HumanId,

    /// [`ClientName`] of this [`Booking`].
    pub client_name: ClientName,

    /// [`Email`] of the client.
    pub client_email: Email,

    /// [`Phone`] of the client.
    pub client_phone: Option<Phone>,

    /// [`EventName`] this [`Booking`] reserves.
    pub event_name: EventName,

    /// Size of the reserved party.
    pub number_of_people: People,

    /// [`PaymentMethod`] the client pays with.
    pub payment_method: PaymentMethod,

    /// Per-person price of the event.
    pub price: Money,

    /// Flat discount granted to the client.
    pub discount: Money,

    /// Flat tax applied on top of the total.
    pub tax: Money,

    /// Full contract value of this [`Booking`].
    pub total: Money,

    /// Amount the client has paid upfront.
    pub deposit: Money,

    /// Remaining amount to be paid.
    ///
    /// Negative when the [`deposit`] exceeds the [`total`].
    ///
    /// [`deposit`]: Booking::deposit
    /// [`total`]: Booking::total
    pub to_pay: Money,

    /// [`Status`] of this [`Booking`].
    pub status: Status,

    /// [`Revision`] of this [`Booking`], for detecting concurrent edits.
    pub revision: Revision,

    /// [`Worker`] who created this [`Booking`].
    pub created_by: worker::Id,

    /// [`DateTime`] when this [`Booking`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Booking`] was last updated.
    pub updated_at: UpdateDateTime,

    /// [`DateTime`] when this [`Booking`] was first confirmed.
    pub confirmed_at: Option<ConfirmationDateTime>,

    /// [`DateTime`] when this [`Booking`] was first cancelled.
    pub cancelled_at: Option<CancellationDateTime>,
}

impl Booking {
    /// Moves this [`Booking`] into the provided [`Status`], stamping
    /// lifecycle timestamps.
    ///
    /// `confirmed_at` and `cancelled_at` are write-once: re-entering a
    /// [`Status`] keeps the original timestamp.
    pub fn transition_to(&mut self, status: Status) {
        let now = common::DateTime::now();
        self.updated_at = now.coerce();
        if self.status == status {
            return;
        }

        self.status = status;
        match status {
            Status::Confirmed => {
                if self.confirmed_at.is_none() {
                    self.confirmed_at = Some(now.coerce());
                }
            }
            Status::Cancelled => {
                if self.cancelled_at.is_none() {
                    self.cancelled_at = Some(now.coerce());
                }
            }
            Status::Pending => {}
        }
    }
}

/// ID of a [`Booking`].
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

/// Human-readable ID of a [`Booking`], shown on receipts.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct HumanId(String);

impl HumanId {
    /// Generates a new [`HumanId`].
    ///
    /// Uniqueness is enforced by storage, the random suffix only keeps
    /// same-second collisions unlikely.
    #[must_use]
    pub fn generate() -> Self {
        let ts = common::DateTime::now().unix_timestamp();
        let suffix = &Uuid::new_v4().simple().to_string()[..6];
        Self(format!("BK-{ts}-{suffix}"))
    }

    /// Creates a new [`HumanId`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `id` must be a valid [`HumanId`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Name of the client who made a [`Booking`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct ClientName(String);

impl ClientName {
    /// Creates a new [`ClientName`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`ClientName`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`ClientName`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for ClientName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ClientName`")
    }
}

/// Name of the event a [`Booking`] reserves.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct EventName(String);

impl EventName {
    /// Creates a new [`EventName`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`EventName`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`EventName`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for EventName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `EventName`")
    }
}

/// Email address of a [`Booking`]'s client.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]{2,}$").expect("valid regex")
        });

        REGEX.is_match(address.as_ref())
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Phone number of a [`Booking`]'s client.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `number` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Creates a new [`Phone`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Phone`].
    fn check(number: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\+?\d[\d\s-]{5,18}\d$").expect("valid regex")
        });

        REGEX.is_match(number.as_ref())
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// Size of the party a [`Booking`] reserves for.
#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Into, PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct People(i32);

impl People {
    /// Creates a new [`People`] count if the given `num` is positive.
    #[must_use]
    pub fn new(num: i32) -> Option<Self> {
        (num > 0).then_some(Self(num))
    }

    /// Returns this [`People`] count as an [`i32`].
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

define_kind! {
    #[doc = "Payment method of a [`Booking`]."]
    enum PaymentMethod {
        #[doc = "Cash payment."]
        Cash = 1,

        #[doc = "Credit card payment."]
        Card = 2,

        #[doc = "POS terminal payment."]
        Pos = 3,

        #[doc = "Bank transfer payment."]
        Transfer = 4,
    }
}

impl PaymentMethod {
    /// Indicates whether this [`PaymentMethod`] carries a processing
    /// surcharge.
    #[must_use]
    pub fn has_surcharge(self) -> bool {
        match self {
            Self::Card | Self::Pos | Self::Transfer => true,
            Self::Cash => false,
        }
    }
}

define_kind! {
    #[doc = "Status of a [`Booking`]."]
    enum Status {
        #[doc = "The [`Booking`] awaits full payment."]
        Pending = 1,

        #[doc = "The [`Booking`] is fully paid."]
        Confirmed = 2,

        #[doc = "The [`Booking`] was cancelled."]
        Cancelled = 3,
    }
}

impl Status {
    /// Parses a [`Status`] from free-form client input.
    ///
    /// Accepts canonical names plus the Italian synonyms occurring in
    /// historical data, case-insensitively.
    #[must_use]
    pub fn normalize(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "pending" | "sospeso" | "in attesa" => Some(Self::Pending),
            "confirmed" | "confermato" => Some(Self::Confirmed),
            "cancelled" | "canceled" | "annullato" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Derives the [`Status`] of a [`Booking`] from its paid amounts.
    ///
    /// A deposit covering a positive `total` makes the [`Booking`]
    /// [`Confirmed`], a smaller but non-zero one makes it [`Pending`], and
    /// no deposit at all leaves the current [`Status`] untouched. A
    /// [`Cancelled`] [`Booking`] stays [`Cancelled`] no matter the amounts.
    ///
    /// [`Cancelled`]: Status::Cancelled
    /// [`Confirmed`]: Status::Confirmed
    /// [`Pending`]: Status::Pending
    #[must_use]
    pub fn derive(current: Self, total: Money, deposit: Money) -> Self {
        match current {
            Self::Cancelled => Self::Cancelled,
            Self::Pending | Self::Confirmed => {
                if deposit >= total && total > Money::ZERO {
                    Self::Confirmed
                } else if deposit > Money::ZERO {
                    Self::Pending
                } else {
                    current
                }
            }
        }
    }
}

/// Revision of a [`Booking`], incremented on every successful write.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, Into,
    PartialEq, Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Revision(i32);

impl Revision {
    /// Initial [`Revision`] of a freshly created [`Booking`].
    pub const INITIAL: Self = Self(0);

    /// Returns the [`Revision`] following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// [`DateTime`] when a [`Booking`] was created.
pub type CreationDateTime = DateTimeOf<(Booking, unit::Creation)>;

/// [`DateTime`] when a [`Booking`] was last updated.
pub type UpdateDateTime = DateTimeOf<(Booking, unit::Update)>;

/// [`DateTime`] when a [`Booking`] was first confirmed.
pub type ConfirmationDateTime = DateTimeOf<(Booking, unit::Confirmation)>;

/// [`DateTime`] when a [`Booking`] was first cancelled.
pub type CancellationDateTime = DateTimeOf<(Booking, unit::Cancellation)>;

#[cfg(test)]
mod spec {
    use super::Status;

    #[test]
    fn normalize_accepts_synonyms() {
        assert_eq!(Status::normalize("pending"), Some(Status::Pending));
        assert_eq!(Status::normalize("Sospeso"), Some(Status::Pending));
        assert_eq!(Status::normalize("CONFERMATO"), Some(Status::Confirmed));
        assert_eq!(Status::normalize("confirmed"), Some(Status::Confirmed));
        assert_eq!(Status::normalize("Annullato"), Some(Status::Cancelled));
        assert_eq!(Status::normalize("canceled"), Some(Status::Cancelled));
        assert_eq!(Status::normalize(" cancelled "), Some(Status::Cancelled));

        assert_eq!(Status::normalize("unknown"), None);
        assert_eq!(Status::normalize(""), None);
    }

    #[test]
    fn derive_follows_deposit() {
        fn money(s: &str) -> common::Money {
            common::Money::new(s.parse().unwrap())
        }

        assert_eq!(
            Status::derive(Status::Pending, money("100"), money("40")),
            Status::Pending,
        );
        assert_eq!(
            Status::derive(Status::Pending, money("100"), money("100")),
            Status::Confirmed,
        );
        assert_eq!(
            Status::derive(Status::Confirmed, money("100"), money("150")),
            Status::Confirmed,
        );
        assert_eq!(
            Status::derive(Status::Confirmed, money("100"), money("40")),
            Status::Pending,
        );
        assert_eq!(
            Status::derive(Status::Cancelled, money("100"), money("100")),
            Status::Cancelled,
        );
    }

    #[test]
    fn derive_requires_positive_total_to_confirm() {
        fn money(s: &str) -> common::Money {
            common::Money::new(s.parse().unwrap())
        }

        assert_eq!(
            Status::derive(Status::Pending, money("0"), money("0")),
            Status::Pending,
        );
        assert_eq!(
            Status::derive(Status::Pending, money("0"), money("10")),
            Status::Pending,
        );
    }

    #[test]
    fn derive_without_deposit_leaves_status_unchanged() {
        fn money(s: &str) -> common::Money {
            common::Money::new(s.parse().unwrap())
        }

        assert_eq!(
            Status::derive(Status::Confirmed, money("100"), money("0")),
            Status::Confirmed,
        );
        assert_eq!(
            Status::derive(Status::Pending, money("100"), money("0")),
            Status::Pending,
        );
    }
}
