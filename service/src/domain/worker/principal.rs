//! [`Principal`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::DateTimeOf;
use derive_more::{AsRef, Display, FromStr};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::Worker;
use crate::domain::worker;

/// Authenticated actor performing an operation.
///
/// The [`Role`] is always read from the [`Worker`] record, never taken from
/// the client.
///
/// [`Role`]: worker::Role
#[derive(Clone, Copy, Debug)]
pub struct Principal {
    /// ID of the [`Worker`] acting.
    pub worker_id: worker::Id,

    /// [`Role`] of the acting [`Worker`].
    ///
    /// [`Role`]: worker::Role
    pub role: worker::Role,
}

impl Principal {
    /// Indicates whether this [`Principal`] holds the
    /// [`SuperAdmin`] [`Role`].
    ///
    /// [`Role`]: worker::Role
    /// [`SuperAdmin`]: worker::Role::SuperAdmin
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.role == worker::Role::SuperAdmin
    }
}

/// Claims carried by an access [`Token`].
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Claims {
    /// ID of the [`Worker`] the [`Token`] was issued to.
    #[serde(rename = "sub")]
    pub worker_id: worker::Id,

    /// [`DateTime`] when the [`Token`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

/// Access token of a [`Principal`].
#[derive(AsRef, Clone, Debug, Display, FromStr)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a valid [`Token`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// Marker type indicating [`Token`] expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;

/// [`DateTime`] of a [`Token`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Token, Expiration)>;
