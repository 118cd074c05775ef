//! [`Worker`] read model definition.
//!
//! [`Worker`]: crate::domain::Worker

#[cfg(doc)]
use crate::domain::Worker;

/// Selector of [`Worker`]s chargeable by a rent batch.
///
/// Matches active [`Worker`]s with an assigned property and a configured
/// rent.
#[derive(Clone, Copy, Debug, Default)]
pub struct RentRoster;
