//! [`Query`] collection related to the multiple [`Booking`]s.

use std::collections::HashMap;

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{booking, Booking},
    read,
};

use super::DatabaseQuery;

/// Queries multiple [`Booking`]s by their [`booking::Id`]s.
pub type ByIds =
    DatabaseQuery<By<HashMap<booking::Id, Booking>, Vec<booking::Id>>>;

/// Queries a list of [`Booking`]s.
pub type List = DatabaseQuery<
    By<read::booking::list::Page, read::booking::list::Selector>,
>;

/// Queries total count of [`Booking`]s.
pub type TotalCount =
    DatabaseQuery<By<read::booking::list::TotalCount, ()>>;
