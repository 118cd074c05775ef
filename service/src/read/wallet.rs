//! Wallet view definitions.

use common::Money;

#[cfg(doc)]
use crate::domain::{Transaction, Worker};

/// Aggregates over a window of a [`Worker`]'s ledger.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    /// Sum of all positive [`Completed`] [`Transaction`] amounts in the
    /// window.
    ///
    /// [`Completed`]: crate::domain::transaction::Status::Completed
    pub total_income: Money,

    /// Sum of all negative [`Completed`] [`Transaction`] amounts in the
    /// window, as a non-negative value.
    ///
    /// [`Completed`]: crate::domain::transaction::Status::Completed
    pub total_expenses: Money,

    /// Number of [`Pending`] [`Transaction`]s in the window.
    ///
    /// [`Pending`]: crate::domain::transaction::Status::Pending
    pub pending_count: i64,
}
