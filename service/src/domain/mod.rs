//! Domain definitions.

pub mod booking;
pub mod property;
pub mod transaction;
pub mod worker;

pub use self::{booking::Booking, transaction::Transaction, worker::Worker};
