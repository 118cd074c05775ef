//! Read entities definitions.

pub mod booking;
pub mod transaction;
pub mod wallet;
pub mod worker;
