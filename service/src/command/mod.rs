//! [`Command`] definitions.

pub mod assign_rent;
pub mod authorize_principal;
pub mod create_booking;
pub mod delete_booking;
pub mod generate_rent;
pub mod post_transaction;
pub mod set_booking_status;
pub mod update_booking;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    assign_rent::AssignRent, authorize_principal::AuthorizePrincipal,
    create_booking::CreateBooking, delete_booking::DeleteBooking,
    generate_rent::GenerateRent, post_transaction::PostTransaction,
    set_booking_status::SetBookingStatus, update_booking::UpdateBooking,
};
