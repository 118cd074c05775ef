//! [`Command`] for updating an existing [`Booking`].

use common::{
    operations::{By, Select, Update},
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{booking, booking::Quote, worker::Principal, Booking},
    infra::{database, Database},
    Service,
};

use super::Command;

/// Number of attempts to apply an update before giving up on revision
/// conflicts.
pub(crate) const MAX_ATTEMPTS: usize = 3;

/// [`Command`] for updating an existing [`Booking`].
///
/// Replaces the whole editable record: money fields are recomputed by
/// [`Quote::calculate`] and the [`Status`] is re-derived from the deposit
/// (a cancelled [`Booking`] stays cancelled), unless the edit names a
/// [`Status`] explicitly. An explicit [`Status`] that differs from the
/// stored one requires the [`SuperAdmin`] role, same as
/// [`SetBookingStatus`].
///
/// Concurrent edits are detected by the [`Booking`]'s revision: the update
/// is retried on a fresh read, and surfaces
/// [`ExecutionError::ConcurrentModification`] after [`MAX_ATTEMPTS`].
///
/// [`SetBookingStatus`]: super::SetBookingStatus
/// [`Status`]: booking::Status
/// [`SuperAdmin`]: crate::domain::worker::Role::SuperAdmin
#[derive(Clone, Debug)]
pub struct UpdateBooking {
    /// ID of the [`Booking`] to update.
    pub id: booking::Id,

    /// New name of the client.
    pub client_name: booking::ClientName,

    /// New email of the client.
    pub client_email: booking::Email,

    /// New phone of the client, if any.
    pub client_phone: Option<booking::Phone>,

    /// New name of the booked event.
    pub event_name: booking::EventName,

    /// New size of the party.
    pub number_of_people: booking::People,

    /// New [`PaymentMethod`].
    ///
    /// [`PaymentMethod`]: booking::PaymentMethod
    pub payment_method: booking::PaymentMethod,

    /// New per-person price.
    pub price: Money,

    /// New flat discount.
    pub discount: Money,

    /// New flat tax.
    pub tax: Money,

    /// New deposit paid by the client.
    pub deposit: Money,

    /// Explicit [`Status`] to transition into, skipping the derivation
    /// from the deposit.
    ///
    /// [`Status`]: booking::Status
    pub status: Option<booking::Status>,

    /// [`Principal`] performing the update.
    pub principal: Principal,
}

impl<Db> Command<UpdateBooking> for Service<Db>
where
    Db: Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Ok = bool, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateBooking) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        for _ in 0..MAX_ATTEMPTS {
            let mut booking = self
                .database()
                .execute(Select(By::<Option<Booking>, _>::new(cmd.id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::BookingNotExists(cmd.id))
                .map_err(tracerr::wrap!())?;

            let Quote { total, to_pay } = Quote::calculate(
                &self.config().pricing,
                cmd.price,
                cmd.number_of_people,
                cmd.payment_method,
                cmd.deposit,
            );

            booking.client_name = cmd.client_name.clone();
            booking.client_email = cmd.client_email.clone();
            booking.client_phone = cmd.client_phone.clone();
            booking.event_name = cmd.event_name.clone();
            booking.number_of_people = cmd.number_of_people;
            booking.payment_method = cmd.payment_method;
            booking.price = cmd.price;
            booking.discount = cmd.discount;
            booking.tax = cmd.tax;
            booking.total = total;
            booking.deposit = cmd.deposit;
            booking.to_pay = to_pay;
            let status = match cmd.status {
                Some(status) => {
                    if status != booking.status
                        && !cmd.principal.is_super_admin()
                    {
                        return Err(tracerr::new!(E::NotSuperAdmin(
                            cmd.principal,
                        )));
                    }
                    status
                }
                None => booking::Status::derive(
                    booking.status,
                    total,
                    cmd.deposit,
                ),
            };
            booking.transition_to(status);

            let updated = self
                .database()
                .execute(Update(booking.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if updated {
                booking.revision = booking.revision.next();
                return Ok(booking);
            }
        }

        Err(tracerr::new!(E::ConcurrentModification(cmd.id)))
    }
}

/// Error of [`UpdateBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// Acting [`Principal`] lacks the [`SuperAdmin`] role.
    ///
    /// [`SuperAdmin`]: crate::domain::worker::Role::SuperAdmin
    #[display("`Worker(id: {})` is not a super admin", _0.worker_id)]
    NotSuperAdmin(#[error(not(source))] Principal),

    /// [`Booking`] kept being modified concurrently.
    #[display("`Booking(id: {_0})` is being modified concurrently")]
    ConcurrentModification(#[error(not(source))] booking::Id),
}
