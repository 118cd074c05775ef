//! [`Command`] for creating a new [`Booking`].

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{booking, booking::Quote, worker, Booking},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Booking`].
///
/// Money fields are computed by [`Quote::calculate`]: the recorded
/// `discount` and `tax` are informational and not folded into the totals.
/// The initial [`Status`] is derived from the deposit.
///
/// [`Status`]: booking::Status
#[derive(Clone, Debug)]
pub struct CreateBooking {
    /// Name of the client making the [`Booking`].
    pub client_name: booking::ClientName,

    /// Email of the client.
    pub client_email: booking::Email,

    /// Phone of the client, if any.
    pub client_phone: Option<booking::Phone>,

    /// Name of the event being booked.
    pub event_name: booking::EventName,

    /// Size of the party.
    pub number_of_people: booking::People,

    /// [`PaymentMethod`] the client pays with.
    ///
    /// [`PaymentMethod`]: booking::PaymentMethod
    pub payment_method: booking::PaymentMethod,

    /// Per-person price of the event.
    pub price: Money,

    /// Flat discount granted to the client.
    pub discount: Money,

    /// Flat tax applied on top of the total.
    pub tax: Money,

    /// Amount the client paid upfront.
    pub deposit: Money,

    /// ID of the [`Worker`] creating the [`Booking`].
    ///
    /// [`Worker`]: crate::domain::Worker
    pub created_by: worker::Id,
}

impl<Db> Command<CreateBooking> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateBooking) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateBooking {
            client_name,
            client_email,
            client_phone,
            event_name,
            number_of_people,
            payment_method,
            price,
            discount,
            tax,
            deposit,
            created_by,
        } = cmd;

        let Quote { total, to_pay } = Quote::calculate(
            &self.config().pricing,
            price,
            number_of_people,
            payment_method,
            deposit,
        );
        let status = booking::Status::derive(
            booking::Status::Pending,
            total,
            deposit,
        );

        let now = DateTime::now();
        let mut booking = Booking {
            id: booking::Id::new(),
            booking_id: booking::HumanId::generate(),
            client_name,
            client_email,
            client_phone,
            event_name,
            number_of_people,
            payment_method,
            price,
            discount,
            tax,
            total,
            deposit,
            to_pay,
            status,
            revision: booking::Revision::INITIAL,
            created_by,
            created_at: now.coerce(),
            updated_at: now.coerce(),
            confirmed_at: (status == booking::Status::Confirmed)
                .then(|| now.coerce()),
            cancelled_at: None,
        };

        let mut attempts = MAX_ATTEMPTS;
        loop {
            let tx = self
                .database()
                .execute(Transact)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            match tx.execute(Insert(booking.clone())).await {
                Ok(_) => {
                    tx.execute(Commit)
                        .await
                        .map_err(tracerr::map_from_and_wrap!(=> E))
                        .map(drop)?;

                    return Ok(booking);
                }
                // `HumanId` embeds a timestamp, so collisions are transient.
                Err(e)
                    if attempts > 1
                        && e.as_ref().is_unique_violation(Some(
                            "bookings_booking_id_key",
                        )) =>
                {
                    attempts -= 1;
                    booking.booking_id = booking::HumanId::generate();
                }
                Err(e) => {
                    return Err(e)
                        .map_err(tracerr::map_from_and_wrap!(=> E));
                }
            }
        }
    }
}

/// Number of [`booking::HumanId`]s tried before giving up on collisions.
const MAX_ATTEMPTS: usize = 3;

/// Error of [`CreateBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
