//! [`Command`] for explicitly transitioning a [`Booking`]'s [`Status`].
//!
//! [`Status`]: booking::Status

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{booking, worker::Principal, Booking},
    infra::{database, Database},
    Service,
};

use super::{update_booking::MAX_ATTEMPTS, Command};

/// [`Command`] for explicitly transitioning a [`Booking`] into the provided
/// [`Status`], including overrides of a cancelled [`Booking`].
///
/// Only a [`SuperAdmin`] may transition explicitly, no matter what the
/// client claims about itself: the [`Principal`]'s role comes from storage.
///
/// [`Status`]: booking::Status
/// [`SuperAdmin`]: crate::domain::worker::Role::SuperAdmin
#[derive(Clone, Copy, Debug)]
pub struct SetBookingStatus {
    /// ID of the [`Booking`] to transition.
    pub id: booking::Id,

    /// [`Status`] to transition into.
    ///
    /// [`Status`]: booking::Status
    pub status: booking::Status,

    /// [`Principal`] performing the transition.
    pub principal: Principal,
}

impl<Db> Command<SetBookingStatus> for Service<Db>
where
    Db: Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Ok = bool, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SetBookingStatus,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SetBookingStatus {
            id,
            status,
            principal,
        } = cmd;

        if !principal.is_super_admin() {
            return Err(tracerr::new!(E::NotSuperAdmin(principal)));
        }

        for _ in 0..MAX_ATTEMPTS {
            let mut booking = self
                .database()
                .execute(Select(By::<Option<Booking>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::BookingNotExists(id))
                .map_err(tracerr::wrap!())?;

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

        Err(tracerr::new!(E::ConcurrentModification(id)))
    }
}

/// Error of [`SetBookingStatus`] [`Command`] execution.
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
