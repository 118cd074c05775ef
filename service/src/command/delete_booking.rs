//! [`Command`] for deleting a [`Booking`].

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{booking, worker::Principal, Booking},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for hard-deleting a [`Booking`].
///
/// Requires the [`SuperAdmin`] role. [`Transaction`]s referencing the
/// [`Booking`] are kept: the ledger is append-only.
///
/// [`SuperAdmin`]: crate::domain::worker::Role::SuperAdmin
/// [`Transaction`]: crate::domain::Transaction
#[derive(Clone, Copy, Debug)]
pub struct DeleteBooking {
    /// ID of the [`Booking`] to delete.
    pub id: booking::Id,

    /// [`Principal`] performing the deletion.
    pub principal: Principal,
}

impl<Db> Command<DeleteBooking> for Service<Db>
where
    Db: Database<
        Delete<By<Booking, booking::Id>>,
        Ok = bool,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteBooking) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteBooking { id, principal } = cmd;

        if !principal.is_super_admin() {
            return Err(tracerr::new!(E::NotSuperAdmin(principal)));
        }

        let deleted = self
            .database()
            .execute(Delete(By::<Booking, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !deleted {
            return Err(tracerr::new!(E::BookingNotExists(id)));
        }

        Ok(())
    }
}

/// Error of [`DeleteBooking`] [`Command`] execution.
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
}
