//! [`Command`] for assigning housing rent to a [`Worker`].

use common::{
    operations::{By, Commit, Lock, Transact, Transacted, Update},
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{property, worker, worker::Principal, Worker},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] assigning a [`Property`] and a rent charge to a [`Worker`],
/// making it chargeable by rent batches.
///
/// Requires the [`SuperAdmin`] role.
///
/// [`Property`]: crate::domain::Property
/// [`SuperAdmin`]: worker::Role::SuperAdmin
#[derive(Clone, Copy, Debug)]
pub struct AssignRent {
    /// ID of the [`Worker`] to house.
    pub worker_id: worker::Id,

    /// Rent charged per billing period.
    pub rent_amount: Money,

    /// Billing cadence of the rent.
    pub rent_type: worker::RentType,

    /// [`Property`] the [`Worker`] is housed in.
    ///
    /// [`Property`]: crate::domain::Property
    pub property_id: property::Id,

    /// [`Principal`] performing the assignment.
    pub principal: Principal,
}

impl<Db> Command<AssignRent> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Worker, worker::Id>>,
            Ok = Option<Worker>,
            Err = Traced<database::Error>,
        > + Database<Update<Worker>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Worker;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AssignRent) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AssignRent {
            worker_id,
            rent_amount,
            rent_type,
            property_id,
            principal,
        } = cmd;

        if !principal.is_super_admin() {
            return Err(tracerr::new!(E::NotSuperAdmin(principal)));
        }
        if rent_amount <= Money::ZERO {
            return Err(tracerr::new!(E::NonPositiveRent(rent_amount)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut worker = tx
            .execute(Lock(By::<Worker, _>::new(worker_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::WorkerNotExists(worker_id))
            .map_err(tracerr::wrap!())?;

        worker.rent_amount = Some(rent_amount);
        worker.rent_type = Some(rent_type);
        worker.property_id = Some(property_id);

        tx.execute(Update(worker.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(worker)
    }
}

/// Error of [`AssignRent`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Worker`] with the provided ID does not exist.
    #[display("`Worker(id: {_0})` does not exist")]
    WorkerNotExists(#[error(not(source))] worker::Id),

    /// Provided rent amount is zero or negative.
    #[display("rent amount `{_0}` is not positive")]
    NonPositiveRent(#[error(not(source))] Money),

    /// Acting [`Principal`] lacks the [`SuperAdmin`] role.
    ///
    /// [`SuperAdmin`]: worker::Role::SuperAdmin
    #[display("`Worker(id: {})` is not a super admin", _0.worker_id)]
    NotSuperAdmin(#[error(not(source))] Principal),
}
