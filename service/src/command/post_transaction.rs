//! [`Command`] for posting a [`Transaction`] to a [`Worker`]'s wallet.

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted, Update},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{transaction, worker, Transaction, Worker},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for posting a [`Transaction`] to a [`Worker`]'s wallet.
///
/// The [`Worker`] row is locked for the whole posting, so the recorded
/// `balance_after` and the cached wallet balance always agree.
#[derive(Clone, Debug)]
pub struct PostTransaction {
    /// ID of the [`Worker`] whose wallet is posted to.
    pub worker_id: worker::Id,

    /// Signed amount to post.
    pub amount: Money,

    /// [`Category`] of the posting.
    ///
    /// [`Category`]: transaction::Category
    pub category: transaction::Category,

    /// Human-readable description of the posting.
    pub description: transaction::Description,

    /// Opaque [`Reference`] correlating the posting with its source.
    ///
    /// [`Reference`]: transaction::Reference
    pub reference: Option<transaction::Reference>,

    /// [`Status`] the posting settles in.
    ///
    /// [`Status`]: transaction::Status
    pub status: transaction::Status,

    /// ID of the [`Worker`] performing the posting.
    pub created_by: worker::Id,

    /// Indicator whether the [`Reference`] must be unique within the
    /// [`Worker`]'s ledger.
    ///
    /// When set, a posting repeating an existing [`Reference`] is rejected
    /// with [`ExecutionError::DuplicateReference`]. Used by batch postings
    /// to stay idempotent.
    ///
    /// [`Reference`]: transaction::Reference
    pub unique_reference: bool,
}

impl<Db> Command<PostTransaction> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Worker, worker::Id>>,
            Ok = Option<Worker>,
            Err = Traced<database::Error>,
        > + Database<
            Select<
                By<
                    Option<transaction::Id>,
                    (worker::Id, transaction::Reference),
                >,
            >,
            Ok = Option<transaction::Id>,
            Err = Traced<database::Error>,
        > + Database<Insert<Transaction>, Err = Traced<database::Error>>
        + Database<Update<Worker>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Transaction;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: PostTransaction,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let PostTransaction {
            worker_id,
            amount,
            category,
            description,
            reference,
            status,
            created_by,
            unique_reference,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serializes concurrent postings to the same wallet.
        let mut worker = tx
            .execute(Lock(By::<Worker, _>::new(worker_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::WorkerNotExists(worker_id))
            .map_err(tracerr::wrap!())?;

        if unique_reference {
            if let Some(reference) = &reference {
                let existing = tx
                    .execute(Select(By::<Option<transaction::Id>, _>::new((
                        worker_id,
                        reference.clone(),
                    ))))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if existing.is_some() {
                    return Err(tracerr::new!(E::DuplicateReference(
                        reference.clone(),
                    )));
                }
            }
        }

        let balance_after = worker.wallet_balance + amount;
        let transaction = Transaction {
            id: transaction::Id::new(),
            worker_id,
            kind: transaction::Kind::of(amount),
            category,
            amount,
            balance_after,
            description,
            reference,
            status,
            created_by,
            created_at: DateTime::now().coerce(),
        };
        tx.execute(Insert(transaction.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        worker.wallet_balance = balance_after;
        tx.execute(Update(worker))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(transaction)
    }
}

/// Error of [`PostTransaction`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Worker`] with the provided ID does not exist.
    #[display("`Worker(id: {_0})` does not exist")]
    WorkerNotExists(#[error(not(source))] worker::Id),

    /// [`Transaction`] with the provided [`Reference`] was already posted
    /// to the [`Worker`]'s ledger.
    ///
    /// [`Reference`]: transaction::Reference
    #[display("`Transaction(reference: {_0})` was already posted")]
    DuplicateReference(#[error(not(source))] transaction::Reference),
}
