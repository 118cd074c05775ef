//! [`Command`] for posting a rent batch.

use common::operations::{By, Select};
use derive_more::{AsRef, Display, Error, From, FromStr};
use tracerr::Traced;

use crate::{
    domain::{transaction, worker, Transaction, Worker},
    infra::{database, Database},
    read,
    Service,
};

use super::{post_transaction, Command, PostTransaction};

/// [`Command`] charging rent to every chargeable [`Worker`] for the
/// provided [`Period`].
///
/// Each [`Worker`] is posted independently: one failing posting does not
/// roll back the others. Re-running the batch for the same [`Period`] skips
/// [`Worker`]s already charged, keyed by the batch [`Reference`].
///
/// [`Reference`]: transaction::Reference
#[derive(Clone, Debug)]
pub struct GenerateRent {
    /// [`Period`] the rent is charged for.
    pub period: Period,

    /// ID of the [`Worker`] running the batch.
    pub created_by: worker::Id,
}

/// Billing period of a rent batch, e.g. `Week 1` or `Agosto 2026`.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Period(String);

impl Period {
    /// Creates a new [`Period`] if the given `period` is valid.
    #[must_use]
    pub fn new(period: impl Into<String>) -> Option<Self> {
        let period = period.into();
        Self::check(&period).then_some(Self(period))
    }

    /// Checks whether the given `period` is a valid [`Period`].
    fn check(period: impl AsRef<str>) -> bool {
        let period = period.as_ref();
        period.trim() == period && !period.is_empty() && period.len() <= 64
    }

    /// Returns the [`Reference`] tagging all the postings of this
    /// [`Period`]'s batch.
    ///
    /// The tag is a slug: `Week 1` becomes `RENT-week-1`.
    ///
    /// [`Reference`]: transaction::Reference
    #[must_use]
    pub fn reference(&self) -> transaction::Reference {
        let slug = self
            .0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect::<String>();

        transaction::Reference::from(format!("RENT-{slug}"))
    }
}

impl FromStr for Period {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Period`")
    }
}

/// Output of the [`GenerateRent`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Transaction`]s posted by the batch.
    pub posted: Vec<Transaction>,

    /// [`Worker`]s skipped because they were already charged for the
    /// [`Period`].
    pub skipped: Vec<worker::Id>,

    /// [`Worker`]s whose posting failed.
    pub failed: Vec<worker::Id>,
}

impl<Db> Command<GenerateRent> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Worker>, read::worker::RentRoster>>,
        Ok = Vec<Worker>,
        Err = Traced<database::Error>,
    >,
    Self: Command<
        PostTransaction,
        Ok = Transaction,
        Err = Traced<post_transaction::ExecutionError>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: GenerateRent) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let GenerateRent { period, created_by } = cmd;

        let roster = self
            .database()
            .execute(Select(By::<Vec<Worker>, _>::new(
                read::worker::RentRoster,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let reference = period.reference();
        let mut out = Output {
            posted: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        };
        for worker in roster {
            let Some(rent) = worker.rent_amount else {
                // `RentRoster` guarantees a configured rent.
                continue;
            };

            let description =
                transaction::Description::new(format!("Affitto {period}"))
                    .expect("`Period` is a valid `Description`");

            let posting = self
                .execute(PostTransaction {
                    worker_id: worker.id,
                    amount: -rent,
                    category: transaction::Category::Rent,
                    description,
                    reference: Some(reference.clone()),
                    status: transaction::Status::Completed,
                    created_by,
                    unique_reference: true,
                })
                .await;
            match posting {
                Ok(transaction) => out.posted.push(transaction),
                Err(e) => match e.as_ref() {
                    post_transaction::ExecutionError::DuplicateReference(
                        _,
                    ) => out.skipped.push(worker.id),
                    post_transaction::ExecutionError::Db(_)
                    | post_transaction::ExecutionError::WorkerNotExists(
                        _,
                    ) => {
                        tracing::warn!(
                            worker_id = %worker.id,
                            error = %e,
                            "rent posting failed",
                        );
                        out.failed.push(worker.id);
                    }
                },
            }
        }

        Ok(out)
    }
}

/// Error of [`GenerateRent`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
