//! Wallet view [`Query`] definition.

use std::{str::FromStr, time::Duration};

use common::{
    operations::{By, Select},
    pagination::Arguments,
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{worker, Transaction, Worker},
    infra::{database, Database},
    read,
    Query, Service,
};

/// Number of ledger entries returned with a wallet view.
const STATEMENT_LIMIT: usize = 100;

/// [`Query`] assembling a [`Worker`]'s wallet view: the [`Worker`] itself,
/// its latest [`Transaction`]s within the [`Period`], and aggregate
/// [`Stats`] over the same window.
///
/// [`Stats`]: read::wallet::Stats
#[derive(Clone, Copy, Debug)]
pub struct GetWalletView {
    /// ID of the [`Worker`] whose wallet is viewed.
    pub worker_id: worker::Id,

    /// [`Period`] restricting the view.
    pub period: Period,
}

/// Time window of a [`GetWalletView`] [`Query`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Period {
    /// Whole ledger history.
    #[default]
    All,

    /// Last 7 days.
    Week,

    /// Last calendar month.
    Month,
}

impl Period {
    /// Returns the start of this [`Period`] relative to the provided
    /// moment, or [`None`] when unbounded.
    ///
    /// A [`Month`] is a calendar month back, with the day clamped to the
    /// target month's length.
    ///
    /// [`Month`]: Period::Month
    #[must_use]
    pub fn since(self, now: DateTime) -> Option<DateTime> {
        match self {
            Self::All => None,
            Self::Week => Some(now - Duration::from_secs(7 * 24 * 60 * 60)),
            Self::Month => Some(now.sub_months(1)),
        }
    }
}

impl FromStr for Period {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err("invalid `Period`"),
        }
    }
}

/// Output of the [`GetWalletView`] [`Query`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Worker`] whose wallet is viewed.
    pub worker: Worker,

    /// Latest [`Transaction`]s within the requested [`Period`],
    /// newest first.
    pub transactions: Vec<Transaction>,

    /// Aggregates over the requested [`Period`].
    pub stats: read::wallet::Stats,
}

impl<Db> Query<GetWalletView> for Service<Db>
where
    Db: Database<
            Select<By<Option<Worker>, worker::Id>>,
            Ok = Option<Worker>,
            Err = Traced<database::Error>,
        > + Database<
            Select<
                By<
                    read::transaction::statement::Page,
                    read::transaction::statement::Selector,
                >,
            >,
            Ok = read::transaction::statement::Page,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::wallet::Stats, read::transaction::statement::Filter>>,
            Ok = read::wallet::Stats,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        GetWalletView { worker_id, period }: GetWalletView,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let worker = self
            .database()
            .execute(Select(By::<Option<Worker>, _>::new(worker_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::WorkerNotExists(worker_id))
            .map_err(tracerr::wrap!())?;

        let filter = read::transaction::statement::Filter {
            worker_id,
            since: period.since(DateTime::now()).map(DateTime::coerce),
        };

        let page = self
            .database()
            .execute(Select(By::<read::transaction::statement::Page, _>::new(
                read::transaction::statement::Selector {
                    arguments: Arguments::Backward {
                        last: STATEMENT_LIMIT,
                        before: None,
                    },
                    filter,
                },
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let stats = self
            .database()
            .execute(Select(By::<read::wallet::Stats, _>::new(filter)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Output {
            worker,
            transactions: page.edges.into_iter().map(|e| e.node).collect(),
            stats,
        })
    }
}

/// Error of [`GetWalletView`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Worker`] with the provided ID does not exist.
    #[display("`Worker(id: {_0})` does not exist")]
    WorkerNotExists(#[error(not(source))] worker::Id),
}
