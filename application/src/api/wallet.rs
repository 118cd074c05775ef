//! Wallet-related endpoints.

use axum::{extract::Query, Extension, Json};
use common::Money;
use serde::{Deserialize, Serialize};
use service::{domain, query, Query as _};
use uuid::Uuid;

use crate::{define_error, AsError, Auth, Error, Service};

/// A [`Worker`] of the system, as returned by the API.
///
/// [`Worker`]: domain::Worker
#[derive(Debug, Serialize)]
pub struct Worker {
    /// ID of this [`Worker`].
    ///
    /// [`Worker`]: domain::Worker
    pub id: Uuid,

    /// Name of this [`Worker`].
    ///
    /// [`Worker`]: domain::Worker
    pub name: String,

    /// Role of this [`Worker`].
    ///
    /// [`Worker`]: domain::Worker
    pub role: String,

    /// Current wallet balance.
    pub wallet_balance: Money,

    /// Rent charged to this [`Worker`], if any.
    ///
    /// [`Worker`]: domain::Worker
    pub rent_amount: Option<Money>,

    /// Cadence the rent is charged with, if any.
    pub rent_type: Option<String>,

    /// ID of the property this [`Worker`] is housed in, if any.
    ///
    /// [`Worker`]: domain::Worker
    pub property_id: Option<Uuid>,

    /// Indicator whether this [`Worker`] is active.
    ///
    /// [`Worker`]: domain::Worker
    pub is_active: bool,

    /// [RFC 3339] timestamp of the creation.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub created_at: String,
}

impl From<domain::Worker> for Worker {
    fn from(w: domain::Worker) -> Self {
        Self {
            id: w.id.into(),
            name: w.name.to_string(),
            role: w.role.to_string(),
            wallet_balance: w.wallet_balance,
            rent_amount: w.rent_amount,
            rent_type: w.rent_type.map(|t| t.to_string()),
            property_id: w.property_id.map(Into::into),
            is_active: w.is_active,
            created_at: w.created_at.to_rfc3339(),
        }
    }
}

/// A [`Transaction`] of a wallet ledger, as returned by the API.
///
/// [`Transaction`]: domain::Transaction
#[derive(Debug, Serialize)]
pub struct Transaction {
    /// ID of this [`Transaction`].
    ///
    /// [`Transaction`]: domain::Transaction
    pub id: Uuid,

    /// ID of the [`Worker`] whose wallet this [`Transaction`] belongs to.
    ///
    /// [`Transaction`]: domain::Transaction
    /// [`Worker`]: domain::Worker
    pub worker_id: Uuid,

    /// Kind of this [`Transaction`].
    ///
    /// [`Transaction`]: domain::Transaction
    pub kind: String,

    /// Category of this [`Transaction`].
    ///
    /// [`Transaction`]: domain::Transaction
    pub category: String,

    /// Signed amount of this [`Transaction`].
    ///
    /// [`Transaction`]: domain::Transaction
    pub amount: Money,

    /// Wallet balance right after this [`Transaction`] was posted.
    ///
    /// [`Transaction`]: domain::Transaction
    pub balance_after: Money,

    /// Human-readable description.
    pub description: String,

    /// Opaque reference to the source record, if any.
    pub reference: Option<String>,

    /// Status of this [`Transaction`].
    ///
    /// [`Transaction`]: domain::Transaction
    pub status: String,

    /// ID of the [`Worker`] who posted this [`Transaction`].
    ///
    /// [`Transaction`]: domain::Transaction
    /// [`Worker`]: domain::Worker
    pub created_by: Uuid,

    /// [RFC 3339] timestamp of the posting.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub created_at: String,
}

impl From<domain::Transaction> for Transaction {
    fn from(t: domain::Transaction) -> Self {
        Self {
            id: t.id.into(),
            worker_id: t.worker_id.into(),
            kind: t.kind.to_string(),
            category: t.category.to_string(),
            amount: t.amount,
            balance_after: t.balance_after,
            description: t.description.to_string(),
            reference: t.reference.map(|r| r.to_string()),
            status: t.status.to_string(),
            created_by: t.created_by.into(),
            created_at: t.created_at.to_rfc3339(),
        }
    }
}

/// Aggregates over a wallet ledger window.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Stats {
    /// Sum of all positive amounts.
    pub total_income: Money,

    /// Sum of all negative amounts, as a positive number.
    pub total_expenses: Money,

    /// Number of pending [`Transaction`]s.
    ///
    /// [`Transaction`]: domain::Transaction
    pub pending_count: i64,
}

/// Parameters of the [`view`] endpoint.
#[derive(Debug, Deserialize)]
pub struct ViewParams {
    /// ID of the [`Worker`] whose wallet to view.
    ///
    /// Defaults to the authenticated [`Worker`].
    ///
    /// [`Worker`]: domain::Worker
    pub worker_id: Option<Uuid>,

    /// Time window of the view: `all`, `week` or `month`.
    ///
    /// Defaults to `all`.
    pub period: Option<String>,
}

/// Wallet view returned by the [`view`] endpoint.
#[derive(Debug, Serialize)]
pub struct View {
    /// [`Worker`] whose wallet is viewed.
    ///
    /// [`Worker`]: domain::Worker
    pub worker: Worker,

    /// Latest [`Transaction`]s within the requested window, newest first.
    ///
    /// [`Transaction`]: domain::Transaction
    pub transactions: Vec<Transaction>,

    /// Aggregates over the requested window.
    pub stats: Stats,
}

/// `GET /wallet` endpoint returning the wallet [`View`] of a [`Worker`].
///
/// [`Worker`]: domain::Worker
///
/// # Errors
///
/// - If the provided period is not recognized.
/// - If no [`Worker`] with the provided ID exists.
/// - If the authentication fails.
///
/// [`Worker`]: domain::Worker
pub async fn view(
    Extension(service): Extension<Service>,
    Auth(principal): Auth,
    Query(params): Query<ViewParams>,
) -> Result<Json<View>, Error> {
    let worker_id = params
        .worker_id
        .map_or(principal.worker_id, Into::into);
    let period = params
        .period
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(|_: &str| {
            Error::invalid_input(
                "INVALID_PERIOD",
                &"`period` must be one of `all`, `week` or `month`",
            )
        })?
        .unwrap_or_default();

    let out = service
        .execute(query::GetWalletView { worker_id, period })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(View {
        worker: out.worker.into(),
        transactions: out.transactions.into_iter().map(Into::into).collect(),
        stats: Stats {
            total_income: out.stats.total_income,
            total_expenses: out.stats.total_expenses,
            pending_count: out.stats.pending_count,
        },
    }))
}

impl AsError for query::wallet::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::WorkerNotExists(_) => Some(WalletError::WorkerNotExists.into()),
        }
    }
}

define_error! {
    enum WalletError {
        #[code = "WORKER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Worker` with the provided ID does not exist"]
        WorkerNotExists,
    }
}
