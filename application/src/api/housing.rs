//! Housing-related endpoints.

use axum::{Extension, Json};
use common::Money;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, generate_rent},
    Command as _,
};
use uuid::Uuid;

use crate::{
    api::{wallet::Transaction, PrivilegeError},
    define_error, AsError, Auth, Error, Service,
};

/// Body of the [`assign_rent`] endpoint.
#[derive(Debug, Deserialize)]
pub struct AssignRentRequest {
    /// ID of the [`Worker`] to house.
    ///
    /// [`Worker`]: service::domain::Worker
    pub worker_id: Uuid,

    /// Rent charged per billing period.
    pub rent_amount: Money,

    /// Billing cadence of the rent: `WEEKLY` or `MONTHLY`.
    pub rent_type: String,

    /// ID of the property the [`Worker`] is housed in.
    ///
    /// [`Worker`]: service::domain::Worker
    pub property_id: Uuid,
}

/// `POST /housing/assign-rent` endpoint housing a [`Worker`].
///
/// [`Worker`]: service::domain::Worker
///
/// # Errors
///
/// - If the provided rent terms are invalid.
/// - If the authenticated [`Worker`] is not a super admin.
/// - If no [`Worker`] with the provided ID exists.
/// - If the authentication fails.
///
/// [`Worker`]: service::domain::Worker
pub async fn assign_rent(
    Extension(service): Extension<Service>,
    Auth(principal): Auth,
    Json(req): Json<AssignRentRequest>,
) -> Result<Json<super::wallet::Worker>, Error> {
    let rent_type =
        req.rent_type.trim().to_uppercase().parse().map_err(|_| {
            Error::invalid_input(
                "INVALID_RENT_TYPE",
                &"`rent_type` must be either `WEEKLY` or `MONTHLY`",
            )
        })?;

    service
        .execute(command::AssignRent {
            worker_id: req.worker_id.into(),
            rent_amount: req.rent_amount,
            rent_type,
            property_id: req.property_id.into(),
            principal,
        })
        .await
        .map(|w| Json(w.into()))
        .map_err(AsError::into_error)
}

/// Body of the [`generate_rent`] endpoint.
#[derive(Debug, Deserialize)]
pub struct GenerateRentRequest {
    /// Billing period the rent is charged for, e.g. `Week 1`.
    pub period: String,
}

/// Response of the [`generate_rent`] endpoint.
#[derive(Debug, Serialize)]
pub struct GenerateRentResponse {
    /// Human-readable summary of the batch.
    pub message: String,

    /// [`Transaction`]s posted by the batch.
    pub transactions: Vec<Transaction>,

    /// Number of [`Worker`]s skipped as already charged for the period.
    ///
    /// [`Worker`]: service::domain::Worker
    pub skipped: usize,

    /// Number of [`Worker`]s whose posting failed.
    ///
    /// [`Worker`]: service::domain::Worker
    pub failed: usize,
}

/// `POST /housing/generate-rent` endpoint charging rent to every chargeable
/// [`Worker`] for the provided period.
///
/// Each [`Worker`] is posted independently, so a partially failed batch
/// still reports the postings that went through.
///
/// [`Worker`]: service::domain::Worker
///
/// # Errors
///
/// - If the provided period is invalid.
/// - If the authentication fails.
pub async fn generate_rent(
    Extension(service): Extension<Service>,
    Auth(principal): Auth,
    Json(req): Json<GenerateRentRequest>,
) -> Result<Json<GenerateRentResponse>, Error> {
    let period = generate_rent::Period::new(req.period).ok_or_else(|| {
        Error::invalid_input(
            "INVALID_PERIOD",
            &"`period` must be a non-empty trimmed string \
              up to 64 characters",
        )
    })?;

    let out = service
        .execute(command::GenerateRent {
            period,
            created_by: principal.worker_id,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(GenerateRentResponse {
        message: format!(
            "Rent batch finished: {} posted, {} skipped, {} failed",
            out.posted.len(),
            out.skipped.len(),
            out.failed.len(),
        ),
        transactions: out.posted.into_iter().map(Into::into).collect(),
        skipped: out.skipped.len(),
        failed: out.failed.len(),
    }))
}

impl AsError for command::assign_rent::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::WorkerNotExists(_) => {
                Some(HousingError::WorkerNotExists.into())
            }
            Self::NonPositiveRent(_) => Some(Error::invalid_input(
                "INVALID_RENT_AMOUNT",
                &"`rent_amount` must be positive",
            )),
            Self::NotSuperAdmin(_) => Some(PrivilegeError::SuperAdmin.into()),
        }
    }
}

impl AsError for generate_rent::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

define_error! {
    enum HousingError {
        #[code = "WORKER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Worker` with the provided ID does not exist"]
        WorkerNotExists,
    }
}
