//! [`Booking`]-related endpoints.
//!
//! [`Booking`]: domain::Booking

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use common::{pagination::Arguments, Money};
use serde::{Deserialize, Serialize};
use service::{
    command,
    domain::{self, booking},
    query, read, Command as _,
};
use uuid::Uuid;

use crate::{
    api::{PaginationError, PrivilegeError, DEFAULT_PAGE_SIZE},
    define_error, AsError, Auth, Error, Service,
};

/// A [`Booking`] of the system, as returned by the API.
///
/// [`Booking`]: domain::Booking
#[derive(Debug, Serialize)]
pub struct Booking {
    /// ID of this [`Booking`].
    ///
    /// [`Booking`]: domain::Booking
    pub id: Uuid,

    /// Human-readable ID shown on receipts.
    pub booking_id: String,

    /// Name of the client.
    pub client_name: String,

    /// Email of the client.
    pub client_email: String,

    /// Phone of the client, if any.
    pub client_phone: Option<String>,

    /// Name of the booked event.
    pub event_name: String,

    /// Size of the party.
    pub number_of_people: i32,

    /// Payment method the client pays with.
    pub payment_method: String,

    /// Per-person price of the event.
    pub price: Money,

    /// Flat discount granted to the client.
    pub discount: Money,

    /// Flat tax applied on top of the total.
    pub tax: Money,

    /// Total of this [`Booking`], including any surcharge.
    ///
    /// [`Booking`]: domain::Booking
    pub total: Money,

    /// Amount the client paid upfront.
    pub deposit: Money,

    /// Amount left to pay.
    pub to_pay: Money,

    /// Status of this [`Booking`].
    ///
    /// [`Booking`]: domain::Booking
    pub status: String,

    /// Revision of this [`Booking`], incremented on every write.
    ///
    /// [`Booking`]: domain::Booking
    pub revision: i32,

    /// ID of the [`Worker`] who created this [`Booking`].
    ///
    /// [`Booking`]: domain::Booking
    /// [`Worker`]: domain::Worker
    pub created_by: Uuid,

    /// [RFC 3339] timestamp of the creation.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub created_at: String,

    /// [RFC 3339] timestamp of the last update.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub updated_at: String,

    /// [RFC 3339] timestamp of the first confirmation, if any.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub confirmed_at: Option<String>,

    /// [RFC 3339] timestamp of the first cancellation, if any.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub cancelled_at: Option<String>,
}

impl From<domain::Booking> for Booking {
    fn from(b: domain::Booking) -> Self {
        Self {
            id: b.id.into(),
            booking_id: b.booking_id.to_string(),
            client_name: b.client_name.to_string(),
            client_email: b.client_email.to_string(),
            client_phone: b.client_phone.map(|p| p.to_string()),
            event_name: b.event_name.to_string(),
            number_of_people: b.number_of_people.get(),
            payment_method: b.payment_method.to_string(),
            price: b.price,
            discount: b.discount,
            tax: b.tax,
            total: b.total,
            deposit: b.deposit,
            to_pay: b.to_pay,
            status: b.status.to_string(),
            revision: b.revision.into(),
            created_by: b.created_by.into(),
            created_at: b.created_at.to_rfc3339(),
            updated_at: b.updated_at.to_rfc3339(),
            confirmed_at: b.confirmed_at.map(|d| d.to_rfc3339()),
            cancelled_at: b.cancelled_at.map(|d| d.to_rfc3339()),
        }
    }
}

/// Editable record of a [`Booking`], as accepted by the API.
///
/// [`Booking`]: domain::Booking
#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    /// Name of the client.
    pub client_name: String,

    /// Email of the client.
    pub client_email: String,

    /// Phone of the client, if any.
    #[serde(default)]
    pub client_phone: Option<String>,

    /// Name of the booked event.
    pub event_name: String,

    /// Size of the party.
    pub number_of_people: i32,

    /// Payment method the client pays with.
    pub payment_method: String,

    /// Per-person price of the event.
    pub price: Money,

    /// Flat discount granted to the client.
    #[serde(default)]
    pub discount: Money,

    /// Flat tax applied on top of the total.
    #[serde(default)]
    pub tax: Money,

    /// Amount the client paid upfront.
    #[serde(default)]
    pub deposit: Money,

    /// Explicit status to transition into, synonyms included.
    ///
    /// When omitted, the status is derived from the deposit.
    #[serde(default)]
    pub status: Option<String>,
}

/// Validated editable record of a [`Booking`].
///
/// [`Booking`]: domain::Booking
#[derive(Clone, Debug)]
struct Record {
    /// Name of the client.
    client_name: booking::ClientName,

    /// Email of the client.
    client_email: booking::Email,

    /// Phone of the client, if any.
    client_phone: Option<booking::Phone>,

    /// Name of the booked event.
    event_name: booking::EventName,

    /// Size of the party.
    number_of_people: booking::People,

    /// [`booking::PaymentMethod`] the client pays with.
    payment_method: booking::PaymentMethod,

    /// Per-person price of the event.
    price: Money,

    /// Flat discount granted to the client.
    discount: Money,

    /// Flat tax applied on top of the total.
    tax: Money,

    /// Amount the client paid upfront.
    deposit: Money,

    /// Explicit [`booking::Status`] to transition into, if any.
    status: Option<booking::Status>,
}

impl TryFrom<RecordRequest> for Record {
    type Error = Error;

    fn try_from(req: RecordRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            client_name: booking::ClientName::new(req.client_name)
                .ok_or_else(|| {
                    Error::invalid_input(
                        "INVALID_CLIENT_NAME",
                        &"`client_name` must be a non-empty trimmed string \
                          up to 512 characters",
                    )
                })?,
            client_email: booking::Email::new(req.client_email).ok_or_else(
                || {
                    Error::invalid_input(
                        "INVALID_CLIENT_EMAIL",
                        &"`client_email` is not a valid email address",
                    )
                },
            )?,
            client_phone: req
                .client_phone
                .map(|p| {
                    booking::Phone::new(p).ok_or_else(|| {
                        Error::invalid_input(
                            "INVALID_CLIENT_PHONE",
                            &"`client_phone` is not a valid phone number",
                        )
                    })
                })
                .transpose()?,
            event_name: booking::EventName::new(req.event_name).ok_or_else(
                || {
                    Error::invalid_input(
                        "INVALID_EVENT_NAME",
                        &"`event_name` must be a non-empty trimmed string \
                          up to 512 characters",
                    )
                },
            )?,
            number_of_people: booking::People::new(req.number_of_people)
                .ok_or_else(|| {
                    Error::invalid_input(
                        "INVALID_NUMBER_OF_PEOPLE",
                        &"`number_of_people` must be positive",
                    )
                })?,
            payment_method: req
                .payment_method
                .trim()
                .to_uppercase()
                .parse()
                .map_err(|_| {
                    Error::invalid_input(
                        "INVALID_PAYMENT_METHOD",
                        &"`payment_method` must be one of `CASH`, `CARD`, \
                          `POS` or `TRANSFER`",
                    )
                })?,
            price: req.price,
            discount: req.discount,
            tax: req.tax,
            deposit: req.deposit,
            status: req
                .status
                .map(|s| {
                    booking::Status::normalize(&s).ok_or_else(|| {
                        Error::invalid_input(
                            "INVALID_STATUS",
                            &"`status` is not a recognized `Booking` status",
                        )
                    })
                })
                .transpose()?,
        })
    }
}

/// Parameters of the [`list`] endpoint.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Number of [`Booking`]s to return from the start.
    ///
    /// [`Booking`]: domain::Booking
    pub first: Option<i32>,

    /// Cursor to return [`Booking`]s after.
    ///
    /// [`Booking`]: domain::Booking
    pub after: Option<Uuid>,

    /// Number of [`Booking`]s to return from the end.
    ///
    /// [`Booking`]: domain::Booking
    pub last: Option<i32>,

    /// Cursor to return [`Booking`]s before.
    ///
    /// [`Booking`]: domain::Booking
    pub before: Option<Uuid>,

    /// Status to filter by, synonyms included.
    pub status: Option<String>,

    /// Client name (or its part) to fuzzy search for.
    pub client_name: Option<String>,
}

/// Page of [`Booking`]s returned by the [`list`] endpoint.
///
/// [`Booking`]: domain::Booking
#[derive(Debug, Serialize)]
pub struct Page {
    /// [`Booking`]s on this [`Page`].
    pub nodes: Vec<Booking>,

    /// Information about this [`Page`].
    pub page_info: PageInfo,

    /// Total count of [`Booking`]s in the system.
    ///
    /// [`Booking`]: domain::Booking
    pub total_count: i32,
}

/// Information about a [`Page`].
#[derive(Clone, Copy, Debug, Serialize)]
pub struct PageInfo {
    /// Last cursor on the [`Page`].
    pub end_cursor: Option<Uuid>,

    /// Indicator whether a next [`Page`] exists.
    pub has_next_page: bool,

    /// Indicator whether a previous [`Page`] exists.
    pub has_previous_page: bool,
}

/// `GET /bookings` endpoint returning a [`Page`] of [`Booking`]s.
///
/// [`Booking`]: domain::Booking
///
/// # Errors
///
/// - If the pagination arguments are ambiguous, or a filter is invalid.
/// - If the authentication fails.
pub async fn list(
    Extension(service): Extension<Service>,
    _: Auth,
    Query(params): Query<ListParams>,
) -> Result<Json<Page>, Error> {
    let ListParams {
        first,
        after,
        last,
        before,
        status,
        client_name,
    } = params;

    let arguments = Arguments::new(
        first,
        after.map(booking::Id::from),
        last,
        before.map(booking::Id::from),
        DEFAULT_PAGE_SIZE,
    )
    .ok_or(PaginationError::Ambiguous)?;
    let filter = read::booking::list::Filter {
        status: status
            .map(|s| {
                booking::Status::normalize(&s).ok_or_else(|| {
                    Error::invalid_input(
                        "INVALID_STATUS",
                        &"`status` is not a recognized `Booking` status",
                    )
                })
            })
            .transpose()?,
        client_name: client_name.and_then(booking::ClientName::new),
    };

    let page = service
        .execute(query::bookings::List::by(
            read::booking::list::Selector { arguments, filter },
        ))
        .await
        .map_err(AsError::into_error)?;
    let info = page.page_info();

    let ids = page.edges.iter().map(|e| e.node).collect::<Vec<_>>();
    let mut bookings = service
        .execute(query::bookings::ByIds::by(ids.clone()))
        .await
        .map_err(AsError::into_error)?;

    let total_count = service
        .execute(query::bookings::TotalCount::by(()))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Page {
        nodes: ids
            .into_iter()
            .filter_map(|id| bookings.remove(&id))
            .map(Booking::from)
            .collect(),
        page_info: PageInfo {
            end_cursor: info.end_cursor.map(Into::into),
            has_next_page: info.has_next_page,
            has_previous_page: info.has_previous_page,
        },
        total_count: total_count.into(),
    }))
}

/// `POST /bookings` endpoint creating a new [`Booking`].
///
/// [`Booking`]: domain::Booking
///
/// # Errors
///
/// - If the provided record is invalid.
/// - If the authentication fails.
pub async fn create(
    Extension(service): Extension<Service>,
    Auth(principal): Auth,
    Json(req): Json<RecordRequest>,
) -> Result<(http::StatusCode, Json<Booking>), Error> {
    let record = Record::try_from(req)?;

    service
        .execute(command::CreateBooking {
            client_name: record.client_name,
            client_email: record.client_email,
            client_phone: record.client_phone,
            event_name: record.event_name,
            number_of_people: record.number_of_people,
            payment_method: record.payment_method,
            price: record.price,
            discount: record.discount,
            tax: record.tax,
            deposit: record.deposit,
            created_by: principal.worker_id,
        })
        .await
        .map(|b| (http::StatusCode::CREATED, Json(Booking::from(b))))
        .map_err(AsError::into_error)
}

/// `GET /bookings/{id}` endpoint returning a single [`Booking`].
///
/// [`Booking`]: domain::Booking
///
/// # Errors
///
/// - If no [`Booking`] with the provided ID exists.
/// - If the authentication fails.
///
/// [`Booking`]: domain::Booking
pub async fn find(
    Extension(service): Extension<Service>,
    _: Auth,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, Error> {
    service
        .execute(query::booking::ById::by(id.into()))
        .await
        .map_err(AsError::into_error)?
        .map(|b| Json(Booking::from(b)))
        .ok_or_else(|| BookingError::NotExists.into())
}

/// `PUT /bookings/{id}` endpoint replacing the editable record of a
/// [`Booking`].
///
/// [`Booking`]: domain::Booking
///
/// # Errors
///
/// - If the provided record is invalid.
/// - If the record names a different status and the authenticated
///   [`Worker`] is not a super admin.
/// - If no [`Booking`] with the provided ID exists.
/// - If the [`Booking`] keeps being modified concurrently.
/// - If the authentication fails.
///
/// [`Booking`]: domain::Booking
/// [`Worker`]: domain::Worker
pub async fn update(
    Extension(service): Extension<Service>,
    Auth(principal): Auth,
    Path(id): Path<Uuid>,
    Json(req): Json<RecordRequest>,
) -> Result<Json<Booking>, Error> {
    let record = Record::try_from(req)?;

    service
        .execute(command::UpdateBooking {
            id: id.into(),
            client_name: record.client_name,
            client_email: record.client_email,
            client_phone: record.client_phone,
            event_name: record.event_name,
            number_of_people: record.number_of_people,
            payment_method: record.payment_method,
            price: record.price,
            discount: record.discount,
            tax: record.tax,
            deposit: record.deposit,
            status: record.status,
            principal,
        })
        .await
        .map(|b| Json(Booking::from(b)))
        .map_err(AsError::into_error)
}

/// Body of the [`set_status`] endpoint.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    /// New status of the [`Booking`], synonyms included.
    ///
    /// [`Booking`]: domain::Booking
    pub status: String,
}

/// `PATCH /bookings/{id}` endpoint transitioning a [`Booking`] to the
/// provided status.
///
/// The acting [`Principal`] comes from the bearer token.
///
/// [`Booking`]: domain::Booking
/// [`Principal`]: domain::worker::Principal
///
/// # Errors
///
/// - If the provided status is not recognized.
/// - If the authenticated [`Worker`] is not a super admin.
/// - If no [`Booking`] with the provided ID exists.
/// - If the [`Booking`] keeps being modified concurrently.
/// - If the authentication fails.
///
/// [`Booking`]: domain::Booking
/// [`Worker`]: domain::Worker
pub async fn set_status(
    Extension(service): Extension<Service>,
    Auth(principal): Auth,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<Booking>, Error> {
    let status = booking::Status::normalize(&req.status).ok_or_else(|| {
        Error::invalid_input(
            "INVALID_STATUS",
            &"`status` is not a recognized `Booking` status",
        )
    })?;

    service
        .execute(command::SetBookingStatus {
            id: id.into(),
            status,
            principal,
        })
        .await
        .map(|b| Json(Booking::from(b)))
        .map_err(AsError::into_error)
}

/// `DELETE /bookings/{id}` endpoint removing a [`Booking`].
///
/// [`Booking`]: domain::Booking
///
/// # Errors
///
/// - If the authenticated [`Worker`] is not a super admin.
/// - If no [`Booking`] with the provided ID exists.
/// - If the authentication fails.
///
/// [`Booking`]: domain::Booking
/// [`Worker`]: domain::Worker
pub async fn delete(
    Extension(service): Extension<Service>,
    Auth(principal): Auth,
    Path(id): Path<Uuid>,
) -> Result<http::StatusCode, Error> {
    service
        .execute(command::DeleteBooking {
            id: id.into(),
            principal,
        })
        .await
        .map(|()| http::StatusCode::NO_CONTENT)
        .map_err(AsError::into_error)
}

impl AsError for command::create_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::update_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::BookingNotExists(_) => Some(BookingError::NotExists.into()),
            Self::NotSuperAdmin(_) => Some(PrivilegeError::SuperAdmin.into()),
            Self::ConcurrentModification(_) => {
                Some(BookingError::ConcurrentModification.into())
            }
        }
    }
}

impl AsError for command::set_booking_status::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::BookingNotExists(_) => Some(BookingError::NotExists.into()),
            Self::NotSuperAdmin(_) => Some(PrivilegeError::SuperAdmin.into()),
            Self::ConcurrentModification(_) => {
                Some(BookingError::ConcurrentModification.into())
            }
        }
    }
}

impl AsError for command::delete_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::BookingNotExists(_) => Some(BookingError::NotExists.into()),
            Self::NotSuperAdmin(_) => Some(PrivilegeError::SuperAdmin.into()),
        }
    }
}

define_error! {
    enum BookingError {
        #[code = "BOOKING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Booking` with the provided ID does not exist"]
        NotExists,

        #[code = "CONCURRENT_MODIFICATION"]
        #[status = CONFLICT]
        #[message = "`Booking` is being modified concurrently, retry later"]
        ConcurrentModification,
    }
}
