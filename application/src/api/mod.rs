//! REST API definitions.

pub mod booking;
pub mod housing;
pub mod wallet;

use axum::{
    routing::{get, post},
    Router,
};

use crate::define_error;

/// Default number of nodes returned by a list endpoint.
const DEFAULT_PAGE_SIZE: i32 = 20;

/// Builds the [`Router`] serving the REST API.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/bookings", get(booking::list).post(booking::create))
        .route(
            "/bookings/:id",
            get(booking::find)
                .put(booking::update)
                .patch(booking::set_status)
                .delete(booking::delete),
        )
        .route("/wallet", get(wallet::view))
        .route("/housing/assign-rent", post(housing::assign_rent))
        .route("/housing/generate-rent", post(housing::generate_rent))
}

define_error! {
    enum PaginationError {
        #[code = "AMBIGUOUS_PAGINATION_ARGUMENTS"]
        #[status = BAD_REQUEST]
        #[message = "Ambiguous pagination arguments"]
        Ambiguous,
    }
}

define_error! {
    enum PrivilegeError {
        #[code = "NOT_SUPER_ADMIN"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `Worker` must be a super admin"]
        SuperAdmin,
    }
}
