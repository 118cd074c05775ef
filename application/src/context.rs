//! Request authentication definitions.

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use service::{
    command::{self, Command as _},
    domain::worker::{principal, Principal},
};

use crate::{define_error, AsError, Error, Service};

/// [`Principal`] verified from the `Authorization: Bearer` header of the
/// request.
///
/// The role is always read from the [`Worker`]'s current record, never from
/// anything the client supplies.
///
/// [`Worker`]: service::domain::Worker
#[derive(Clone, Copy, Debug)]
pub struct Auth(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Service` extension"))?;

        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|e| {
                if e.is_missing() {
                    AuthError::AuthorizationRequired.into()
                } else {
                    e.into_error()
                }
            })?;

        #[expect(unsafe_code, reason = "specified in correct header")]
        let token = unsafe {
            principal::Token::new_unchecked(bearer.token().to_owned())
        };
        service
            .execute(command::AuthorizePrincipal { token })
            .await
            .map(Self)
            .map_err(AsError::into_error)
    }
}

impl AsError for command::authorize_principal::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WORKER_INACTIVE"]
                #[status = FORBIDDEN]
                #[message = "`Worker` the token was issued to is deactivated"]
                WorkerInactive,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenDecodeError(_) | Self::WorkerNotExists(_) => {
                Some(AuthError::AuthorizationRequired.into())
            }
            Self::WorkerInactive(_) => Some(Error::WorkerInactive.into()),
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,
    }
}
