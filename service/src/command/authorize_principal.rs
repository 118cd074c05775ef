//! [`Command`] for authorizing a [`Principal`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::{
        worker::{self, principal, Principal},
        Worker,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`Principal`].
///
/// Verifies the bearer token and resolves the acting [`Worker`]'s role
/// from storage. Client-supplied role claims are never trusted.
#[derive(Clone, Debug, From)]
pub struct AuthorizePrincipal {
    /// Access token to authorize.
    pub token: principal::Token,
}

impl<Db> Command<AuthorizePrincipal> for Service<Db>
where
    Db: Database<
        Select<By<Option<Worker>, worker::Id>>,
        Ok = Option<Worker>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Principal;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizePrincipal,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizePrincipal { token } = cmd;

        let claims = jsonwebtoken::decode::<principal::Claims>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        let worker = self
            .database()
            .execute(Select(By::new(claims.worker_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::WorkerNotExists(claims.worker_id))
            .map_err(tracerr::wrap!())?;
        if !worker.is_active {
            return Err(tracerr::new!(E::WorkerInactive(worker.id)));
        }

        Ok(Principal {
            worker_id: worker.id,
            role: worker.role,
        })
    }
}

/// Error of [`AuthorizePrincipal`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// [`Worker`] the token was issued to does not exist.
    #[display("`Worker(id: {_0})` does not exist")]
    #[from(ignore)]
    WorkerNotExists(#[error(not(source))] worker::Id),

    /// [`Worker`] the token was issued to is no longer active.
    #[display("`Worker(id: {_0})` is not active")]
    #[from(ignore)]
    WorkerInactive(#[error(not(source))] worker::Id),
}
