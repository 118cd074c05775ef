//! [`Principal`] authorization tests.
//!
//! [`Principal`]: service::domain::worker::Principal

mod common;

use std::time::Duration;

use ::common::DateTime;
use jsonwebtoken::{EncodingKey, Header};
use service::{
    command::{authorize_principal, AuthorizePrincipal},
    domain::worker::{self, principal},
    Command as _,
};

use self::common::{service, worker, State, JWT_SECRET};

/// Mints a token for the provided [`Worker`], the way the identity service
/// does.
///
/// [`Worker`]: service::domain::Worker
fn token(worker_id: worker::Id, secret: &[u8]) -> principal::Token {
    let claims = principal::Claims {
        worker_id,
        expires_at: (DateTime::now() + Duration::from_secs(3600)).coerce(),
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .unwrap()
    .parse()
    .unwrap()
}

#[tokio::test]
async fn resolves_role_from_storage() {
    let promoter = worker("Promoter", worker::Role::Promoter);
    let (svc, _) = service(State {
        workers: [(promoter.id, promoter.clone())].into(),
        ..State::default()
    });

    let principal = svc
        .execute(AuthorizePrincipal {
            token: token(promoter.id, JWT_SECRET),
        })
        .await
        .unwrap();

    assert_eq!(principal.worker_id, promoter.id);
    assert_eq!(principal.role, worker::Role::Promoter);
    assert!(!principal.is_super_admin());
}

#[tokio::test]
async fn rejects_token_signed_with_wrong_secret() {
    let promoter = worker("Promoter", worker::Role::Promoter);
    let (svc, _) = service(State {
        workers: [(promoter.id, promoter.clone())].into(),
        ..State::default()
    });

    let err = svc
        .execute(AuthorizePrincipal {
            token: token(promoter.id, b"other-secret"),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err.as_ref(),
        authorize_principal::ExecutionError::JsonWebTokenDecodeError(_),
    ));
}

#[tokio::test]
async fn rejects_garbage_token() {
    let (svc, _) = service(State::default());

    let err = svc
        .execute(AuthorizePrincipal {
            token: "not-a-jwt".parse().unwrap(),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err.as_ref(),
        authorize_principal::ExecutionError::JsonWebTokenDecodeError(_),
    ));
}

#[tokio::test]
async fn rejects_token_of_unknown_worker() {
    let (svc, _) = service(State::default());

    let err = svc
        .execute(AuthorizePrincipal {
            token: token(worker::Id::new(), JWT_SECRET),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err.as_ref(),
        authorize_principal::ExecutionError::WorkerNotExists(_),
    ));
}

#[tokio::test]
async fn rejects_deactivated_worker() {
    let mut promoter = worker("Promoter", worker::Role::Promoter);
    promoter.is_active = false;
    let (svc, _) = service(State {
        workers: [(promoter.id, promoter.clone())].into(),
        ..State::default()
    });

    let err = svc
        .execute(AuthorizePrincipal {
            token: token(promoter.id, JWT_SECRET),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err.as_ref(),
        authorize_principal::ExecutionError::WorkerInactive(_),
    ));
}
