//! Wallet view tests.

mod common;

use std::time::Duration;

use ::common::{DateTime, Money};
use service::{
    command::PostTransaction,
    domain::{transaction, worker, Transaction},
    query::{wallet, GetWalletView},
    Command as _,
};

use self::common::{money, service, worker, State};

fn posting(
    worker_id: worker::Id,
    amount: Money,
    status: transaction::Status,
    created_by: worker::Id,
) -> PostTransaction {
    PostTransaction {
        worker_id,
        amount,
        category: transaction::Category::Adjustment,
        description: transaction::Description::new("Entry").unwrap(),
        reference: None,
        status,
        created_by,
        unique_reference: false,
    }
}

/// An entry posted `days` back, bypassing the commands.
fn aged_entry(
    worker_id: worker::Id,
    amount: Money,
    days: u64,
    created_by: worker::Id,
) -> Transaction {
    Transaction {
        id: transaction::Id::new(),
        worker_id,
        kind: transaction::Kind::of(amount),
        category: transaction::Category::Adjustment,
        amount,
        balance_after: amount,
        description: transaction::Description::new("Aged entry").unwrap(),
        reference: None,
        status: transaction::Status::Completed,
        created_by,
        created_at: (DateTime::now() - Duration::from_secs(days * 24 * 3600))
            .coerce(),
    }
}

#[tokio::test]
async fn returns_worker_statement_and_stats() {
    let admin = worker("Admin", worker::Role::SuperAdmin);
    let promoter = worker("Promoter", worker::Role::Promoter);
    let (svc, _) = service(State {
        workers: [
            (admin.id, admin.clone()),
            (promoter.id, promoter.clone()),
        ]
        .into(),
        ..State::default()
    });

    for (amount, status) in [
        ("300", transaction::Status::Completed),
        ("-120", transaction::Status::Completed),
        ("45", transaction::Status::Pending),
    ] {
        _ = svc
            .execute(posting(promoter.id, money(amount), status, admin.id))
            .await
            .unwrap();
    }

    let view = svc
        .execute(GetWalletView {
            worker_id: promoter.id,
            period: wallet::Period::All,
        })
        .await
        .unwrap();

    assert_eq!(view.worker.id, promoter.id);
    assert_eq!(view.transactions.len(), 3);
    assert_eq!(view.stats.total_income, money("300"));
    assert_eq!(view.stats.total_expenses, money("120"));
    assert_eq!(view.stats.pending_count, 1);
}

#[tokio::test]
async fn statement_ignores_other_workers() {
    let admin = worker("Admin", worker::Role::SuperAdmin);
    let promoter = worker("Promoter", worker::Role::Promoter);
    let (svc, _) = service(State {
        workers: [
            (admin.id, admin.clone()),
            (promoter.id, promoter.clone()),
        ]
        .into(),
        ..State::default()
    });

    _ = svc
        .execute(posting(
            promoter.id,
            money("50"),
            transaction::Status::Completed,
            admin.id,
        ))
        .await
        .unwrap();
    _ = svc
        .execute(posting(
            admin.id,
            money("999"),
            transaction::Status::Completed,
            admin.id,
        ))
        .await
        .unwrap();

    let view = svc
        .execute(GetWalletView {
            worker_id: promoter.id,
            period: wallet::Period::All,
        })
        .await
        .unwrap();

    assert_eq!(view.transactions.len(), 1);
    assert_eq!(view.stats.total_income, money("50"));
}

#[tokio::test]
async fn week_period_drops_older_entries() {
    let admin = worker("Admin", worker::Role::SuperAdmin);
    let promoter = worker("Promoter", worker::Role::Promoter);
    let (svc, db) = service(State {
        workers: [
            (admin.id, admin.clone()),
            (promoter.id, promoter.clone()),
        ]
        .into(),
        ..State::default()
    });

    db.with_state(|s| {
        s.transactions
            .push(aged_entry(promoter.id, money("700"), 30, admin.id));
    });
    _ = svc
        .execute(posting(
            promoter.id,
            money("80"),
            transaction::Status::Completed,
            admin.id,
        ))
        .await
        .unwrap();

    let week = svc
        .execute(GetWalletView {
            worker_id: promoter.id,
            period: wallet::Period::Week,
        })
        .await
        .unwrap();
    assert_eq!(week.transactions.len(), 1);
    assert_eq!(week.stats.total_income, money("80"));

    let all = svc
        .execute(GetWalletView {
            worker_id: promoter.id,
            period: wallet::Period::All,
        })
        .await
        .unwrap();
    assert_eq!(all.transactions.len(), 2);
    assert_eq!(all.stats.total_income, money("780"));
}

#[tokio::test]
async fn statement_is_newest_first() {
    let admin = worker("Admin", worker::Role::SuperAdmin);
    let (svc, db) = service(State {
        workers: [(admin.id, admin.clone())].into(),
        ..State::default()
    });

    db.with_state(|s| {
        s.transactions
            .push(aged_entry(admin.id, money("1"), 3, admin.id));
        s.transactions
            .push(aged_entry(admin.id, money("2"), 1, admin.id));
        s.transactions
            .push(aged_entry(admin.id, money("3"), 2, admin.id));
    });

    let view = svc
        .execute(GetWalletView {
            worker_id: admin.id,
            period: wallet::Period::All,
        })
        .await
        .unwrap();

    let amounts = view
        .transactions
        .iter()
        .map(|t| t.amount)
        .collect::<Vec<_>>();
    assert_eq!(amounts, vec![money("2"), money("3"), money("1")]);
}

#[tokio::test]
async fn reports_unknown_worker() {
    let (svc, _) = service(State::default());

    let err = svc
        .execute(GetWalletView {
            worker_id: worker::Id::new(),
            period: wallet::Period::All,
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err.as_ref(),
        wallet::ExecutionError::WorkerNotExists(_),
    ));
}

#[test]
fn period_parses_from_query_values() {
    assert_eq!("all".parse(), Ok(wallet::Period::All));
    assert_eq!("week".parse(), Ok(wallet::Period::Week));
    assert_eq!("month".parse(), Ok(wallet::Period::Month));
    assert!("fortnight".parse::<wallet::Period>().is_err());
}
