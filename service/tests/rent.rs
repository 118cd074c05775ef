//! Rent batch tests.

mod common;

use ::common::Money;
use service::{
    command::{generate_rent, GenerateRent},
    domain::{property, transaction, worker, Worker},
    Command as _,
};

use self::common::{money, service, worker, State};

fn tenant(name: &str, rent: &str, balance: &str) -> Worker {
    Worker {
        wallet_balance: money(balance),
        rent_amount: Some(money(rent)),
        rent_type: Some(worker::RentType::Weekly),
        property_id: Some(property::Id::new()),
        ..worker(name, worker::Role::Promoter)
    }
}

fn batch(period: &str, created_by: worker::Id) -> GenerateRent {
    GenerateRent {
        period: generate_rent::Period::new(period).unwrap(),
        created_by,
    }
}

#[tokio::test]
async fn charges_every_tenant_independently() {
    let admin = worker("Admin", worker::Role::SuperAdmin);
    let a = tenant("Anna", "100", "500");
    let b = tenant("Bruno", "150", "0");
    let c = tenant("Carla", "200", "-50");
    let (svc, db) = service(State {
        workers: [
            (admin.id, admin.clone()),
            (a.id, a.clone()),
            (b.id, b.clone()),
            (c.id, c.clone()),
        ]
        .into(),
        ..State::default()
    });

    let out = svc.execute(batch("Week 1", admin.id)).await.unwrap();

    assert_eq!(out.posted.len(), 3);
    assert!(out.skipped.is_empty());
    assert!(out.failed.is_empty());

    db.with_state(|s| {
        assert_eq!(s.workers[&a.id].wallet_balance, money("400"));
        assert_eq!(s.workers[&b.id].wallet_balance, money("-150"));
        assert_eq!(s.workers[&c.id].wallet_balance, money("-250"));

        for t in &s.transactions {
            assert_eq!(t.category, transaction::Category::Rent);
            assert_eq!(t.kind, transaction::Kind::Expense);
            assert_eq!(
                t.balance_after,
                s.workers[&t.worker_id].wallet_balance,
            );
            assert_eq!(
                t.reference.clone().map(String::from).as_deref(),
                Some("RENT-week-1"),
            );
        }
    });
}

#[tokio::test]
async fn rerun_skips_already_charged_tenants() {
    let admin = worker("Admin", worker::Role::SuperAdmin);
    let a = tenant("Anna", "100", "500");
    let (svc, db) = service(State {
        workers: [(admin.id, admin.clone()), (a.id, a.clone())].into(),
        ..State::default()
    });

    let first = svc.execute(batch("Week 1", admin.id)).await.unwrap();
    assert_eq!(first.posted.len(), 1);

    let second = svc.execute(batch("Week 1", admin.id)).await.unwrap();
    assert!(second.posted.is_empty());
    assert_eq!(second.skipped, vec![a.id]);

    // Not charged twice.
    db.with_state(|s| {
        assert_eq!(s.transactions.len(), 1);
        assert_eq!(s.workers[&a.id].wallet_balance, money("400"));
    });
}

#[tokio::test]
async fn distinct_periods_charge_again() {
    let admin = worker("Admin", worker::Role::SuperAdmin);
    let a = tenant("Anna", "100", "500");
    let (svc, db) = service(State {
        workers: [(admin.id, admin.clone()), (a.id, a.clone())].into(),
        ..State::default()
    });

    _ = svc.execute(batch("Week 1", admin.id)).await.unwrap();
    let out = svc.execute(batch("Week 2", admin.id)).await.unwrap();

    assert_eq!(out.posted.len(), 1);
    assert_eq!(
        db.with_state(|s| s.workers[&a.id].wallet_balance),
        money("300"),
    );
}

#[tokio::test]
async fn skips_workers_without_rent_terms() {
    let admin = worker("Admin", worker::Role::SuperAdmin);
    let mut unhoused = worker("Dario", worker::Role::Promoter);
    unhoused.wallet_balance = money("100");
    let mut inactive = tenant("Elena", "100", "0");
    inactive.is_active = false;
    let (svc, db) = service(State {
        workers: [
            (admin.id, admin.clone()),
            (unhoused.id, unhoused.clone()),
            (inactive.id, inactive.clone()),
        ]
        .into(),
        ..State::default()
    });

    let out = svc.execute(batch("Week 1", admin.id)).await.unwrap();

    assert!(out.posted.is_empty());
    db.with_state(|s| {
        assert!(s.transactions.is_empty());
        assert_eq!(s.workers[&unhoused.id].wallet_balance, money("100"));
    });
}

#[tokio::test]
async fn one_failing_tenant_does_not_fail_the_batch() {
    let admin = worker("Admin", worker::Role::SuperAdmin);
    let a = tenant("Anna", "100", "500");
    let b = tenant("Bruno", "150", "0");
    let (svc, db) = service(State {
        workers: [
            (admin.id, admin.clone()),
            (a.id, a.clone()),
            (b.id, b.clone()),
        ]
        .into(),
        failing_worker: Some(b.id),
        ..State::default()
    });

    let out = svc.execute(batch("Week 1", admin.id)).await.unwrap();

    assert_eq!(out.posted.len(), 1);
    assert_eq!(out.failed, vec![b.id]);
    db.with_state(|s| {
        assert_eq!(s.workers[&a.id].wallet_balance, money("400"));
        assert_eq!(s.workers[&b.id].wallet_balance, Money::ZERO);
    });
}
