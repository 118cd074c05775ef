//! [`Booking`] lifecycle tests.
//!
//! [`Booking`]: service::domain::Booking

mod common;

use service::{
    command::{
        self, set_booking_status, update_booking, CreateBooking,
        DeleteBooking, SetBookingStatus, UpdateBooking,
    },
    domain::{booking, worker, Booking},
    Command as _, Service,
};

use self::common::{money, service, worker, InMemory, State};

fn create_cmd(created_by: worker::Id) -> CreateBooking {
    CreateBooking {
        client_name: "Mario Rossi".parse().unwrap(),
        client_email: "mario@example.com".parse().unwrap(),
        client_phone: None,
        event_name: "Boat Party".parse().unwrap(),
        number_of_people: booking::People::new(3).unwrap(),
        payment_method: booking::PaymentMethod::Card,
        price: money("50"),
        discount: money("0"),
        tax: money("0"),
        deposit: money("0"),
        created_by,
    }
}

fn update_cmd(booking: &Booking, deposit: &str) -> UpdateBooking {
    UpdateBooking {
        id: booking.id,
        client_name: booking.client_name.clone(),
        client_email: booking.client_email.clone(),
        client_phone: booking.client_phone.clone(),
        event_name: booking.event_name.clone(),
        number_of_people: booking.number_of_people,
        payment_method: booking.payment_method,
        price: booking.price,
        discount: booking.discount,
        tax: booking.tax,
        deposit: money(deposit),
        status: None,
        principal: worker::Principal {
            worker_id: booking.created_by,
            role: worker::Role::Admin,
        },
    }
}

async fn created(
    service: &Service<InMemory>,
    created_by: worker::Id,
) -> Booking {
    service.execute(create_cmd(created_by)).await.unwrap()
}

#[tokio::test]
async fn creation_prices_and_starts_pending() {
    let staff = worker("Staff", worker::Role::Admin);
    let (svc, db) = service(State {
        workers: [(staff.id, staff.clone())].into(),
        ..State::default()
    });

    let booking = created(&svc, staff.id).await;

    // 50 * 3 surcharged by 5% for a card payment.
    assert_eq!(booking.total, money("157.50"));
    assert_eq!(booking.to_pay, money("157.50"));
    assert_eq!(booking.status, booking::Status::Pending);
    assert_eq!(booking.revision, booking::Revision::INITIAL);
    assert!(booking.confirmed_at.is_none());
    assert!(booking.booking_id.to_string().starts_with("BK-"));
    assert!(db.with_state(|s| s.bookings.contains_key(&booking.id)));
}

#[tokio::test]
async fn creation_confirms_fully_paid_upfront() {
    let staff = worker("Staff", worker::Role::Admin);
    let (svc, _) = service(State {
        workers: [(staff.id, staff.clone())].into(),
        ..State::default()
    });

    let booking = svc
        .execute(CreateBooking {
            deposit: money("157.50"),
            ..create_cmd(staff.id)
        })
        .await
        .unwrap();

    assert_eq!(booking.status, booking::Status::Confirmed);
    assert_eq!(booking.to_pay, money("0"));
    assert!(booking.confirmed_at.is_some());
}

#[tokio::test]
async fn free_booking_is_not_born_confirmed() {
    let staff = worker("Staff", worker::Role::Admin);
    let (svc, _) = service(State {
        workers: [(staff.id, staff.clone())].into(),
        ..State::default()
    });

    let booking = svc
        .execute(CreateBooking {
            price: money("0"),
            ..create_cmd(staff.id)
        })
        .await
        .unwrap();

    assert_eq!(booking.total, money("0"));
    assert_eq!(booking.status, booking::Status::Pending);
    assert!(booking.confirmed_at.is_none());
}

#[tokio::test]
async fn clearing_the_deposit_keeps_the_status() {
    let staff = worker("Staff", worker::Role::Admin);
    let (svc, _) = service(State {
        workers: [(staff.id, staff.clone())].into(),
        ..State::default()
    });
    let booking = created(&svc, staff.id).await;

    let confirmed = svc.execute(update_cmd(&booking, "200")).await.unwrap();
    assert_eq!(confirmed.status, booking::Status::Confirmed);

    let cleared = svc.execute(update_cmd(&confirmed, "0")).await.unwrap();
    assert_eq!(cleared.status, booking::Status::Confirmed);
    assert_eq!(cleared.to_pay, money("157.50"));
}

#[tokio::test]
async fn full_deposit_promotes_to_confirmed() {
    let staff = worker("Staff", worker::Role::Admin);
    let (svc, _) = service(State {
        workers: [(staff.id, staff.clone())].into(),
        ..State::default()
    });
    let booking = created(&svc, staff.id).await;

    let partial = svc.execute(update_cmd(&booking, "40")).await.unwrap();
    assert_eq!(partial.status, booking::Status::Pending);
    assert_eq!(partial.to_pay, money("117.50"));

    let paid = svc.execute(update_cmd(&partial, "157.50")).await.unwrap();
    assert_eq!(paid.status, booking::Status::Confirmed);
    assert_eq!(paid.to_pay, money("0"));
    assert!(paid.confirmed_at.is_some());
}

#[tokio::test]
async fn confirmation_timestamp_is_first_write_wins() {
    let staff = worker("Staff", worker::Role::Admin);
    let (svc, _) = service(State {
        workers: [(staff.id, staff.clone())].into(),
        ..State::default()
    });
    let booking = created(&svc, staff.id).await;

    let confirmed = svc.execute(update_cmd(&booking, "200")).await.unwrap();
    let first = confirmed.confirmed_at.unwrap();

    // Demote and promote again: the original timestamp stays.
    let demoted = svc.execute(update_cmd(&confirmed, "10")).await.unwrap();
    assert_eq!(demoted.status, booking::Status::Pending);
    let again = svc.execute(update_cmd(&demoted, "200")).await.unwrap();

    assert_eq!(again.confirmed_at.unwrap(), first);
}

#[tokio::test]
async fn cancelled_stays_cancelled_under_deposit_edits() {
    let admin = worker("Admin", worker::Role::SuperAdmin);
    let (svc, _) = service(State {
        workers: [(admin.id, admin.clone())].into(),
        ..State::default()
    });
    let booking = created(&svc, admin.id).await;

    let cancelled = svc
        .execute(SetBookingStatus {
            id: booking.id,
            status: booking::Status::Cancelled,
            principal: worker::Principal {
                worker_id: admin.id,
                role: admin.role,
            },
        })
        .await
        .unwrap();
    assert_eq!(cancelled.status, booking::Status::Cancelled);
    assert!(cancelled.cancelled_at.is_some());

    // Even a full deposit does not resurrect it.
    let edited = svc.execute(update_cmd(&cancelled, "200")).await.unwrap();
    assert_eq!(edited.status, booking::Status::Cancelled);
}

#[tokio::test]
async fn super_admin_overrides_cancellation() {
    let admin = worker("Admin", worker::Role::SuperAdmin);
    let (svc, _) = service(State {
        workers: [(admin.id, admin.clone())].into(),
        ..State::default()
    });
    let booking = created(&svc, admin.id).await;
    let principal = worker::Principal {
        worker_id: admin.id,
        role: admin.role,
    };

    let cancelled = svc
        .execute(SetBookingStatus {
            id: booking.id,
            status: booking::Status::Cancelled,
            principal,
        })
        .await
        .unwrap();

    let revived = svc
        .execute(SetBookingStatus {
            id: cancelled.id,
            status: booking::Status::Pending,
            principal,
        })
        .await
        .unwrap();

    assert_eq!(revived.status, booking::Status::Pending);
    // The first cancellation stays on record.
    assert!(revived.cancelled_at.is_some());
}

#[tokio::test]
async fn promoter_cannot_set_status() {
    let promoter = worker("Promoter", worker::Role::Promoter);
    let (svc, _) = service(State {
        workers: [(promoter.id, promoter.clone())].into(),
        ..State::default()
    });
    let booking = created(&svc, promoter.id).await;

    let err = svc
        .execute(SetBookingStatus {
            id: booking.id,
            status: booking::Status::Confirmed,
            principal: worker::Principal {
                worker_id: promoter.id,
                role: promoter.role,
            },
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err.as_ref(),
        set_booking_status::ExecutionError::NotSuperAdmin(_),
    ));
}

#[tokio::test]
async fn update_reports_unknown_booking() {
    let staff = worker("Staff", worker::Role::Admin);
    let (svc, _) = service(State {
        workers: [(staff.id, staff.clone())].into(),
        ..State::default()
    });
    let booking = created(&svc, staff.id).await;

    let mut cmd = update_cmd(&booking, "0");
    cmd.id = booking::Id::new();

    let err = svc.execute(cmd).await.unwrap_err();

    assert!(matches!(
        err.as_ref(),
        update_booking::ExecutionError::BookingNotExists(_),
    ));
}

#[tokio::test]
async fn update_surfaces_concurrent_modification_after_retries() {
    let staff = worker("Staff", worker::Role::Admin);
    let (svc, db) = service(State {
        workers: [(staff.id, staff.clone())].into(),
        ..State::default()
    });
    let booking = created(&svc, staff.id).await;

    db.with_state(|s| s.conflicting_updates = true);

    let err = svc.execute(update_cmd(&booking, "40")).await.unwrap_err();

    assert!(matches!(
        err.as_ref(),
        update_booking::ExecutionError::ConcurrentModification(_),
    ));
}

#[tokio::test]
async fn update_bumps_revision() {
    let staff = worker("Staff", worker::Role::Admin);
    let (svc, db) = service(State {
        workers: [(staff.id, staff.clone())].into(),
        ..State::default()
    });
    let booking = created(&svc, staff.id).await;

    let updated = svc.execute(update_cmd(&booking, "40")).await.unwrap();

    assert_eq!(updated.revision, booking.revision.next());
    assert_eq!(
        db.with_state(|s| s.bookings[&booking.id].revision),
        updated.revision,
    );
}

#[tokio::test]
async fn explicit_status_on_update_wins_over_derivation() {
    let admin = worker("Admin", worker::Role::SuperAdmin);
    let (svc, _) = service(State {
        workers: [(admin.id, admin.clone())].into(),
        ..State::default()
    });
    let booking = created(&svc, admin.id).await;

    // A full deposit would promote, but the named status wins.
    let updated = svc
        .execute(UpdateBooking {
            status: Some(booking::Status::Pending),
            principal: worker::Principal {
                worker_id: admin.id,
                role: admin.role,
            },
            ..update_cmd(&booking, "157.50")
        })
        .await
        .unwrap();

    assert_eq!(updated.status, booking::Status::Pending);
    assert_eq!(updated.to_pay, money("0"));
    assert!(updated.confirmed_at.is_none());
}

#[tokio::test]
async fn promoter_cannot_change_status_through_update() {
    let promoter = worker("Promoter", worker::Role::Promoter);
    let (svc, _) = service(State {
        workers: [(promoter.id, promoter.clone())].into(),
        ..State::default()
    });
    let booking = created(&svc, promoter.id).await;

    let err = svc
        .execute(UpdateBooking {
            status: Some(booking::Status::Confirmed),
            principal: worker::Principal {
                worker_id: promoter.id,
                role: promoter.role,
            },
            ..update_cmd(&booking, "0")
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err.as_ref(),
        update_booking::ExecutionError::NotSuperAdmin(_),
    ));
}

#[tokio::test]
async fn restating_the_current_status_needs_no_privilege() {
    let promoter = worker("Promoter", worker::Role::Promoter);
    let (svc, _) = service(State {
        workers: [(promoter.id, promoter.clone())].into(),
        ..State::default()
    });
    let booking = created(&svc, promoter.id).await;

    let updated = svc
        .execute(UpdateBooking {
            status: Some(booking::Status::Pending),
            principal: worker::Principal {
                worker_id: promoter.id,
                role: promoter.role,
            },
            ..update_cmd(&booking, "40")
        })
        .await
        .unwrap();

    assert_eq!(updated.status, booking::Status::Pending);
    assert_eq!(updated.to_pay, money("117.50"));
}

#[tokio::test]
async fn deletion_requires_super_admin() {
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
    let booking = created(&svc, admin.id).await;

    let err = svc
        .execute(DeleteBooking {
            id: booking.id,
            principal: worker::Principal {
                worker_id: promoter.id,
                role: promoter.role,
            },
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        command::delete_booking::ExecutionError::NotSuperAdmin(_),
    ));

    svc.execute(DeleteBooking {
        id: booking.id,
        principal: worker::Principal {
            worker_id: admin.id,
            role: admin.role,
        },
    })
    .await
    .unwrap();
    assert!(db.with_state(|s| s.bookings.is_empty()));
}

#[tokio::test]
async fn deletion_reports_unknown_booking() {
    let admin = worker("Admin", worker::Role::SuperAdmin);
    let (svc, _) = service(State {
        workers: [(admin.id, admin.clone())].into(),
        ..State::default()
    });

    let err = svc
        .execute(DeleteBooking {
            id: booking::Id::new(),
            principal: worker::Principal {
                worker_id: admin.id,
                role: admin.role,
            },
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err.as_ref(),
        command::delete_booking::ExecutionError::BookingNotExists(_),
    ));
}
