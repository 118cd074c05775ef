//! In-memory [`Database`] driving the commands in tests.
//!
//! [`Database`]: service::infra::Database

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use ::common::{
    operations::{By, Commit, Delete, Insert, Lock, Select, Transact, Update},
    Handler, Money,
};
use service::{
    domain::{booking, transaction, worker, Booking, Transaction, Worker},
    infra::database,
    read, Service,
};
use tracerr::Traced;

/// State shared by every handle of an [`InMemory`] database.
#[derive(Debug, Default)]
pub struct State {
    /// Stored [`Booking`]s.
    pub bookings: HashMap<booking::Id, Booking>,

    /// Stored [`Worker`]s.
    pub workers: HashMap<worker::Id, Worker>,

    /// Stored [`Transaction`]s, in posting order.
    pub transactions: Vec<Transaction>,

    /// When set, every [`Booking`] update reports a revision conflict.
    pub conflicting_updates: bool,

    /// [`Worker`] whose row lock fails, for failure-isolation tests.
    pub failing_worker: Option<worker::Id>,
}

/// In-memory [`Database`] for driving commands without Postgres.
///
/// Transactions are a no-op: [`Transact`] hands out another handle to the
/// same state and [`Commit`] does nothing.
///
/// [`Database`]: service::infra::Database
#[derive(Clone, Debug, Default)]
pub struct InMemory(pub Arc<Mutex<State>>);

impl InMemory {
    /// Creates a new [`InMemory`] database from the provided [`State`].
    pub fn new(state: State) -> Self {
        Self(Arc::new(Mutex::new(state)))
    }

    /// Runs the provided function over the shared [`State`].
    pub fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.0.lock().unwrap())
    }
}

/// Builds a [`Service`] over the provided [`State`].
pub fn service(state: State) -> (Service<InMemory>, InMemory) {
    let db = InMemory::new(state);
    (Service::new(config(), db.clone()), db)
}

/// Secret the test tokens are signed with.
pub const JWT_SECRET: &[u8] = b"test-secret";

/// Parses a [`Money`] amount out of a literal.
pub fn money(s: &str) -> Money {
    s.parse().unwrap()
}

/// Builds an active [`Worker`] with the provided name and role.
pub fn worker(name: &str, role: worker::Role) -> Worker {
    Worker {
        id: worker::Id::new(),
        name: worker::Name::new(name).unwrap(),
        role,
        wallet_balance: Money::ZERO,
        rent_amount: None,
        rent_type: None,
        property_id: None,
        is_active: true,
        created_at: ::common::DateTime::now().coerce(),
    }
}

/// Builds a [`service::Config`] with test defaults.
pub fn config() -> service::Config {
    service::Config {
        jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(JWT_SECRET),
        pricing: booking::pricing::Config::default(),
    }
}

impl Handler<Transact> for InMemory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Handler<Commit> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Handler<Insert<Booking>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with_state(|s| {
            _ = s.bookings.insert(booking.id, booking);
        });
        Ok(())
    }
}

impl Handler<Select<By<Option<Booking>, booking::Id>>> for InMemory {
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.with_state(|s| s.bookings.get(&by.into_inner()).cloned()))
    }
}

impl Handler<Update<Booking>> for InMemory {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(mut booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.with_state(|s| {
            if s.conflicting_updates {
                return false;
            }
            match s.bookings.get(&booking.id) {
                Some(stored) if stored.revision == booking.revision => {
                    booking.revision = booking.revision.next();
                    _ = s.bookings.insert(booking.id, booking);
                    true
                }
                Some(_) | None => false,
            }
        }))
    }
}

impl Handler<Delete<By<Booking, booking::Id>>> for InMemory {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.with_state(|s| s.bookings.remove(&by.into_inner()).is_some()))
    }
}

impl Handler<Select<By<Option<Worker>, worker::Id>>> for InMemory {
    type Ok = Option<Worker>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Worker>, worker::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.with_state(|s| s.workers.get(&by.into_inner()).cloned()))
    }
}

impl Handler<Lock<By<Worker, worker::Id>>> for InMemory {
    type Ok = Option<Worker>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Worker, worker::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with_state(|s| {
            if s.failing_worker == Some(id) {
                return Err(tracerr::new!(database::Error::Unavailable(
                    "injected lock failure",
                )));
            }
            Ok(s.workers.get(&id).cloned())
        })
    }
}

impl Handler<Update<Worker>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(worker): Update<Worker>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with_state(|s| {
            _ = s.workers.insert(worker.id, worker);
        });
        Ok(())
    }
}

impl Handler<Insert<Transaction>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(transaction): Insert<Transaction>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with_state(|s| s.transactions.push(transaction));
        Ok(())
    }
}

impl
    Handler<
        Select<By<Option<transaction::Id>, (worker::Id, transaction::Reference)>>,
    > for InMemory
{
    type Ok = Option<transaction::Id>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<transaction::Id>, (worker::Id, transaction::Reference)>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let (worker_id, reference) = by.into_inner();
        Ok(self.with_state(|s| {
            s.transactions
                .iter()
                .find(|t| {
                    t.worker_id == worker_id
                        && t.reference.as_ref() == Some(&reference)
                })
                .map(|t| t.id)
        }))
    }
}

impl Handler<Select<By<Vec<Worker>, read::worker::RentRoster>>> for InMemory {
    type Ok = Vec<Worker>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Worker>, read::worker::RentRoster>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.with_state(|s| {
            let mut roster = s
                .workers
                .values()
                .filter(|w| w.is_rent_chargeable())
                .cloned()
                .collect::<Vec<_>>();
            roster.sort_by_key(|w| w.name.to_string());
            roster
        }))
    }
}

impl
    Handler<
        Select<
            By<
                read::transaction::statement::Page,
                read::transaction::statement::Selector,
            >,
        >,
    > for InMemory
{
    type Ok = read::transaction::statement::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<
                read::transaction::statement::Page,
                read::transaction::statement::Selector,
            >,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::transaction::statement::Selector { arguments, filter } =
            by.into_inner();
        let limit = arguments.limit();

        Ok(self.with_state(|s| {
            let mut matching = s
                .transactions
                .iter()
                .filter(|t| {
                    t.worker_id == filter.worker_id
                        && filter.since.is_none_or(|since| t.created_at >= since)
                })
                .cloned()
                .collect::<Vec<_>>();
            // Newest first, as backward pagination reads the ledger.
            matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

            let has_more = matching.len() > limit;
            matching.truncate(limit);

            read::transaction::statement::Page::new(
                &arguments,
                matching.into_iter().map(|t| (t.id, t)),
                has_more,
            )
        }))
    }
}

impl
    Handler<
        Select<By<read::wallet::Stats, read::transaction::statement::Filter>>,
    > for InMemory
{
    type Ok = read::wallet::Stats;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::wallet::Stats, read::transaction::statement::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        Ok(self.with_state(|s| {
            let mut stats = read::wallet::Stats::default();
            for t in s.transactions.iter().filter(|t| {
                t.worker_id == filter.worker_id
                    && filter.since.is_none_or(|since| t.created_at >= since)
            }) {
                if t.status == transaction::Status::Pending {
                    stats.pending_count += 1;
                }
                if t.status != transaction::Status::Completed {
                    continue;
                }
                if t.amount > Money::ZERO {
                    stats.total_income += t.amount;
                } else {
                    stats.total_expenses += -t.amount;
                }
            }
            stats
        }))
    }
}
