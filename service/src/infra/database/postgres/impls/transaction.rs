//! [`Transaction`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{transaction, worker, Transaction},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `transactions` table, in row-mapping order.
const COLUMNS: &str = "\
    id, worker_id, kind, category, \
    amount, balance_after, \
    description, reference, status, \
    created_by, created_at";

/// Maps a `transactions` table [`Row`] into a [`Transaction`].
fn from_row(row: &Row) -> Transaction {
    Transaction {
        id: row.get("id"),
        worker_id: row.get("worker_id"),
        kind: row.get("kind"),
        category: row.get("category"),
        amount: row.get("amount"),
        balance_after: row.get("balance_after"),
        description: row.get("description"),
        reference: row.get("reference"),
        status: row.get("status"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Insert<Transaction>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(tx): Insert<Transaction>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            INSERT INTO transactions (\
                id, worker_id, kind, category, \
                amount, balance_after, \
                description, reference, status, \
                created_by, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::INT2, $4::INT2, \
                $5::NUMERIC, $6::NUMERIC, \
                $7::VARCHAR, $8::VARCHAR, $9::INT2, \
                $10::UUID, $11::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &tx.id,
                &tx.worker_id,
                &tx.kind,
                &tx.category,
                &tx.amount,
                &tx.balance_after,
                &tx.description,
                &tx.reference,
                &tx.status,
                &tx.created_by,
                &tx.created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C>
    Database<
        Select<
            By<Option<transaction::Id>, (worker::Id, transaction::Reference)>,
        >,
    > for Postgres<C>
where
    C: Connection,
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

        const SQL: &str = "\
            SELECT id \
            FROM transactions \
            WHERE worker_id = $1::UUID \
              AND reference = $2::VARCHAR \
            LIMIT 1";
        self.query_opt(SQL, &[&worker_id, &reference])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.map(|r| r.get("id")))
    }
}

impl<C>
    Database<
        Select<
            By<
                read::transaction::statement::Page,
                read::transaction::statement::Selector,
            >,
        >,
    > for Postgres<C>
where
    C: Connection,
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
        let read::transaction::statement::Selector {
            arguments,
            filter:
                read::transaction::statement::Filter { worker_id, since },
        } = by.into_inner();

        let limit = i32::try_from(arguments.limit()).unwrap() + 1;

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit, &worker_id];

        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });
        let since_idx = since.as_ref().map(|s| {
            ps.push(s);
            ps.len()
        });

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM transactions \
             WHERE worker_id = $2::UUID \
                   {cursor} \
                   {since_filtering} \
             ORDER BY created_at {order}, id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = arguments.kind().operator();
                f(&format_args!(
                    "AND (created_at, id) {op} \
                     (SELECT created_at, id \
                      FROM transactions \
                      WHERE id = ${idx}::UUID)"
                ))
            }),
            since_filtering =
                since_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND created_at >= ${idx}::TIMESTAMPTZ"))
                }),
            order = arguments.kind().order().sql(),
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let has_more = rows.len() > arguments.limit();
        let edges = rows
            .into_iter()
            .take(arguments.limit())
            .map(|row| {
                let tx = from_row(&row);
                (tx.id, tx)
            })
            .collect::<Vec<_>>();

        Ok(read::transaction::statement::Page::new(
            &arguments, edges, has_more,
        ))
    }
}

impl<C>
    Database<
        Select<By<read::wallet::Stats, read::transaction::statement::Filter>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::wallet::Stats;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::wallet::Stats, read::transaction::statement::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::transaction::statement::Filter { worker_id, since } =
            by.into_inner();

        let completed = transaction::Status::Completed;
        let pending = transaction::Status::Pending;

        let mut ps: Vec<&(dyn ToSql + Sync)> =
            vec![&worker_id, &completed, &pending];

        let since_idx = since.as_ref().map(|s| {
            ps.push(s);
            ps.len()
        });

        let sql = format!(
            "SELECT COALESCE(SUM(amount) FILTER (WHERE amount > 0 \
                                                  AND status = $2::INT2), 0) \
                        AS total_income, \
                    COALESCE(-SUM(amount) FILTER (WHERE amount < 0 \
                                                  AND status = $2::INT2), 0) \
                        AS total_expenses, \
                    COUNT(*) FILTER (WHERE status = $3::INT2) \
                        AS pending_count \
             FROM transactions \
             WHERE worker_id = $1::UUID \
                   {since_filtering}",
            since_filtering =
                since_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND created_at >= ${idx}::TIMESTAMPTZ"))
                }),
        );
        self.query_opt(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())
            .map(|row| {
                let row = row.expect("always exists");
                read::wallet::Stats {
                    total_income: row.get("total_income"),
                    total_expenses: row.get("total_expenses"),
                    pending_count: row.get("pending_count"),
                }
            })
    }
}
