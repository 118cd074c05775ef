//! [`Booking`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{booking, Booking},
    infra::{
        database::{
            self,
            postgres::{Connection, FuzzPattern},
            Postgres,
        },
        Database,
    },
    read,
};

/// Columns of the `bookings` table, in row-mapping order.
const COLUMNS: &str = "\
    id, booking_id, \
    client_name, client_email, client_phone, \
    event_name, number_of_people, payment_method, \
    price, discount, tax, total, deposit, to_pay, \
    status, revision, \
    created_by, created_at, updated_at, confirmed_at, cancelled_at";

/// Maps a `bookings` table [`Row`] into a [`Booking`].
fn from_row(row: &Row) -> Booking {
    Booking {
        id: row.get("id"),
        booking_id: row.get("booking_id"),
        client_name: row.get("client_name"),
        client_email: row.get("client_email"),
        client_phone: row.get("client_phone"),
        event_name: row.get("event_name"),
        number_of_people: row.get("number_of_people"),
        payment_method: row.get("payment_method"),
        price: row.get("price"),
        discount: row.get("discount"),
        tax: row.get("tax"),
        total: row.get("total"),
        deposit: row.get("deposit"),
        to_pay: row.get("to_pay"),
        status: row.get("status"),
        revision: row.get("revision"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        confirmed_at: row.get("confirmed_at"),
        cancelled_at: row.get("cancelled_at"),
    }
}

impl<C, IDs> Database<Select<By<HashMap<booking::Id, Booking>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[booking::Id]>,
{
    type Ok = HashMap<booking::Id, Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<booking::Id, Booking>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[booking::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings \
             WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
             LIMIT $2::INT4",
        );
        Ok(self
            .query(&sql, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let booking = from_row(&row);
                (booking.id, booking)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Booking>, booking::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<booking::Id, Booking>, [booking::Id; 1]>>,
        Ok = HashMap<booking::Id, Booking>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Insert<Booking>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            INSERT INTO bookings (\
                id, booking_id, \
                client_name, client_email, client_phone, \
                event_name, number_of_people, payment_method, \
                price, discount, tax, total, deposit, to_pay, \
                status, revision, \
                created_by, created_at, updated_at, \
                confirmed_at, cancelled_at\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, \
                $3::VARCHAR, $4::VARCHAR, $5::VARCHAR, \
                $6::VARCHAR, $7::INT4, $8::INT2, \
                $9::NUMERIC, $10::NUMERIC, $11::NUMERIC, \
                $12::NUMERIC, $13::NUMERIC, $14::NUMERIC, \
                $15::INT2, $16::INT4, \
                $17::UUID, $18::TIMESTAMPTZ, $19::TIMESTAMPTZ, \
                $20::TIMESTAMPTZ, $21::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &booking.id,
                &booking.booking_id,
                &booking.client_name,
                &booking.client_email,
                &booking.client_phone,
                &booking.event_name,
                &booking.number_of_people,
                &booking.payment_method,
                &booking.price,
                &booking.discount,
                &booking.tax,
                &booking.total,
                &booking.deposit,
                &booking.to_pay,
                &booking.status,
                &booking.revision,
                &booking.created_by,
                &booking.created_at,
                &booking.updated_at,
                &booking.confirmed_at,
                &booking.cancelled_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<Booking>> for Postgres<C>
where
    C: Connection,
{
    /// Indicator whether the [`Booking`] row was updated.
    ///
    /// `false` means the stored revision has moved on since the [`Booking`]
    /// was read.
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            UPDATE bookings \
            SET client_name = $2::VARCHAR, \
                client_email = $3::VARCHAR, \
                client_phone = $4::VARCHAR, \
                event_name = $5::VARCHAR, \
                number_of_people = $6::INT4, \
                payment_method = $7::INT2, \
                price = $8::NUMERIC, \
                discount = $9::NUMERIC, \
                tax = $10::NUMERIC, \
                total = $11::NUMERIC, \
                deposit = $12::NUMERIC, \
                to_pay = $13::NUMERIC, \
                status = $14::INT2, \
                updated_at = $15::TIMESTAMPTZ, \
                confirmed_at = $16::TIMESTAMPTZ, \
                cancelled_at = $17::TIMESTAMPTZ, \
                revision = revision + 1 \
            WHERE id = $1::UUID \
              AND revision = $18::INT4";
        let affected = self
            .exec(
                SQL,
                &[
                    &booking.id,
                    &booking.client_name,
                    &booking.client_email,
                    &booking.client_phone,
                    &booking.event_name,
                    &booking.number_of_people,
                    &booking.payment_method,
                    &booking.price,
                    &booking.discount,
                    &booking.tax,
                    &booking.total,
                    &booking.deposit,
                    &booking.to_pay,
                    &booking.status,
                    &booking.updated_at,
                    &booking.confirmed_at,
                    &booking.cancelled_at,
                    &booking.revision,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?;

        Ok(affected > 0)
    }
}

impl<C> Database<Delete<By<Booking, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    /// Indicator whether the [`Booking`] row existed.
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM bookings \
            WHERE id = $1::UUID";
        let affected = self
            .exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?;

        Ok(affected > 0)
    }
}

impl<C>
    Database<Select<By<read::booking::list::Page, read::booking::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::booking::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::booking::list::Page, read::booking::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::list::Selector {
            arguments,
            filter:
                read::booking::list::Filter {
                    status,
                    client_name,
                },
        } = by.into_inner();

        let limit = i32::try_from(arguments.limit()).unwrap() + 1;

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit];

        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });
        let status_idx = status.as_ref().map(|s| {
            ps.push(s);
            ps.len()
        });

        let name_pattern =
            client_name.as_ref().map(|n| FuzzPattern::new(n.as_ref()));
        let name_pattern_idx = name_pattern.as_ref().map(|n| {
            ps.push(n);
            ps.len()
        });

        let sql = format!(
            "SELECT id \
             FROM bookings \
             WHERE TRUE \
                   {cursor} \
                   {status_filtering} \
                   {name_filtering} \
             ORDER BY id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = arguments.kind().operator();
                f(&format_args!("AND id {op} ${idx}::UUID"))
            }),
            order = arguments.kind().order().sql(),
            status_filtering =
                status_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND status = ${idx}::INT2"))
                }),
            name_filtering =
                name_pattern_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!(
                        "AND LOWER(client_name) SIMILAR TO \
                         LOWER(${idx}::VARCHAR)"
                    ))
                }),
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
                let id = row.get("id");
                (id, id)
            })
            .collect::<Vec<_>>();

        Ok(read::booking::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C> Database<Select<By<read::booking::list::TotalCount, ()>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::booking::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<read::booking::list::TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM bookings";
        self.query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, i32>(0).into())
    }
}
