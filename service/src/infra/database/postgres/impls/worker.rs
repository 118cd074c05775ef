//! [`Worker`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{worker, Worker},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `workers` table, in row-mapping order.
const COLUMNS: &str = "\
    id, name, role, \
    wallet_balance, \
    rent_amount, rent_type, property_id, \
    is_active, created_at";

/// Maps a `workers` table [`Row`] into a [`Worker`].
fn from_row(row: &Row) -> Worker {
    Worker {
        id: row.get("id"),
        name: row.get("name"),
        role: row.get("role"),
        wallet_balance: row.get("wallet_balance"),
        rent_amount: row.get("rent_amount"),
        rent_type: row.get("rent_type"),
        property_id: row.get("property_id"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Worker>, worker::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Worker>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Worker>, worker::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM workers \
             WHERE id = $1::UUID \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| from_row(&row)))
    }
}

impl<C> Database<Lock<By<Worker, worker::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Worker>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Worker, worker::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: worker::Id = by.into_inner();

        // Serializes concurrent postings to the same wallet until the
        // surrounding transaction ends.
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM workers \
             WHERE id = $1::UUID \
             LIMIT 1 \
             FOR UPDATE",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| from_row(&row)))
    }
}

impl<C> Database<Insert<Worker>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Worker>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(worker): Insert<Worker>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(worker)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Worker>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(worker): Update<Worker>,
    ) -> Result<Self::Ok, Self::Err> {
        let Worker {
            id,
            name,
            role,
            wallet_balance,
            rent_amount,
            rent_type,
            property_id,
            is_active,
            created_at,
        } = worker;

        const SQL: &str = "\
            INSERT INTO workers (\
                id, name, role, \
                wallet_balance, \
                rent_amount, rent_type, property_id, \
                is_active, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, $3::INT2, \
                $4::NUMERIC, \
                $5::NUMERIC, $6::INT2, $7::UUID, \
                $8::BOOLEAN, $9::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                role = EXCLUDED.role, \
                wallet_balance = EXCLUDED.wallet_balance, \
                rent_amount = EXCLUDED.rent_amount, \
                rent_type = EXCLUDED.rent_type, \
                property_id = EXCLUDED.property_id, \
                is_active = EXCLUDED.is_active, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[
                &id,
                &name,
                &role,
                &wallet_balance,
                &rent_amount,
                &rent_type,
                &property_id,
                &is_active,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Select<By<Vec<Worker>, read::worker::RentRoster>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Worker>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<Worker>, read::worker::RentRoster>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM workers \
             WHERE is_active \
               AND rent_amount IS NOT NULL \
               AND rent_type IS NOT NULL \
               AND property_id IS NOT NULL \
             ORDER BY id ASC",
        );
        Ok(self
            .query(&sql, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}
