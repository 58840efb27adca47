//! The generic typed store (§4.4.4): common scan/count/delete shapes shared
//! by every entity-specific relational repository, so each repository only
//! writes the SQL that is actually specific to it (joins, aggregates,
//! multi-column inserts) instead of re-deriving single-predicate CRUD.

use crate::error::RepositoryResult;
use sqlx::postgres::Postgres;
use sqlx::{Encode, FromRow, Postgres as Pg, Transaction, Type};
use uuid::Uuid;

/// A thin handle bound to one table, operating inside an already-scoped
/// transaction (the caller has already run `begin_scoped`/`begin_bypass`).
pub struct TypedStore<'t, 'c> {
    tx: &'t mut Transaction<'c, Postgres>,
    table: &'static str,
}

impl<'t, 'c> TypedStore<'t, 'c> {
    pub fn new(tx: &'t mut Transaction<'c, Postgres>, table: &'static str) -> Self {
        Self { tx, table }
    }

    pub async fn scan_one_by_field<T>(&mut self, field: &str, value: Uuid) -> RepositoryResult<T>
    where
        T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let sql = format!("SELECT * FROM {} WHERE {field} = $1", self.table);
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(value)
            .fetch_one(&mut *self.tx)
            .await?)
    }

    pub async fn scan_many_by_field<T>(&mut self, field: &str, value: Uuid) -> RepositoryResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let sql = format!("SELECT * FROM {} WHERE {field} = $1", self.table);
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(value)
            .fetch_all(&mut *self.tx)
            .await?)
    }

    pub async fn scan_all<T>(&mut self) -> RepositoryResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let sql = format!("SELECT * FROM {}", self.table);
        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(&mut *self.tx).await?)
    }

    pub async fn count_by_field(&mut self, field: &str, value: Uuid) -> RepositoryResult<i64> {
        let sql = format!("SELECT count(*) FROM {} WHERE {field} = $1", self.table);
        let (count,): (i64,) = sqlx::query_as(&sql).bind(value).fetch_one(&mut *self.tx).await?;
        Ok(count)
    }

    /// Visible-row count for the table, scoped by whatever RLS policy is
    /// active on the transaction's session (§4.3).
    pub async fn count_all(&mut self) -> RepositoryResult<u64> {
        let sql = format!("SELECT count(*) FROM {}", self.table);
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(&mut *self.tx).await?;
        Ok(count as u64)
    }

    pub async fn delete_by_field(&mut self, field: &str, value: Uuid) -> RepositoryResult<u64> {
        let sql = format!("DELETE FROM {} WHERE {field} = $1", self.table);
        let result = sqlx::query(&sql).bind(value).execute(&mut *self.tx).await?;
        Ok(result.rows_affected())
    }

    /// Updates a single column, identified by `id`, returning the updated
    /// row. The common shape behind the job state-machine transitions
    /// (Export, ImportRestore) and the `updated_at` touch every mutator
    /// needs.
    pub async fn update_field_by_id<T, V>(
        &mut self,
        field: &str,
        id: Uuid,
        value: V,
    ) -> RepositoryResult<T>
    where
        T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
        V: for<'q> Encode<'q, Pg> + Type<Pg> + Send,
    {
        let sql = format!(
            "UPDATE {} SET {field} = $1, updated_at = now() WHERE id = $2 RETURNING *",
            self.table
        );
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(value)
            .bind(id)
            .fetch_one(&mut *self.tx)
            .await?)
    }
}
