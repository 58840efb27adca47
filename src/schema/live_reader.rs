//! Reads the live database schema back into the abstract `Schema` model so
//! the differ (C8) can compare it against the parsed one. Dialect-specific:
//! the reference implementation here targets PostgreSQL's
//! `information_schema`/`pg_catalog`.

use crate::error::SchemaResult;
use crate::schema::model::{Column, ColumnType, EnumType, Index, IndexKind, Schema, Table};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use sqlx::PgPool;
use sqlx::Row;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait LiveSchemaReader: Send + Sync {
    async fn read_schema(&self) -> SchemaResult<Schema>;
}

pub struct PgLiveSchemaReader {
    pool: PgPool,
}

impl PgLiveSchemaReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_pg_type(udt_name: &str) -> ColumnType {
        match udt_name {
            "uuid" => ColumnType::Uuid,
            "text" | "varchar" | "bpchar" => ColumnType::Text,
            "bool" => ColumnType::Boolean,
            "int4" => ColumnType::Integer,
            "int8" => ColumnType::BigInt,
            "timestamptz" => ColumnType::TimestampTz,
            "jsonb" | "json" => ColumnType::Json,
            "numeric" => ColumnType::Numeric {
                precision: 18,
                scale: 4,
            },
            other => ColumnType::Enum(other.to_string()),
        }
    }
}

#[async_trait]
impl LiveSchemaReader for PgLiveSchemaReader {
    async fn read_schema(&self) -> SchemaResult<Schema> {
        let mut schema = Schema::new();

        let enum_rows = sqlx::query(
            r#"
            SELECT t.typname AS enum_name, e.enumlabel AS value
            FROM pg_type t
            JOIN pg_enum e ON t.oid = e.enumtypid
            JOIN pg_catalog.pg_namespace n ON n.oid = t.typnamespace
            WHERE n.nspname = 'public'
            ORDER BY t.typname, e.enumsortorder
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        for row in enum_rows {
            let name: String = row.try_get("enum_name")?;
            let value: String = row.try_get("value")?;
            schema
                .enums
                .entry(name.clone())
                .or_insert_with(|| EnumType {
                    name,
                    values: Vec::new(),
                })
                .values
                .push(value);
        }

        let table_rows = sqlx::query(
            r#"
            SELECT table_name FROM information_schema.tables
            WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        for row in table_rows {
            let table_name: String = row.try_get("table_name")?;
            let mut table = Table::new(table_name.clone());

            let column_rows = sqlx::query(
                r#"
                SELECT column_name, udt_name, is_nullable, column_default
                FROM information_schema.columns
                WHERE table_schema = 'public' AND table_name = $1
                ORDER BY ordinal_position
                "#,
            )
            .bind(&table_name)
            .fetch_all(&self.pool)
            .await?;

            for col_row in column_rows {
                let name: String = col_row.try_get("column_name")?;
                let udt_name: String = col_row.try_get("udt_name")?;
                let is_nullable: String = col_row.try_get("is_nullable")?;
                let default: Option<String> = col_row.try_get("column_default")?;
                let mut column = Column::new(name, Self::map_pg_type(&udt_name));
                column.nullable = is_nullable == "YES";
                column.default = default;
                table.columns.push(column);
            }

            let index_rows = sqlx::query(
                r#"
                SELECT indexname, indexdef FROM pg_indexes
                WHERE schemaname = 'public' AND tablename = $1
                "#,
            )
            .bind(&table_name)
            .fetch_all(&self.pool)
            .await?;
            for idx_row in index_rows {
                let name: String = idx_row.try_get("indexname")?;
                let def: String = idx_row.try_get("indexdef")?;
                table.indexes.push(Index {
                    name,
                    table: table_name.clone(),
                    columns: Vec::new(),
                    unique: def.contains("UNIQUE"),
                    kind: if def.contains("USING gin") {
                        IndexKind::Gin
                    } else {
                        IndexKind::BTree
                    },
                    partial_predicate: None,
                    operator_class: None,
                });
            }

            let rls_row = sqlx::query(
                r#"
                SELECT relrowsecurity FROM pg_class
                WHERE relname = $1 AND relnamespace = 'public'::regnamespace
                "#,
            )
            .bind(&table_name)
            .fetch_optional(&self.pool)
            .await?;
            table.rls_enabled = rls_row
                .map(|r| r.try_get::<bool, _>("relrowsecurity").unwrap_or(false))
                .unwrap_or(false);

            schema.add_table(table);
        }

        Ok(schema)
    }
}
