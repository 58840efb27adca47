//! Orchestrates the migration pipeline: parse the registered entities (C7),
//! read the live database (C8's input), diff the two (C8), plan ordered DDL
//! (C9), and render it for execution (C10). This is the component the
//! `palisade-migrate` binary drives (§6.7).

use crate::error::SchemaResult;
use crate::schema::dialect::Dialect;
use crate::schema::differ::{diff, SchemaDiff};
use crate::schema::live_reader::LiveSchemaReader;
use crate::schema::model::Schema;
use crate::schema::planner::{plan_with_schema, MigrationPlan};
use crate::schema::registry::{all_functions, all_table_annotations};
use crate::schema::renderer::renderer_for;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use sqlx::PgPool;
use tracing::{info, warn};

/// Builds the desired schema from the fixed entity registry, for `dialect`.
pub fn desired_schema(dialect: Dialect) -> Schema {
    crate::schema::parser::parse_schema(&all_table_annotations(), &[], &all_functions(), dialect)
}

/// Executes a rendered DDL statement sequence against a live database.
/// Mockable so the CLI's `--check`/`--preview` paths can be tested without a
/// database.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DatabaseMigrator: Send + Sync {
    async fn apply(&self, plan: &MigrationPlan) -> SchemaResult<()>;
}

pub struct PgDatabaseMigrator {
    pool: PgPool,
}

impl PgDatabaseMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatabaseMigrator for PgDatabaseMigrator {
    async fn apply(&self, plan: &MigrationPlan) -> SchemaResult<()> {
        let renderer = renderer_for(Dialect::Postgres);
        let mut tx = self.pool.begin().await?;
        for node in &plan.nodes {
            let sql = renderer.render_node(node);
            if sql.trim_start().starts_with("--") {
                warn!(statement = %sql, "skipping unsupported or informational migration step");
                continue;
            }
            sqlx::raw_sql(&sql).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

/// Computes the pending diff between the desired schema and whatever
/// `reader` reports as live, without applying anything (`migrate generate
/// --check`, §6.7).
pub async fn pending_diff(
    reader: &dyn LiveSchemaReader,
    dialect: Dialect,
) -> SchemaResult<SchemaDiff> {
    let live = reader.read_schema().await?;
    let desired = desired_schema(dialect);
    Ok(diff(&desired, &live))
}

/// Produces the ordered, renderable plan for the pending diff without
/// applying it (`migrate generate --preview`, §6.7).
pub async fn pending_plan(
    reader: &dyn LiveSchemaReader,
    dialect: Dialect,
) -> SchemaResult<MigrationPlan> {
    let live = reader.read_schema().await?;
    let desired = desired_schema(dialect);
    let schema_diff = diff(&desired, &live);
    plan_with_schema(&schema_diff, &desired)
}

/// Reads the live schema, plans the diff, and applies it through `migrator`.
/// Returns the plan that was applied so the caller can log or display it.
pub async fn migrate_up(
    reader: &dyn LiveSchemaReader,
    migrator: &dyn DatabaseMigrator,
    dialect: Dialect,
) -> SchemaResult<MigrationPlan> {
    let plan = pending_plan(reader, dialect).await?;
    if plan.is_empty() {
        info!("schema already up to date, nothing to apply");
        return Ok(plan);
    }
    migrator.apply(&plan).await?;
    info!(steps = plan.nodes.len(), "migration applied");
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::live_reader::MockLiveSchemaReader;

    #[tokio::test]
    async fn empty_live_schema_plans_every_table() {
        let mut reader = MockLiveSchemaReader::new();
        reader
            .expect_read_schema()
            .returning(|| Box::pin(async { Ok(Schema::new()) }));
        let plan = pending_plan(&reader, Dialect::Postgres).await.unwrap();
        assert!(!plan.is_empty());
    }

    #[tokio::test]
    async fn up_to_date_schema_applies_nothing() {
        let mut reader = MockLiveSchemaReader::new();
        reader
            .expect_read_schema()
            .returning(|| Box::pin(async { Ok(desired_schema(Dialect::Postgres)) }));
        let mut migrator = MockDatabaseMigrator::new();
        migrator.expect_apply().times(0);
        let plan = migrate_up(&reader, &migrator, Dialect::Postgres).await.unwrap();
        assert!(plan.is_empty());
    }
}
