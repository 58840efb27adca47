//! Schema migration pipeline against an empty database (§8.2 scenario 5),
//! exercised end to end through the public `schema` module: parse the fixed
//! entity registry, diff it against an empty live schema, plan ordered DDL,
//! render it, and confirm a second pass against the already-migrated schema
//! is a no-op.
//!
//! Uses hand-written fakes rather than the crate's `mockall` mocks: those
//! are generated only under `#[cfg(test)]` inside the library's own build,
//! which an external integration test does not share.

use async_trait::async_trait;
use palisade_core::error::SchemaResult;
use palisade_core::schema::dialect::Dialect;
use palisade_core::schema::migrator::{desired_schema, migrate_up, DatabaseMigrator};
use palisade_core::schema::live_reader::LiveSchemaReader;
use palisade_core::schema::model::Schema;
use palisade_core::schema::renderer::renderer_for;
use palisade_core::schema::MigrationPlan;
use std::sync::atomic::{AtomicUsize, Ordering};

struct FixedSchemaReader(Schema);

#[async_trait]
impl LiveSchemaReader for FixedSchemaReader {
    async fn read_schema(&self) -> SchemaResult<Schema> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
struct CountingMigrator {
    applied: AtomicUsize,
}

#[async_trait]
impl DatabaseMigrator for CountingMigrator {
    async fn apply(&self, _plan: &MigrationPlan) -> SchemaResult<()> {
        self.applied.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn empty_database_migrates_in_dependency_order_and_is_idempotent() {
    let reader = FixedSchemaReader(Schema::new());
    let migrator = CountingMigrator::default();

    let plan = migrate_up(&reader, &migrator, Dialect::Postgres).await.unwrap();
    assert!(!plan.is_empty());
    assert_eq!(migrator.applied.load(Ordering::SeqCst), 1);

    let rendered = renderer_for(Dialect::Postgres).render_plan(&plan);

    // tenants has no tenant_id column and must precede users, which every
    // other table's annotation references transitively.
    let tenants_pos = rendered.find("CREATE TABLE tenants").expect("tenants table rendered");
    let users_pos = rendered.find("CREATE TABLE users").expect("users table rendered");
    let locations_pos = rendered
        .find("CREATE TABLE locations")
        .expect("locations table rendered");
    let areas_pos = rendered.find("CREATE TABLE areas").expect("areas table rendered");
    assert!(tenants_pos < users_pos);
    assert!(users_pos < locations_pos);
    assert!(locations_pos < areas_pos);

    // a second pass against the now-desired schema has nothing left to do.
    let settled_reader = FixedSchemaReader(desired_schema(Dialect::Postgres));
    let untouched_migrator = CountingMigrator::default();
    let settled_plan = migrate_up(&settled_reader, &untouched_migrator, Dialect::Postgres)
        .await
        .unwrap();
    assert!(settled_plan.is_empty());
    assert_eq!(untouched_migrator.applied.load(Ordering::SeqCst), 0);
}
