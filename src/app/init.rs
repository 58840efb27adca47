//! Process startup (§A.1, §A.3), grounded in the teacher's
//! `manager::app::init::{init_subscriber, init_default_app}`. HTTP routing
//! is out of scope here (§1 Non-goals) so `init_default_app` stops at
//! handing back a ready `DefaultAppState` plus the schema migration it ran
//! against the relational backend, rather than an `axum::Router`.

use crate::app::config::BackendKind;
use crate::app::{ConfigProvider, DefaultAppState};
use crate::backend::relational::PgPoolManagerTrait;
use crate::schema::dialect::Dialect;
use crate::schema::live_reader::PgLiveSchemaReader;
use crate::schema::migrator::{migrate_up, PgDatabaseMigrator};
use crate::schema::MigrationPlan;
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

pub fn init_subscriber() {
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(Level::INFO) // TODO: make configurable via AppConfig
            .finish(),
    )
    .expect("setting default subscriber failed");
}

/// Builds the default application state and, for the relational backend
/// only, brings the live schema up to date before returning. The embedded
/// and in-memory backends have no separate schema to migrate — their tables
/// exist the moment a tree/map is first written.
pub async fn init_default_app() -> Result<Arc<DefaultAppState>> {
    let app_state = Arc::new(DefaultAppState::new().await?);
    if app_state.config().backend() == BackendKind::Relational {
        migrate_relational(&app_state).await?;
    }
    Ok(app_state)
}

async fn migrate_relational(app_state: &DefaultAppState) -> Result<MigrationPlan> {
    let database = app_state.config().database();
    let pool_manager = crate::backend::relational::PgPoolManager::connect(
        database.url(),
        database.max_pool_size(),
        database.acquire_timeout(),
        database.pg_ssl_mode()?,
    )
    .await?;
    let pool = pool_manager.get_pool();
    let reader = PgLiveSchemaReader::new(pool.clone());
    let migrator = PgDatabaseMigrator::new(pool);
    let plan = migrate_up(&reader, &migrator, Dialect::Postgres).await?;
    info!(steps = plan.nodes.len(), "startup migration check complete");
    Ok(plan)
}
