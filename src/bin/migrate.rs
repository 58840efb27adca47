//! Migration runner CLI (§6.7). Argument parsing is deliberately minimal —
//! CLI command surface is an out-of-scope external collaborator
//! (SPEC_FULL.md §D); this binary is a thin shim handing argv off to the
//! library functions that actually do the work (`schema::migrator`).
//!
//! Commands:
//!   bootstrap apply              privileged first-run setup
//!   migrate up                   apply pending migrations
//!   migrate down <version>       roll back to <version>
//!   migrate generate             diff + write migration files
//!   migrate generate --preview   print SQL without writing
//!   migrate generate --check     exit non-zero if the diff is non-empty

use anyhow::{bail, Context as _};
use palisade_core::app::config::AppConfig;
use palisade_core::app::init::init_subscriber;
use palisade_core::backend::relational::{
    ConnectionTester, PgConnectionTester, PgPoolManager, PgPoolManagerTrait,
};
use palisade_core::schema::migrator::{migrate_up, pending_diff, pending_plan, PgDatabaseMigrator};
use palisade_core::schema::renderer::renderer_for;
use palisade_core::schema::{live_reader::PgLiveSchemaReader, Dialect};
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();
    let args: Vec<String> = env::args().skip(1).collect();
    let config = AppConfig::from_env()?;
    let database = config.database();
    let pool_manager = PgPoolManager::connect(
        database.url(),
        database.max_pool_size(),
        database.acquire_timeout(),
        database.pg_ssl_mode()?,
    )
    .await?;
    let pool = pool_manager.get_pool();

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["bootstrap", "apply"] => {
            let tester = PgConnectionTester;
            tester.is_empty_database(&pool).await?;
            info!("database is empty, ready for first migration");
        }
        ["migrate", "up"] => {
            let reader = PgLiveSchemaReader::new(pool.clone());
            let migrator = PgDatabaseMigrator::new(pool);
            let plan = migrate_up(&reader, &migrator, Dialect::Postgres).await?;
            println!("applied {} migration step(s)", plan.nodes.len());
        }
        ["migrate", "down", _version] => {
            bail!("rollback requires a recorded migration history, which this core does not persist on its own; decision and rationale recorded in DESIGN.md's Open Questions (SPEC_FULL.md §C)");
        }
        ["migrate", "generate"] => {
            let reader = PgLiveSchemaReader::new(pool);
            let plan = pending_plan(&reader, Dialect::Postgres).await?;
            let sql = renderer_for(Dialect::Postgres).render_plan(&plan);
            let path = format!("migrations/{}.sql", chrono_stamp());
            std::fs::write(&path, sql).with_context(|| format!("writing {path}"))?;
            println!("wrote {path}");
        }
        ["migrate", "generate", "--preview"] => {
            let reader = PgLiveSchemaReader::new(pool);
            let plan = pending_plan(&reader, Dialect::Postgres).await?;
            println!("{}", renderer_for(Dialect::Postgres).render_plan(&plan));
        }
        ["migrate", "generate", "--check"] => {
            let reader = PgLiveSchemaReader::new(pool);
            let diff = pending_diff(&reader, Dialect::Postgres).await?;
            if diff.is_empty() {
                println!("schema is up to date");
            } else {
                println!("pending schema changes detected");
                std::process::exit(1);
            }
        }
        other => {
            bail!("unrecognised command: {:?}\nsee the module doc comment for usage", other);
        }
    }
    Ok(())
}

fn chrono_stamp() -> String {
    chrono::Utc::now().format("%Y%m%d%H%M%S").to_string()
}
