//! A single shared connection pool (§4.4): unlike a per-tenant pool layout,
//! isolation here comes entirely from the RLS session variables set at the
//! start of every transaction (§4.4.1), so one pool serves every tenant.

use crate::error::RepositoryResult;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use std::str::FromStr;
use std::time::Duration;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait PgPoolManagerTrait: Send + Sync {
    fn get_pool(&self) -> PgPool;
}

pub struct PgPoolManager {
    pool: PgPool,
}

impl PgPoolManager {
    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
        ssl_mode: PgSslMode,
    ) -> RepositoryResult<Self> {
        let options = PgConnectOptions::from_str(url)
            .map_err(sqlx::Error::from)?
            .ssl_mode(ssl_mode);
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }
}

impl PgPoolManagerTrait for PgPoolManager {
    fn get_pool(&self) -> PgPool {
        self.pool.clone()
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConnectionTester: Send + Sync {
    async fn test_connect(&self, url: &str, ssl_mode: PgSslMode) -> RepositoryResult<PgPool>;
    async fn is_empty_database(&self, pool: &PgPool) -> RepositoryResult<()>;
}

pub struct PgConnectionTester;

#[async_trait]
impl ConnectionTester for PgConnectionTester {
    async fn test_connect(&self, url: &str, ssl_mode: PgSslMode) -> RepositoryResult<PgPool> {
        let options = PgConnectOptions::from_str(url)
            .map_err(sqlx::Error::from)?
            .ssl_mode(ssl_mode);
        Ok(PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await?)
    }

    async fn is_empty_database(&self, pool: &PgPool) -> RepositoryResult<()> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT count(*) FROM information_schema.tables WHERE table_schema = 'public'",
        )
        .fetch_one(pool)
        .await?;
        if count == 0 {
            Ok(())
        } else {
            Err(crate::error::RepositoryError::Conflict(
                "database is not empty".to_string(),
            ))
        }
    }
}
