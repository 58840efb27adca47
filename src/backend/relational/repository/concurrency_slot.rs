use crate::backend::relational::session::{begin_bypass, begin_scoped, rollback_or_commit};
use crate::backend::relational::store::TypedStore;
use crate::entity::ConcurrencySlot;
use crate::error::{RepositoryError, RepositoryResult};
use crate::identity::{require_user_from_context, Context};
use crate::repository::ConcurrencySlotRepository;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct RelationalConcurrencySlotRepository {
    pool: PgPool,
}

impl RelationalConcurrencySlotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConcurrencySlotRepository for RelationalConcurrencySlotRepository {
    async fn acquire_slot(
        &self,
        ctx: &Context,
        job_kind: &str,
        max_slots: u32,
        ttl: Duration,
    ) -> RepositoryResult<ConcurrencySlot> {
        let user = require_user_from_context(ctx)?;
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = async {
            // SELECT ... FOR UPDATE on the user's own rows serializes
            // concurrent acquisition attempts from the same user without
            // needing an advisory lock namespace.
            let (active,): (i64,) = sqlx::query_as(
                "SELECT count(*) FROM concurrency_slots \
                 WHERE user_id = $1 AND expires_at > now() FOR UPDATE",
            )
            .bind(user.user_id)
            .fetch_one(&mut *tx)
            .await?;
            if active as u32 >= max_slots {
                return Err(RepositoryError::ResourceLimitExceeded(format!(
                    "user already holds {active} of {max_slots} concurrency slots"
                )));
            }
            let now = Utc::now();
            let expires_at = now + ttl;
            let slot = sqlx::query_as::<_, ConcurrencySlot>(
                "INSERT INTO concurrency_slots \
                 (id, tenant_id, user_id, job_kind, acquired_at, expires_at, created_at, updated_at)\
                 VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, now(), now()) RETURNING *",
            )
            .bind(user.tenant_id)
            .bind(user.user_id)
            .bind(job_kind)
            .bind(now)
            .bind(expires_at)
            .fetch_one(&mut *tx)
            .await?;
            Ok(slot)
        }
        .await;
        rollback_or_commit(tx, result).await
    }

    async fn release_slot(&self, ctx: &Context, id: Uuid) -> RepositoryResult<()> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = async {
            let rows = sqlx::query("DELETE FROM concurrency_slots WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            if rows == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        }
        .await;
        rollback_or_commit(tx, result).await
    }

    async fn count_active(&self, ctx: &Context) -> RepositoryResult<u32> {
        let user = require_user_from_context(ctx)?;
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result: RepositoryResult<(i64,)> = sqlx::query_as(
            "SELECT count(*) FROM concurrency_slots WHERE user_id = $1 AND expires_at > now()",
        )
        .bind(user.user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(Into::into);
        let result = result.map(|(count,)| count as u32);
        rollback_or_commit(tx, result).await
    }

    async fn count(&self, ctx: &Context) -> RepositoryResult<u64> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = TypedStore::new(&mut tx, "concurrency_slots").count_all().await;
        rollback_or_commit(tx, result).await
    }

    async fn cleanup_expired_slots(&self) -> RepositoryResult<u64> {
        let mut tx = begin_bypass(&self.pool).await?;
        let result = sqlx::query("DELETE FROM concurrency_slots WHERE expires_at <= now()")
            .execute(&mut *tx)
            .await
            .map(|r| r.rows_affected())
            .map_err(Into::into);
        rollback_or_commit(tx, result).await
    }
}
