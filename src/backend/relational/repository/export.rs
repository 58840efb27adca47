use crate::backend::relational::session::{begin_scoped, rollback_or_commit};
use crate::backend::relational::store::TypedStore;
use crate::entity::{Export, ExportStatus};
use crate::error::RepositoryResult;
use crate::identity::{require_user_from_context, Context};
use crate::repository::ExportRepository;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

pub struct RelationalExportRepository {
    pool: PgPool,
}

impl RelationalExportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExportRepository for RelationalExportRepository {
    async fn create(&self, ctx: &Context, export: Export) -> RepositoryResult<Export> {
        let user = require_user_from_context(ctx)?;
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = sqlx::query_as::<_, Export>(
            "INSERT INTO exports (id, tenant_id, user_id, requested_by, status, bucket_key, error_message, created_at, updated_at)\
             VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, $6, now(), now()) RETURNING *",
        )
        .bind(user.tenant_id)
        .bind(user.user_id)
        .bind(export.requested_by)
        .bind(export.status)
        .bind(&export.bucket_key)
        .bind(&export.error_message)
        .fetch_one(&mut *tx)
        .await
        .map_err(Into::into);
        rollback_or_commit(tx, result).await
    }

    async fn get(&self, ctx: &Context, id: Uuid) -> RepositoryResult<Export> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = TypedStore::new(&mut tx, "exports").scan_one_by_field("id", id).await;
        rollback_or_commit(tx, result).await
    }

    async fn list(&self, ctx: &Context) -> RepositoryResult<Vec<Export>> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = TypedStore::new(&mut tx, "exports").scan_all().await;
        rollback_or_commit(tx, result).await
    }

    async fn transition(
        &self,
        ctx: &Context,
        id: Uuid,
        next: ExportStatus,
        bucket_key: Option<String>,
        error_message: Option<String>,
    ) -> RepositoryResult<Export> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = async {
            let mut export: Export = TypedStore::new(&mut tx, "exports")
                .scan_one_by_field("id", id)
                .await?;
            export.transition(next)?;
            match next {
                ExportStatus::Completed => {
                    export.bucket_key = bucket_key;
                    export.error_message = None;
                    export.completed_date = Some(Utc::now());
                }
                ExportStatus::Failed => export.error_message = error_message,
                _ => {}
            }
            export.validate(ctx)?;
            sqlx::query_as::<_, Export>(
                "UPDATE exports SET status = $1, bucket_key = $2, error_message = $3, \
                 completed_date = $4, updated_at = now() WHERE id = $5 RETURNING *",
            )
            .bind(export.status)
            .bind(&export.bucket_key)
            .bind(&export.error_message)
            .bind(export.completed_date)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(Into::into)
        }
        .await;
        rollback_or_commit(tx, result).await
    }

    async fn count(&self, ctx: &Context) -> RepositoryResult<u64> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = TypedStore::new(&mut tx, "exports").count_all().await;
        rollback_or_commit(tx, result).await
    }
}
