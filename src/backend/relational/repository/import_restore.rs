use crate::backend::relational::session::{begin_scoped, rollback_or_commit};
use crate::backend::relational::store::TypedStore;
use crate::entity::{ImportRestore, TransferStatus};
use crate::error::RepositoryResult;
use crate::identity::{require_user_from_context, Context};
use crate::repository::ImportRestoreRepository;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub struct RelationalImportRestoreRepository {
    pool: PgPool,
}

impl RelationalImportRestoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImportRestoreRepository for RelationalImportRestoreRepository {
    async fn create(&self, ctx: &Context, job: ImportRestore) -> RepositoryResult<ImportRestore> {
        let user = require_user_from_context(ctx)?;
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = sqlx::query_as::<_, ImportRestore>(
            "INSERT INTO import_restores \
             (id, tenant_id, user_id, requested_by, kind, status, source_bucket_key, error_message, created_at, updated_at)\
             VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7, now(), now()) RETURNING *",
        )
        .bind(user.tenant_id)
        .bind(user.user_id)
        .bind(job.requested_by)
        .bind(job.kind)
        .bind(job.status)
        .bind(&job.source_bucket_key)
        .bind(&job.error_message)
        .fetch_one(&mut *tx)
        .await
        .map_err(Into::into);
        rollback_or_commit(tx, result).await
    }

    async fn get(&self, ctx: &Context, id: Uuid) -> RepositoryResult<ImportRestore> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = TypedStore::new(&mut tx, "import_restores")
            .scan_one_by_field("id", id)
            .await;
        rollback_or_commit(tx, result).await
    }

    async fn list(&self, ctx: &Context) -> RepositoryResult<Vec<ImportRestore>> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = TypedStore::new(&mut tx, "import_restores").scan_all().await;
        rollback_or_commit(tx, result).await
    }

    async fn transition(
        &self,
        ctx: &Context,
        id: Uuid,
        next: TransferStatus,
        error_message: Option<String>,
    ) -> RepositoryResult<ImportRestore> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = async {
            let mut job: ImportRestore = TypedStore::new(&mut tx, "import_restores")
                .scan_one_by_field("id", id)
                .await?;
            job.transition(next)?;
            if next == TransferStatus::Failed {
                job.error_message = error_message;
            }
            job.validate(ctx)?;
            sqlx::query_as::<_, ImportRestore>(
                "UPDATE import_restores SET status = $1, error_message = $2, \
                 updated_at = now() WHERE id = $3 RETURNING *",
            )
            .bind(job.status)
            .bind(&job.error_message)
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
        let result = TypedStore::new(&mut tx, "import_restores").count_all().await;
        rollback_or_commit(tx, result).await
    }
}
