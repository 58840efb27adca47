use crate::backend::relational::session::{begin_scoped, rollback_or_commit};
use crate::backend::relational::store::TypedStore;
use crate::entity::File;
use crate::error::{RepositoryError, RepositoryResult};
use crate::identity::{require_user_from_context, Context};
use crate::repository::FileRepository;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub struct RelationalFileRepository {
    pool: PgPool,
}

impl RelationalFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepository for RelationalFileRepository {
    async fn create(&self, ctx: &Context, file: File) -> RepositoryResult<File> {
        let user = require_user_from_context(ctx)?;
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = sqlx::query_as::<_, File>(
            "INSERT INTO files \
             (id, tenant_id, user_id, commodity_id, bucket_key, original_name, extension, mime_type, \
              kind, size_bytes, created_at)\
             VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7, $8, $9, now()) RETURNING *",
        )
        .bind(user.tenant_id)
        .bind(user.user_id)
        .bind(file.commodity_id)
        .bind(&file.bucket_key)
        .bind(&file.original_name)
        .bind(&file.extension)
        .bind(&file.mime_type)
        .bind(file.kind)
        .bind(file.size_bytes)
        .fetch_one(&mut *tx)
        .await
        .map_err(Into::into);
        rollback_or_commit(tx, result).await
    }

    async fn get(&self, ctx: &Context, id: Uuid) -> RepositoryResult<File> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = TypedStore::new(&mut tx, "files").scan_one_by_field("id", id).await;
        rollback_or_commit(tx, result).await
    }

    async fn list_by_commodity(&self, ctx: &Context, commodity_id: Uuid) -> RepositoryResult<Vec<File>> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = TypedStore::new(&mut tx, "files")
            .scan_many_by_field("commodity_id", commodity_id)
            .await;
        rollback_or_commit(tx, result).await
    }

    async fn delete(&self, ctx: &Context, id: Uuid) -> RepositoryResult<()> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = async {
            let rows = TypedStore::new(&mut tx, "files")
                .delete_by_field("id", id)
                .await?;
            if rows == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        }
        .await;
        rollback_or_commit(tx, result).await
    }

    async fn count(&self, ctx: &Context) -> RepositoryResult<u64> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = TypedStore::new(&mut tx, "files").count_all().await;
        rollback_or_commit(tx, result).await
    }
}
