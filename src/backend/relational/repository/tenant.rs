use crate::backend::relational::session::{begin_bypass, rollback_or_commit};
use crate::backend::relational::store::TypedStore;
use crate::entity::Tenant;
use crate::error::RepositoryResult;
use crate::identity::Context;
use crate::repository::TenantRepository;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Administrative only; reachable through the service registry, so every
/// call runs with the bypass role active rather than session-scoped (§4.3).
pub struct RelationalTenantRepository {
    pool: PgPool,
}

impl RelationalTenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for RelationalTenantRepository {
    async fn create(&self, _ctx: &Context, tenant: Tenant) -> RepositoryResult<Tenant> {
        let mut tx = begin_bypass(&self.pool).await?;
        let result = sqlx::query_as::<_, Tenant>(
            "INSERT INTO tenants (id, name, slug, domain, status, created_at, updated_at)\
             VALUES (gen_random_uuid(), $1, $2, $3, $4, now(), now()) RETURNING *",
        )
        .bind(&tenant.name)
        .bind(&tenant.slug)
        .bind(&tenant.domain)
        .bind(tenant.status)
        .fetch_one(&mut *tx)
        .await
        .map_err(Into::into);
        rollback_or_commit(tx, result).await
    }

    async fn get(&self, _ctx: &Context, id: Uuid) -> RepositoryResult<Tenant> {
        let mut tx = begin_bypass(&self.pool).await?;
        let result = TypedStore::new(&mut tx, "tenants").scan_one_by_field("id", id).await;
        rollback_or_commit(tx, result).await
    }

    async fn get_by_slug(&self, _ctx: &Context, slug: &str) -> RepositoryResult<Tenant> {
        let mut tx = begin_bypass(&self.pool).await?;
        let result = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE slug = $1")
            .bind(slug)
            .fetch_one(&mut *tx)
            .await
            .map_err(Into::into);
        rollback_or_commit(tx, result).await
    }

    async fn list(&self, _ctx: &Context) -> RepositoryResult<Vec<Tenant>> {
        let mut tx = begin_bypass(&self.pool).await?;
        let result = TypedStore::new(&mut tx, "tenants").scan_all().await;
        rollback_or_commit(tx, result).await
    }

    async fn update(&self, _ctx: &Context, tenant: Tenant) -> RepositoryResult<Tenant> {
        let mut tx = begin_bypass(&self.pool).await?;
        let result = sqlx::query_as::<_, Tenant>(
            "UPDATE tenants SET name = $1, domain = $2, status = $3, updated_at = now() \
             WHERE id = $4 RETURNING *",
        )
        .bind(&tenant.name)
        .bind(&tenant.domain)
        .bind(tenant.status)
        .bind(tenant.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(Into::into);
        rollback_or_commit(tx, result).await
    }

    async fn count(&self, _ctx: &Context) -> RepositoryResult<u64> {
        let mut tx = begin_bypass(&self.pool).await?;
        let result = TypedStore::new(&mut tx, "tenants").count_all().await;
        rollback_or_commit(tx, result).await
    }
}
