use crate::backend::relational::session::{begin_bypass, rollback_or_commit};
use crate::backend::relational::store::TypedStore;
use crate::entity::User;
use crate::error::RepositoryResult;
use crate::identity::Context;
use crate::repository::UserRepository;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Administrative only; reachable through the service registry (§4.3).
pub struct RelationalUserRepository {
    pool: PgPool,
}

impl RelationalUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for RelationalUserRepository {
    async fn create(&self, _ctx: &Context, user: User) -> RepositoryResult<User> {
        let mut tx = begin_bypass(&self.pool).await?;
        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, tenant_id, email, password_verifier, display_name, role, active, created_at, updated_at)\
             VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, $6, now(), now()) RETURNING *",
        )
        .bind(user.tenant_id)
        .bind(&user.email)
        .bind(&user.password_verifier)
        .bind(&user.display_name)
        .bind(user.role)
        .bind(user.active)
        .fetch_one(&mut *tx)
        .await
        .map_err(Into::into);
        rollback_or_commit(tx, result).await
    }

    async fn get(&self, _ctx: &Context, id: Uuid) -> RepositoryResult<User> {
        let mut tx = begin_bypass(&self.pool).await?;
        let result = TypedStore::new(&mut tx, "users").scan_one_by_field("id", id).await;
        rollback_or_commit(tx, result).await
    }

    async fn get_by_email(&self, _ctx: &Context, email: &str) -> RepositoryResult<User> {
        let mut tx = begin_bypass(&self.pool).await?;
        let result = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&mut *tx)
            .await
            .map_err(Into::into);
        rollback_or_commit(tx, result).await
    }

    async fn list(&self, _ctx: &Context) -> RepositoryResult<Vec<User>> {
        let mut tx = begin_bypass(&self.pool).await?;
        let result = TypedStore::new(&mut tx, "users").scan_all().await;
        rollback_or_commit(tx, result).await
    }

    async fn update(&self, _ctx: &Context, user: User) -> RepositoryResult<User> {
        let mut tx = begin_bypass(&self.pool).await?;
        let result = sqlx::query_as::<_, User>(
            "UPDATE users SET display_name = $1, role = $2, active = $3, updated_at = now() \
             WHERE id = $4 RETURNING *",
        )
        .bind(&user.display_name)
        .bind(user.role)
        .bind(user.active)
        .bind(user.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(Into::into);
        rollback_or_commit(tx, result).await
    }

    async fn deactivate(&self, _ctx: &Context, id: Uuid) -> RepositoryResult<()> {
        let mut tx = begin_bypass(&self.pool).await?;
        let result = sqlx::query("UPDATE users SET active = false, updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map(|_| ())
            .map_err(Into::into);
        rollback_or_commit(tx, result).await
    }

    async fn count(&self, _ctx: &Context) -> RepositoryResult<u64> {
        let mut tx = begin_bypass(&self.pool).await?;
        let result = TypedStore::new(&mut tx, "users").count_all().await;
        rollback_or_commit(tx, result).await
    }
}
