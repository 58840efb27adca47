use crate::backend::relational::session::{begin_scoped, rollback_or_commit};
use crate::backend::relational::store::TypedStore;
use crate::entity::{Area, Location};
use crate::error::{RepositoryError, RepositoryResult};
use crate::identity::{require_user_from_context, Context};
use crate::repository::LocationRepository;
use crate::types::Money;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::PgPool;
use uuid::Uuid;

pub struct RelationalLocationRepository {
    pool: PgPool,
}

impl RelationalLocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationRepository for RelationalLocationRepository {
    async fn create(&self, ctx: &Context, location: Location) -> RepositoryResult<Location> {
        let user = require_user_from_context(ctx)?;
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = sqlx::query_as::<_, Location>(
            "INSERT INTO locations (id, tenant_id, user_id, name, address, created_at, updated_at)\
             VALUES (gen_random_uuid(), $1, $2, $3, $4, now(), now()) RETURNING *",
        )
        .bind(user.tenant_id)
        .bind(user.user_id)
        .bind(&location.name)
        .bind(&location.address)
        .fetch_one(&mut *tx)
        .await
        .map_err(Into::into);
        rollback_or_commit(tx, result).await
    }

    async fn get(&self, ctx: &Context, id: Uuid) -> RepositoryResult<Location> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = TypedStore::new(&mut tx, "locations")
            .scan_one_by_field("id", id)
            .await;
        rollback_or_commit(tx, result).await
    }

    async fn list(&self, ctx: &Context) -> RepositoryResult<Vec<Location>> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = TypedStore::new(&mut tx, "locations").scan_all().await;
        rollback_or_commit(tx, result).await
    }

    async fn update(&self, ctx: &Context, location: Location) -> RepositoryResult<Location> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = sqlx::query_as::<_, Location>(
            "UPDATE locations SET name = $1, address = $2, updated_at = now() \
             WHERE id = $3 RETURNING *",
        )
        .bind(&location.name)
        .bind(&location.address)
        .bind(location.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(Into::into);
        rollback_or_commit(tx, result).await
    }

    async fn delete(&self, ctx: &Context, id: Uuid) -> RepositoryResult<()> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = async {
            let area_count = TypedStore::new(&mut tx, "areas")
                .count_by_field("location_id", id)
                .await?;
            if area_count > 0 {
                return Err(RepositoryError::CannotDelete(
                    "location has areas".to_string(),
                ));
            }
            let rows = TypedStore::new(&mut tx, "locations")
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
        let result = TypedStore::new(&mut tx, "locations").count_all().await;
        rollback_or_commit(tx, result).await
    }

    async fn get_areas(&self, ctx: &Context, location_id: Uuid) -> RepositoryResult<Vec<Area>> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = TypedStore::new(&mut tx, "areas")
            .scan_many_by_field("location_id", location_id)
            .await;
        rollback_or_commit(tx, result).await
    }

    async fn total_worth(&self, ctx: &Context, location_id: Uuid) -> RepositoryResult<Money> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result: RepositoryResult<(Option<BigDecimal>, Option<String>)> = sqlx::query_as(
            "SELECT sum(c.price * c.count), min(c.currency) FROM commodities c \
             JOIN areas a ON c.area_id = a.id \
             WHERE a.location_id = $1 AND c.draft = false AND c.status = 'in_use'",
        )
        .bind(location_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(Into::into);
        let result = result.map(|(amount, currency)| Money {
            amount: amount.unwrap_or_else(|| BigDecimal::from(0)),
            currency: currency.unwrap_or_default(),
        });
        rollback_or_commit(tx, result).await
    }
}
