use crate::backend::relational::session::{begin_scoped, rollback_or_commit};
use crate::backend::relational::store::TypedStore;
use crate::entity::{Area, Commodity};
use crate::error::{RepositoryError, RepositoryResult};
use crate::identity::{require_user_from_context, Context};
use crate::repository::AreaRepository;
use crate::types::Money;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::PgPool;
use uuid::Uuid;

pub struct RelationalAreaRepository {
    pool: PgPool,
}

impl RelationalAreaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AreaRepository for RelationalAreaRepository {
    async fn create(&self, ctx: &Context, area: Area) -> RepositoryResult<Area> {
        let user = require_user_from_context(ctx)?;
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = sqlx::query_as::<_, Area>(
            "INSERT INTO areas (id, tenant_id, user_id, location_id, name, created_at, updated_at)\
             VALUES (gen_random_uuid(), $1, $2, $3, $4, now(), now()) RETURNING *",
        )
        .bind(user.tenant_id)
        .bind(user.user_id)
        .bind(area.location_id)
        .bind(&area.name)
        .fetch_one(&mut *tx)
        .await
        .map_err(Into::into);
        rollback_or_commit(tx, result).await
    }

    async fn get(&self, ctx: &Context, id: Uuid) -> RepositoryResult<Area> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = TypedStore::new(&mut tx, "areas").scan_one_by_field("id", id).await;
        rollback_or_commit(tx, result).await
    }

    async fn list_by_location(&self, ctx: &Context, location_id: Uuid) -> RepositoryResult<Vec<Area>> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = TypedStore::new(&mut tx, "areas")
            .scan_many_by_field("location_id", location_id)
            .await;
        rollback_or_commit(tx, result).await
    }

    async fn update(&self, ctx: &Context, area: Area) -> RepositoryResult<Area> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = sqlx::query_as::<_, Area>(
            "UPDATE areas SET name = $1, location_id = $2, updated_at = now() \
             WHERE id = $3 RETURNING *",
        )
        .bind(&area.name)
        .bind(area.location_id)
        .bind(area.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(Into::into);
        rollback_or_commit(tx, result).await
    }

    async fn delete(&self, ctx: &Context, id: Uuid) -> RepositoryResult<()> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = async {
            let commodity_count = TypedStore::new(&mut tx, "commodities")
                .count_by_field("area_id", id)
                .await?;
            if commodity_count > 0 {
                return Err(RepositoryError::CannotDelete(
                    "area has commodities".to_string(),
                ));
            }
            let rows = TypedStore::new(&mut tx, "areas")
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
        let result = TypedStore::new(&mut tx, "areas").count_all().await;
        rollback_or_commit(tx, result).await
    }

    async fn get_commodities(&self, ctx: &Context, area_id: Uuid) -> RepositoryResult<Vec<Commodity>> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = TypedStore::new(&mut tx, "commodities")
            .scan_many_by_field("area_id", area_id)
            .await;
        rollback_or_commit(tx, result).await
    }

    async fn total_worth(&self, ctx: &Context, area_id: Uuid) -> RepositoryResult<Money> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result: RepositoryResult<(Option<BigDecimal>, Option<String>)> = sqlx::query_as(
            "SELECT sum(price * count), min(currency) FROM commodities \
             WHERE area_id = $1 AND draft = false AND status = 'in_use'",
        )
        .bind(area_id)
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
