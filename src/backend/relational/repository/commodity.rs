use crate::backend::relational::session::{begin_scoped, rollback_or_commit};
use crate::backend::relational::store::TypedStore;
use crate::entity::{Commodity, File};
use crate::error::{RepositoryError, RepositoryResult};
use crate::identity::{require_user_from_context, Context};
use crate::repository::CommodityRepository;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub struct RelationalCommodityRepository {
    pool: PgPool,
}

impl RelationalCommodityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommodityRepository for RelationalCommodityRepository {
    async fn create(&self, ctx: &Context, commodity: Commodity) -> RepositoryResult<Commodity> {
        let user = require_user_from_context(ctx)?;
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = sqlx::query_as::<_, Commodity>(
            "INSERT INTO commodities \
             (id, tenant_id, user_id, area_id, name, short_name, commodity_type, count, price, currency, \
              status, serial_numbers, tags, urls, comments, draft, purchase_date, warranty_expires_date, \
              created_at, updated_at)\
             VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                      $16, now(), now()) RETURNING *",
        )
        .bind(user.tenant_id)
        .bind(user.user_id)
        .bind(commodity.area_id)
        .bind(&commodity.name)
        .bind(&commodity.short_name)
        .bind(&commodity.commodity_type)
        .bind(commodity.count)
        .bind(&commodity.price)
        .bind(&commodity.currency)
        .bind(commodity.status)
        .bind(&commodity.serial_numbers)
        .bind(&commodity.tags)
        .bind(&commodity.urls)
        .bind(&commodity.comments)
        .bind(commodity.draft)
        .bind(commodity.purchase_date)
        .bind(commodity.warranty_expires_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(Into::into);
        rollback_or_commit(tx, result).await
    }

    async fn get(&self, ctx: &Context, id: Uuid) -> RepositoryResult<Commodity> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = TypedStore::new(&mut tx, "commodities")
            .scan_one_by_field("id", id)
            .await;
        rollback_or_commit(tx, result).await
    }

    async fn list_by_area(&self, ctx: &Context, area_id: Uuid) -> RepositoryResult<Vec<Commodity>> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = TypedStore::new(&mut tx, "commodities")
            .scan_many_by_field("area_id", area_id)
            .await;
        rollback_or_commit(tx, result).await
    }

    async fn update(&self, ctx: &Context, commodity: Commodity) -> RepositoryResult<Commodity> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = sqlx::query_as::<_, Commodity>(
            "UPDATE commodities SET name = $1, short_name = $2, commodity_type = $3, count = $4, \
             price = $5, currency = $6, status = $7, serial_numbers = $8, tags = $9, urls = $10, \
             comments = $11, draft = $12, purchase_date = $13, warranty_expires_date = $14, \
             updated_at = now() WHERE id = $15 RETURNING *",
        )
        .bind(&commodity.name)
        .bind(&commodity.short_name)
        .bind(&commodity.commodity_type)
        .bind(commodity.count)
        .bind(&commodity.price)
        .bind(&commodity.currency)
        .bind(commodity.status)
        .bind(&commodity.serial_numbers)
        .bind(&commodity.tags)
        .bind(&commodity.urls)
        .bind(&commodity.comments)
        .bind(commodity.draft)
        .bind(commodity.purchase_date)
        .bind(commodity.warranty_expires_date)
        .bind(commodity.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(Into::into);
        rollback_or_commit(tx, result).await
    }

    async fn delete(&self, ctx: &Context, id: Uuid) -> RepositoryResult<()> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = async {
            let file_count = TypedStore::new(&mut tx, "files")
                .count_by_field("commodity_id", id)
                .await?;
            if file_count > 0 {
                return Err(RepositoryError::CannotDelete(
                    "commodity has files".to_string(),
                ));
            }
            let rows = TypedStore::new(&mut tx, "commodities")
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
        let result = TypedStore::new(&mut tx, "commodities").count_all().await;
        rollback_or_commit(tx, result).await
    }

    async fn get_files(&self, ctx: &Context, commodity_id: Uuid) -> RepositoryResult<Vec<File>> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let result = TypedStore::new(&mut tx, "files")
            .scan_many_by_field("commodity_id", commodity_id)
            .await;
        rollback_or_commit(tx, result).await
    }

    async fn search_by_name(&self, ctx: &Context, query: &str) -> RepositoryResult<Vec<Commodity>> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let pattern = format!("%{}%", query.replace('%', "\\%").replace('_', "\\_"));
        let result = sqlx::query_as::<_, Commodity>(
            "SELECT * FROM commodities WHERE name ILIKE $1 ORDER BY name",
        )
        .bind(pattern)
        .fetch_all(&mut *tx)
        .await
        .map_err(Into::into);
        rollback_or_commit(tx, result).await
    }
}
