use crate::entity::{Commodity, File};
use crate::error::RepositoryResult;
use crate::identity::Context;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommodityRepository: Send + Sync {
    async fn create(&self, ctx: &Context, commodity: Commodity) -> RepositoryResult<Commodity>;
    async fn get(&self, ctx: &Context, id: Uuid) -> RepositoryResult<Commodity>;
    async fn list_by_area(&self, ctx: &Context, area_id: Uuid) -> RepositoryResult<Vec<Commodity>>;
    async fn update(&self, ctx: &Context, commodity: Commodity) -> RepositoryResult<Commodity>;
    async fn delete(&self, ctx: &Context, id: Uuid) -> RepositoryResult<()>;

    /// Visible-row count under the caller's isolation scope (§4.3).
    async fn count(&self, ctx: &Context) -> RepositoryResult<u64>;

    async fn get_files(&self, ctx: &Context, commodity_id: Uuid) -> RepositoryResult<Vec<File>>;

    /// Case-insensitive substring search over commodity names visible to the
    /// caller (§4.3's relationship-query example).
    async fn search_by_name(&self, ctx: &Context, query: &str) -> RepositoryResult<Vec<Commodity>>;
}
