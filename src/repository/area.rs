use crate::entity::{Area, Commodity};
use crate::error::RepositoryResult;
use crate::identity::Context;
use crate::types::Money;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AreaRepository: Send + Sync {
    async fn create(&self, ctx: &Context, area: Area) -> RepositoryResult<Area>;
    async fn get(&self, ctx: &Context, id: Uuid) -> RepositoryResult<Area>;
    async fn list_by_location(&self, ctx: &Context, location_id: Uuid) -> RepositoryResult<Vec<Area>>;
    async fn update(&self, ctx: &Context, area: Area) -> RepositoryResult<Area>;
    async fn delete(&self, ctx: &Context, id: Uuid) -> RepositoryResult<()>;

    /// Visible-row count under the caller's isolation scope (§4.3).
    async fn count(&self, ctx: &Context) -> RepositoryResult<u64>;

    async fn get_commodities(&self, ctx: &Context, area_id: Uuid) -> RepositoryResult<Vec<Commodity>>;

    /// Sum of `count * price` over commodities under this area that count
    /// toward worth (§3.3, SPEC_FULL §B).
    async fn total_worth(&self, ctx: &Context, area_id: Uuid) -> RepositoryResult<Money>;
}
