use crate::entity::{Area, Location};
use crate::error::RepositoryResult;
use crate::identity::Context;
use crate::types::Money;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn create(&self, ctx: &Context, location: Location) -> RepositoryResult<Location>;
    async fn get(&self, ctx: &Context, id: Uuid) -> RepositoryResult<Location>;
    async fn list(&self, ctx: &Context) -> RepositoryResult<Vec<Location>>;
    async fn update(&self, ctx: &Context, location: Location) -> RepositoryResult<Location>;
    async fn delete(&self, ctx: &Context, id: Uuid) -> RepositoryResult<()>;

    /// Visible-row count under the caller's isolation scope (§4.3).
    async fn count(&self, ctx: &Context) -> RepositoryResult<u64>;

    /// The areas belonging to `location_id` (§4.3's relationship-query
    /// example), filtered the same way `list` is by the backend's isolation
    /// mechanism.
    async fn get_areas(&self, ctx: &Context, location_id: Uuid) -> RepositoryResult<Vec<Area>>;

    /// Sum of `count * price` over commodities under this location that are
    /// neither `draft` nor in a status other than `in_use` (§3.3, SPEC_FULL §B).
    async fn total_worth(&self, ctx: &Context, location_id: Uuid) -> RepositoryResult<Money>;
}
