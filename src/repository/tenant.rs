use crate::entity::Tenant;
use crate::error::RepositoryResult;
use crate::identity::Context;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

/// Administrative only — there is no user-scoped factory method that yields
/// this trait (§4.3); only `create_service_registry` does.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn create(&self, ctx: &Context, tenant: Tenant) -> RepositoryResult<Tenant>;
    async fn get(&self, ctx: &Context, id: Uuid) -> RepositoryResult<Tenant>;
    async fn get_by_slug(&self, ctx: &Context, slug: &str) -> RepositoryResult<Tenant>;
    async fn list(&self, ctx: &Context) -> RepositoryResult<Vec<Tenant>>;
    async fn update(&self, ctx: &Context, tenant: Tenant) -> RepositoryResult<Tenant>;

    /// Row count across all tenants; this registry runs with RLS bypassed.
    async fn count(&self, ctx: &Context) -> RepositoryResult<u64>;
}
