use crate::entity::User;
use crate::error::RepositoryResult;
use crate::identity::Context;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, ctx: &Context, user: User) -> RepositoryResult<User>;
    async fn get(&self, ctx: &Context, id: Uuid) -> RepositoryResult<User>;
    async fn get_by_email(&self, ctx: &Context, email: &str) -> RepositoryResult<User>;
    async fn list(&self, ctx: &Context) -> RepositoryResult<Vec<User>>;
    async fn update(&self, ctx: &Context, user: User) -> RepositoryResult<User>;
    async fn deactivate(&self, ctx: &Context, id: Uuid) -> RepositoryResult<()>;

    /// Row count across all tenants; this registry runs with RLS bypassed.
    async fn count(&self, ctx: &Context) -> RepositoryResult<u64>;
}
