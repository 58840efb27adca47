use crate::entity::File;
use crate::error::RepositoryResult;
use crate::identity::Context;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn create(&self, ctx: &Context, file: File) -> RepositoryResult<File>;
    async fn get(&self, ctx: &Context, id: Uuid) -> RepositoryResult<File>;
    async fn list_by_commodity(&self, ctx: &Context, commodity_id: Uuid) -> RepositoryResult<Vec<File>>;
    async fn delete(&self, ctx: &Context, id: Uuid) -> RepositoryResult<()>;

    /// Visible-row count under the caller's isolation scope (§4.3).
    async fn count(&self, ctx: &Context) -> RepositoryResult<u64>;
}
