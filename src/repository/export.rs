use crate::entity::{Export, ExportStatus};
use crate::error::RepositoryResult;
use crate::identity::Context;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ExportRepository: Send + Sync {
    async fn create(&self, ctx: &Context, export: Export) -> RepositoryResult<Export>;
    async fn get(&self, ctx: &Context, id: Uuid) -> RepositoryResult<Export>;
    async fn list(&self, ctx: &Context) -> RepositoryResult<Vec<Export>>;

    /// Applies `Export::transition` and persists the new status atomically;
    /// returns `RepositoryError::InvalidInput` on an illegal edge (§4.11) or
    /// on a missing `bucket_key`/`error_message` for the target status.
    /// `bucket_key` is required (and `error_message` cleared) when
    /// transitioning to `Completed`; `error_message` is required when
    /// transitioning to `Failed`.
    async fn transition(
        &self,
        ctx: &Context,
        id: Uuid,
        next: ExportStatus,
        bucket_key: Option<String>,
        error_message: Option<String>,
    ) -> RepositoryResult<Export>;

    /// Visible-row count under the caller's isolation scope (§4.3).
    async fn count(&self, ctx: &Context) -> RepositoryResult<u64>;
}
