use crate::entity::{ImportRestore, TransferStatus};
use crate::error::RepositoryResult;
use crate::identity::Context;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ImportRestoreRepository: Send + Sync {
    async fn create(&self, ctx: &Context, job: ImportRestore) -> RepositoryResult<ImportRestore>;
    async fn get(&self, ctx: &Context, id: Uuid) -> RepositoryResult<ImportRestore>;
    async fn list(&self, ctx: &Context) -> RepositoryResult<Vec<ImportRestore>>;
    /// `error_message` is required when transitioning to `Failed`, mirroring
    /// `ExportRepository::transition`.
    async fn transition(
        &self,
        ctx: &Context,
        id: Uuid,
        next: TransferStatus,
        error_message: Option<String>,
    ) -> RepositoryResult<ImportRestore>;

    /// Visible-row count under the caller's isolation scope (§4.3).
    async fn count(&self, ctx: &Context) -> RepositoryResult<u64>;
}
