use crate::entity::ConcurrencySlot;
use crate::error::RepositoryResult;
use crate::identity::Context;
use async_trait::async_trait;
use chrono::Duration;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

/// Bounded per-user in-flight job slots (§5). `acquire_slot` is atomic: it
/// must never let a user hold more than their configured `max_slots`, even
/// under concurrent callers.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConcurrencySlotRepository: Send + Sync {
    /// Attempts to acquire a slot for `job_kind`, held for `ttl`. Returns
    /// `RepositoryError::ResourceLimitExceeded` if the caller already holds
    /// `max_slots` unexpired slots.
    async fn acquire_slot(
        &self,
        ctx: &Context,
        job_kind: &str,
        max_slots: u32,
        ttl: Duration,
    ) -> RepositoryResult<ConcurrencySlot>;

    async fn release_slot(&self, ctx: &Context, id: Uuid) -> RepositoryResult<()>;

    async fn count_active(&self, ctx: &Context) -> RepositoryResult<u32>;

    /// Visible-row count under the caller's isolation scope (§4.3), distinct
    /// from `count_active`'s unexpired-only count.
    async fn count(&self, ctx: &Context) -> RepositoryResult<u64>;

    /// Removes every slot whose `expires_at` has passed, across all tenants.
    /// Idempotent; does not touch any other entity (§C of SPEC_FULL.md — the
    /// decided answer to the open question on export-slot coupling).
    async fn cleanup_expired_slots(&self) -> RepositoryResult<u64>;
}
