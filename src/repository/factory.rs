//! The repository factory (§4.3): every caller obtains repository instances
//! through here rather than constructing a backend type directly, so the
//! identity context and the bypass/non-bypass choice are made once, at one
//! call site, instead of threaded ad hoc through every handler.

use crate::error::{RepositoryError, RepositoryResult};
use crate::identity::Context;
use crate::repository::{
    AreaRepository, CommodityRepository, ConcurrencySlotRepository, ExportRepository,
    FileRepository, ImportRestoreRepository, LocationRepository, TenantRepository, UserRepository,
};
use std::sync::Arc;
use tracing::warn;

/// The repositories available to an ordinary, identity-bound caller. Every
/// call made through these instances is subject to the backend's isolation
/// mechanism (RLS on the relational backend, in-application filtering on
/// the embedded/in-memory backends) — there is no bypass here.
#[derive(Clone)]
pub struct UserRegistry {
    pub locations: Arc<dyn LocationRepository>,
    pub areas: Arc<dyn AreaRepository>,
    pub commodities: Arc<dyn CommodityRepository>,
    pub files: Arc<dyn FileRepository>,
    pub exports: Arc<dyn ExportRepository>,
    pub import_restores: Arc<dyn ImportRestoreRepository>,
    pub concurrency_slots: Arc<dyn ConcurrencySlotRepository>,
}

/// The repositories available through the service escape hatch (§4.3, §9):
/// tenant- and user-administration repositories, plus everything
/// `UserRegistry` exposes, all running with the bypass role active. Obtained
/// only via `create_service_registry`, which requires a caller-supplied
/// audit reason (SPEC_FULL.md §B).
#[derive(Clone)]
pub struct ServiceRegistry {
    pub tenants: Arc<dyn TenantRepository>,
    pub users: Arc<dyn UserRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub areas: Arc<dyn AreaRepository>,
    pub commodities: Arc<dyn CommodityRepository>,
    pub files: Arc<dyn FileRepository>,
    pub exports: Arc<dyn ExportRepository>,
    pub import_restores: Arc<dyn ImportRestoreRepository>,
    pub concurrency_slots: Arc<dyn ConcurrencySlotRepository>,
}

/// Implemented once per backend (relational, embedded KV, in-memory). Each
/// backend decides internally how a "user-scoped" instance differs from a
/// "service-scoped" one — session variables for the relational backend,
/// an in-process filter toggle for the other two.
pub trait RepositoryFactory: Send + Sync {
    /// Builds the registry available to `ctx`. Returns
    /// `RepositoryError::IdentityMissing` if `ctx` carries no authenticated
    /// user — every user-scoped repository call needs one to filter by.
    fn create_user_registry(&self, ctx: &Context) -> RepositoryResult<UserRegistry>;

    /// Like `create_user_registry`, but panics instead of returning an error.
    /// For call sites that have already established identity is present
    /// (e.g. inside an authentication middleware) and want that invariant
    /// enforced rather than threaded as a `Result`.
    fn must_create_user_registry(&self, ctx: &Context) -> UserRegistry {
        self.create_user_registry(ctx)
            .expect("must_create_user_registry called without an authenticated identity")
    }

    /// Builds the bypass registry, ignoring RLS / in-process user filtering.
    /// `reason` is a short, human-readable justification logged at `warn`
    /// level on every call (SPEC_FULL.md §B) — this is the crate's one
    /// cross-tenant escape hatch (§9) and every use of it is meant to be
    /// conspicuous in logs.
    fn create_service_registry(&self, ctx: &Context, reason: &str) -> RepositoryResult<ServiceRegistry> {
        if reason.trim().is_empty() {
            return Err(RepositoryError::InvalidInput(
                "create_service_registry requires a non-empty audit reason".to_string(),
            ));
        }
        warn!(
            user_id = ?ctx.user_id(),
            tenant_id = ?ctx.tenant_id(),
            reason,
            "service registry (RLS bypass) created"
        );
        self.build_service_registry()
    }

    /// Backend-specific construction of the bypass registry, called only
    /// through `create_service_registry` so the audit log above always
    /// fires first.
    fn build_service_registry(&self) -> RepositoryResult<ServiceRegistry>;
}
