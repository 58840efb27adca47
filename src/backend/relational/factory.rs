use crate::backend::relational::repository::{
    RelationalAreaRepository, RelationalCommodityRepository, RelationalConcurrencySlotRepository,
    RelationalExportRepository, RelationalFileRepository, RelationalImportRestoreRepository,
    RelationalLocationRepository, RelationalTenantRepository, RelationalUserRepository,
};
use crate::error::RepositoryResult;
use crate::identity::Context;
use crate::repository::{RepositoryFactory, ServiceRegistry, UserRegistry};
use sqlx::PgPool;
use std::sync::Arc;

/// The relational backend's `RepositoryFactory` (C4): both registries share
/// the one pool; isolation comes from the session variables each repository
/// sets per call, not from which factory method was used to obtain them.
pub struct RelationalRepositoryFactory {
    pool: PgPool,
}

impl RelationalRepositoryFactory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl RepositoryFactory for RelationalRepositoryFactory {
    fn create_user_registry(&self, ctx: &Context) -> RepositoryResult<UserRegistry> {
        crate::identity::require_user_from_context(ctx)?;
        Ok(UserRegistry {
            locations: Arc::new(RelationalLocationRepository::new(self.pool.clone())),
            areas: Arc::new(RelationalAreaRepository::new(self.pool.clone())),
            commodities: Arc::new(RelationalCommodityRepository::new(self.pool.clone())),
            files: Arc::new(RelationalFileRepository::new(self.pool.clone())),
            exports: Arc::new(RelationalExportRepository::new(self.pool.clone())),
            import_restores: Arc::new(RelationalImportRestoreRepository::new(self.pool.clone())),
            concurrency_slots: Arc::new(RelationalConcurrencySlotRepository::new(self.pool.clone())),
        })
    }

    fn build_service_registry(&self) -> RepositoryResult<ServiceRegistry> {
        Ok(ServiceRegistry {
            tenants: Arc::new(RelationalTenantRepository::new(self.pool.clone())),
            users: Arc::new(RelationalUserRepository::new(self.pool.clone())),
            locations: Arc::new(RelationalLocationRepository::new(self.pool.clone())),
            areas: Arc::new(RelationalAreaRepository::new(self.pool.clone())),
            commodities: Arc::new(RelationalCommodityRepository::new(self.pool.clone())),
            files: Arc::new(RelationalFileRepository::new(self.pool.clone())),
            exports: Arc::new(RelationalExportRepository::new(self.pool.clone())),
            import_restores: Arc::new(RelationalImportRestoreRepository::new(self.pool.clone())),
            concurrency_slots: Arc::new(RelationalConcurrencySlotRepository::new(self.pool.clone())),
        })
    }
}
