//! C6 — the in-memory backend: the same `RecordStore`/envelope filtering as
//! the embedded KV backend (§4.6), but over a plain `HashMap` with no
//! persistence, for unit and integration tests that don't want to spin up
//! Postgres or a sled data directory.

use crate::backend::embedded_repository::{
    EmbeddedAreaRepository, EmbeddedCommodityRepository, EmbeddedConcurrencySlotRepository,
    EmbeddedExportRepository, EmbeddedFileRepository, EmbeddedImportRestoreRepository,
    EmbeddedLocationRepository, EmbeddedTenantRepository, EmbeddedUserRepository,
};
use crate::backend::shared::{InMemoryByteStore, RecordStore};
use crate::error::RepositoryResult;
use crate::identity::Context;
use crate::repository::{RepositoryFactory, ServiceRegistry, UserRegistry};
use std::sync::Arc;

/// The in-memory backend's `RepositoryFactory`. Every instance is an
/// independent, empty dataset — construct one per test rather than sharing
/// it, unless the test specifically wants shared state across calls.
pub struct MemoryRepositoryFactory {
    tenants: Arc<RecordStore<InMemoryByteStore>>,
    users: Arc<RecordStore<InMemoryByteStore>>,
    locations: Arc<RecordStore<InMemoryByteStore>>,
    areas: Arc<RecordStore<InMemoryByteStore>>,
    commodities: Arc<RecordStore<InMemoryByteStore>>,
    files: Arc<RecordStore<InMemoryByteStore>>,
    exports: Arc<RecordStore<InMemoryByteStore>>,
    import_restores: Arc<RecordStore<InMemoryByteStore>>,
    concurrency_slots: Arc<RecordStore<InMemoryByteStore>>,
}

impl MemoryRepositoryFactory {
    pub fn new() -> Self {
        Self {
            tenants: Arc::new(RecordStore::new(InMemoryByteStore::new())),
            users: Arc::new(RecordStore::new(InMemoryByteStore::new())),
            locations: Arc::new(RecordStore::new(InMemoryByteStore::new())),
            areas: Arc::new(RecordStore::new(InMemoryByteStore::new())),
            commodities: Arc::new(RecordStore::new(InMemoryByteStore::new())),
            files: Arc::new(RecordStore::new(InMemoryByteStore::new())),
            exports: Arc::new(RecordStore::new(InMemoryByteStore::new())),
            import_restores: Arc::new(RecordStore::new(InMemoryByteStore::new())),
            concurrency_slots: Arc::new(RecordStore::new(InMemoryByteStore::new())),
        }
    }
}

impl RepositoryFactory for MemoryRepositoryFactory {
    fn create_user_registry(&self, ctx: &Context) -> RepositoryResult<UserRegistry> {
        crate::identity::require_user_from_context(ctx)?;
        Ok(UserRegistry {
            locations: Arc::new(EmbeddedLocationRepository::new(
                self.locations.clone(),
                self.areas.clone(),
                self.commodities.clone(),
            )),
            areas: Arc::new(EmbeddedAreaRepository::new(self.areas.clone(), self.commodities.clone())),
            commodities: Arc::new(EmbeddedCommodityRepository::new(self.commodities.clone(), self.files.clone())),
            files: Arc::new(EmbeddedFileRepository::new(self.files.clone())),
            exports: Arc::new(EmbeddedExportRepository::new(self.exports.clone())),
            import_restores: Arc::new(EmbeddedImportRestoreRepository::new(self.import_restores.clone())),
            concurrency_slots: Arc::new(EmbeddedConcurrencySlotRepository::new(self.concurrency_slots.clone())),
        })
    }

    fn build_service_registry(&self) -> RepositoryResult<ServiceRegistry> {
        Ok(ServiceRegistry {
            tenants: Arc::new(EmbeddedTenantRepository::new(self.tenants.clone())),
            users: Arc::new(EmbeddedUserRepository::new(self.users.clone())),
            locations: Arc::new(EmbeddedLocationRepository::new(
                self.locations.clone(),
                self.areas.clone(),
                self.commodities.clone(),
            )),
            areas: Arc::new(EmbeddedAreaRepository::new(self.areas.clone(), self.commodities.clone())),
            commodities: Arc::new(EmbeddedCommodityRepository::new(self.commodities.clone(), self.files.clone())),
            files: Arc::new(EmbeddedFileRepository::new(self.files.clone())),
            exports: Arc::new(EmbeddedExportRepository::new(self.exports.clone())),
            import_restores: Arc::new(EmbeddedImportRestoreRepository::new(self.import_restores.clone())),
            concurrency_slots: Arc::new(EmbeddedConcurrencySlotRepository::new(self.concurrency_slots.clone())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Location, Tenant, TenantStatus, User};
    use crate::identity::{with_user, AuthenticatedUser};
    use uuid::Uuid;

    fn admin_ctx() -> Context {
        Context::anonymous()
    }

    #[tokio::test]
    async fn locations_are_isolated_per_tenant_and_user() {
        let factory = MemoryRepositoryFactory::new();
        let service = factory.create_service_registry(&admin_ctx(), "seed test tenants").unwrap();

        let tenant_a = service
            .tenants
            .create(
                &admin_ctx(),
                Tenant {
                    id: Uuid::nil(),
                    name: "Tenant A".to_string(),
                    slug: "tenant-a".to_string(),
                    domain: None,
                    status: TenantStatus::Active,
                    created_at: chrono::Utc::now(),
                    updated_at: chrono::Utc::now(),
                },
            )
            .await
            .unwrap();

        let user_a = service
            .users
            .create(
                &admin_ctx(),
                User {
                    id: Uuid::nil(),
                    tenant_id: tenant_a.id,
                    email: "a@example.com".to_string(),
                    password_verifier: "verifier".to_string(),
                    display_name: "A".to_string(),
                    role: crate::entity::Role::Admin,
                    active: true,
                    created_at: chrono::Utc::now(),
                    updated_at: chrono::Utc::now(),
                },
            )
            .await
            .unwrap();

        let ctx_a = with_user(
            Context::anonymous(),
            AuthenticatedUser {
                user_id: user_a.id,
                tenant_id: tenant_a.id,
            },
        );
        let registry_a = factory.create_user_registry(&ctx_a).unwrap();
        let location = registry_a
            .locations
            .create(
                &ctx_a,
                Location {
                    id: Uuid::nil(),
                    tenant_id: Uuid::nil(),
                    name: "Warehouse".to_string(),
                    address: None,
                    created_at: chrono::Utc::now(),
                    updated_at: chrono::Utc::now(),
                },
            )
            .await
            .unwrap();

        let ctx_other = with_user(
            Context::anonymous(),
            AuthenticatedUser {
                user_id: Uuid::new_v4(),
                tenant_id: Uuid::new_v4(),
            },
        );
        let registry_other = factory.create_user_registry(&ctx_other).unwrap();
        let result = registry_other.locations.get(&ctx_other, location.id).await;
        assert!(result.unwrap_err().is_not_found());
    }
}
