//! C5 — the embedded KV backend: a `sled` database with one tree per
//! entity, RLS replaced by the in-application filtering `RecordStore`
//! performs over the envelope format (§4.5). Intended for single-process
//! deployments that don't want to run Postgres, not for multi-node setups.

use crate::backend::embedded_repository::{
    EmbeddedAreaRepository, EmbeddedCommodityRepository, EmbeddedConcurrencySlotRepository,
    EmbeddedExportRepository, EmbeddedFileRepository, EmbeddedImportRestoreRepository,
    EmbeddedLocationRepository, EmbeddedTenantRepository, EmbeddedUserRepository,
};
use crate::backend::shared::RecordStore;
use crate::error::{RepositoryError, RepositoryResult};
use crate::identity::Context;
use crate::repository::{RepositoryFactory, ServiceRegistry, UserRegistry};
use std::path::Path;
use std::sync::Arc;

const TABLES: &[&str] = &[
    "tenants",
    "users",
    "locations",
    "areas",
    "commodities",
    "files",
    "exports",
    "import_restores",
    "concurrency_slots",
];

fn open_tree(db: &sled::Db, name: &str) -> RepositoryResult<Arc<RecordStore<sled::Tree>>> {
    let tree = db.open_tree(name).map_err(RepositoryError::from)?;
    Ok(Arc::new(RecordStore::new(tree)))
}

/// The embedded KV backend's `RepositoryFactory`. One tree per table, all
/// opened eagerly at construction so a misconfigured data directory fails
/// fast at startup rather than on first use.
pub struct KvRepositoryFactory {
    tenants: Arc<RecordStore<sled::Tree>>,
    users: Arc<RecordStore<sled::Tree>>,
    locations: Arc<RecordStore<sled::Tree>>,
    areas: Arc<RecordStore<sled::Tree>>,
    commodities: Arc<RecordStore<sled::Tree>>,
    files: Arc<RecordStore<sled::Tree>>,
    exports: Arc<RecordStore<sled::Tree>>,
    import_restores: Arc<RecordStore<sled::Tree>>,
    concurrency_slots: Arc<RecordStore<sled::Tree>>,
}

impl KvRepositoryFactory {
    pub fn open(path: impl AsRef<Path>) -> RepositoryResult<Self> {
        let db = sled::open(path).map_err(RepositoryError::from)?;
        for table in TABLES {
            db.open_tree(table).map_err(RepositoryError::from)?;
        }
        Ok(Self {
            tenants: open_tree(&db, "tenants")?,
            users: open_tree(&db, "users")?,
            locations: open_tree(&db, "locations")?,
            areas: open_tree(&db, "areas")?,
            commodities: open_tree(&db, "commodities")?,
            files: open_tree(&db, "files")?,
            exports: open_tree(&db, "exports")?,
            import_restores: open_tree(&db, "import_restores")?,
            concurrency_slots: open_tree(&db, "concurrency_slots")?,
        })
    }
}

impl RepositoryFactory for KvRepositoryFactory {
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
