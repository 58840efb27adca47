//! The generic repository implementations shared by the embedded KV backend
//! (§4.5, C5) and the in-memory backend (§4.6, C6). Both replace the
//! relational backend's RLS with in-application filtering over
//! `RecordStore` (`backend::shared`); the only thing that differs between
//! the two backends is which `ByteStore` backs each `RecordStore`.
//!
//! Administrative repositories (`Tenant`, `User`) never filter by identity —
//! they are reachable only through the service registry, mirroring the
//! relational backend's `begin_bypass` repositories. Every other entity
//! always filters by the caller's tenant and user id, matching the
//! relational backend's `begin_scoped` repositories — there is no
//! bypass-vs-scoped split at the entity level, only at the admin boundary.

use crate::backend::shared::{ByteStore, RecordStore};
use crate::entity::{
    Area, Commodity, ConcurrencySlot, Export, ExportStatus, File, Identifiable, ImportRestore,
    Location, Tenant, TransferStatus, User,
};
use crate::error::{RepositoryError, RepositoryResult};
use crate::identity::{require_user_from_context, Context};
use crate::repository::{
    AreaRepository, CommodityRepository, ConcurrencySlotRepository, ExportRepository,
    FileRepository, ImportRestoreRepository, LocationRepository, TenantRepository, UserRepository,
};
use crate::types::Money;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{Duration, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

fn scoped(ctx: &Context) -> RepositoryResult<(Option<Uuid>, Option<Uuid>)> {
    let user = require_user_from_context(ctx)?;
    Ok((Some(user.tenant_id), Some(user.user_id)))
}

fn stamp_new<T: Identifiable>(mut value: T) -> T {
    value.set_id(Uuid::new_v4());
    value
}

pub struct EmbeddedTenantRepository<S: ByteStore> {
    store: Arc<RecordStore<S>>,
}

impl<S: ByteStore> EmbeddedTenantRepository<S> {
    pub fn new(store: Arc<RecordStore<S>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: ByteStore + 'static> TenantRepository for EmbeddedTenantRepository<S> {
    async fn create(&self, ctx: &Context, tenant: Tenant) -> RepositoryResult<Tenant> {
        tenant.validate(ctx)?;
        let tenant = stamp_new(tenant);
        let now = Utc::now();
        let tenant = Tenant {
            created_at: now,
            updated_at: now,
            ..tenant
        };
        self.store.put(tenant.id, None, None, &tenant)?;
        Ok(tenant)
    }

    async fn get(&self, _ctx: &Context, id: Uuid) -> RepositoryResult<Tenant> {
        self.store.get(id, None, None)
    }

    async fn get_by_slug(&self, _ctx: &Context, slug: &str) -> RepositoryResult<Tenant> {
        self.store
            .list::<Tenant>(None, None)?
            .into_iter()
            .find(|t| t.slug == slug)
            .ok_or(RepositoryError::NotFound)
    }

    async fn list(&self, _ctx: &Context) -> RepositoryResult<Vec<Tenant>> {
        self.store.list(None, None)
    }

    async fn update(&self, ctx: &Context, tenant: Tenant) -> RepositoryResult<Tenant> {
        tenant.validate(ctx)?;
        self.store.get::<Tenant>(tenant.id, None, None)?;
        let tenant = Tenant {
            updated_at: Utc::now(),
            ..tenant
        };
        self.store.put(tenant.id, None, None, &tenant)?;
        Ok(tenant)
    }

    async fn count(&self, _ctx: &Context) -> RepositoryResult<u64> {
        self.store.count(None, None)
    }
}

pub struct EmbeddedUserRepository<S: ByteStore> {
    store: Arc<RecordStore<S>>,
}

impl<S: ByteStore> EmbeddedUserRepository<S> {
    pub fn new(store: Arc<RecordStore<S>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: ByteStore + 'static> UserRepository for EmbeddedUserRepository<S> {
    async fn create(&self, ctx: &Context, user: User) -> RepositoryResult<User> {
        user.validate(ctx)?;
        let user = stamp_new(user);
        let now = Utc::now();
        let user = User {
            created_at: now,
            updated_at: now,
            ..user
        };
        self.store.put(user.id, None, None, &user)?;
        Ok(user)
    }

    async fn get(&self, _ctx: &Context, id: Uuid) -> RepositoryResult<User> {
        self.store.get(id, None, None)
    }

    async fn get_by_email(&self, _ctx: &Context, email: &str) -> RepositoryResult<User> {
        self.store
            .list::<User>(None, None)?
            .into_iter()
            .find(|u| u.email == email)
            .ok_or(RepositoryError::NotFound)
    }

    async fn list(&self, _ctx: &Context) -> RepositoryResult<Vec<User>> {
        self.store.list(None, None)
    }

    async fn update(&self, ctx: &Context, user: User) -> RepositoryResult<User> {
        user.validate(ctx)?;
        let user = User {
            updated_at: Utc::now(),
            ..user
        };
        self.store.put(user.id, None, None, &user)?;
        Ok(user)
    }

    async fn deactivate(&self, _ctx: &Context, id: Uuid) -> RepositoryResult<()> {
        let mut user: User = self.store.get(id, None, None)?;
        user.active = false;
        user.updated_at = Utc::now();
        self.store.put(user.id, None, None, &user)
    }

    async fn count(&self, _ctx: &Context) -> RepositoryResult<u64> {
        self.store.count(None, None)
    }
}

pub struct EmbeddedLocationRepository<S: ByteStore> {
    locations: Arc<RecordStore<S>>,
    areas: Arc<RecordStore<S>>,
    commodities: Arc<RecordStore<S>>,
}

impl<S: ByteStore> EmbeddedLocationRepository<S> {
    pub fn new(
        locations: Arc<RecordStore<S>>,
        areas: Arc<RecordStore<S>>,
        commodities: Arc<RecordStore<S>>,
    ) -> Self {
        Self {
            locations,
            areas,
            commodities,
        }
    }
}

#[async_trait]
impl<S: ByteStore + 'static> LocationRepository for EmbeddedLocationRepository<S> {
    async fn create(&self, ctx: &Context, location: Location) -> RepositoryResult<Location> {
        location.validate(ctx)?;
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        let now = Utc::now();
        let location = stamp_new(Location {
            tenant_id: tenant_id.expect("scoped() always returns Some tenant_id"),
            created_at: now,
            updated_at: now,
            ..location
        });
        self.locations.put(location.id, tenant_id, owner_user_id, &location)?;
        Ok(location)
    }

    async fn get(&self, ctx: &Context, id: Uuid) -> RepositoryResult<Location> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.locations.get(id, tenant_id, owner_user_id)
    }

    async fn list(&self, ctx: &Context) -> RepositoryResult<Vec<Location>> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.locations.list(tenant_id, owner_user_id)
    }

    async fn update(&self, ctx: &Context, location: Location) -> RepositoryResult<Location> {
        location.validate(ctx)?;
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.locations.get::<Location>(location.id, tenant_id, owner_user_id)?;
        let location = Location {
            updated_at: Utc::now(),
            ..location
        };
        self.locations.put(location.id, tenant_id, owner_user_id, &location)?;
        Ok(location)
    }

    async fn delete(&self, ctx: &Context, id: Uuid) -> RepositoryResult<()> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.locations.get::<Location>(id, tenant_id, owner_user_id)?;
        let has_areas = !self
            .areas
            .list_filtered(tenant_id, owner_user_id, |a: &Area| a.location_id == id)?
            .is_empty();
        if has_areas {
            return Err(RepositoryError::CannotDelete(
                "location has areas".to_string(),
            ));
        }
        self.locations.delete(id)
    }

    async fn count(&self, ctx: &Context) -> RepositoryResult<u64> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.locations.count(tenant_id, owner_user_id)
    }

    async fn get_areas(&self, ctx: &Context, location_id: Uuid) -> RepositoryResult<Vec<Area>> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.areas
            .list_filtered(tenant_id, owner_user_id, |a: &Area| a.location_id == location_id)
    }

    async fn total_worth(&self, ctx: &Context, location_id: Uuid) -> RepositoryResult<Money> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        let area_ids: HashSet<Uuid> = self
            .areas
            .list_filtered(tenant_id, owner_user_id, |a: &Area| a.location_id == location_id)?
            .into_iter()
            .map(|a| a.id)
            .collect();
        let commodities: Vec<Commodity> = self.commodities.list(tenant_id, owner_user_id)?;
        Ok(sum_worth(commodities.iter().filter(|c| area_ids.contains(&c.area_id))))
    }
}

pub struct EmbeddedAreaRepository<S: ByteStore> {
    areas: Arc<RecordStore<S>>,
    commodities: Arc<RecordStore<S>>,
}

impl<S: ByteStore> EmbeddedAreaRepository<S> {
    pub fn new(areas: Arc<RecordStore<S>>, commodities: Arc<RecordStore<S>>) -> Self {
        Self { areas, commodities }
    }
}

#[async_trait]
impl<S: ByteStore + 'static> AreaRepository for EmbeddedAreaRepository<S> {
    async fn create(&self, ctx: &Context, area: Area) -> RepositoryResult<Area> {
        area.validate(ctx)?;
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        let now = Utc::now();
        let area = stamp_new(Area {
            tenant_id: tenant_id.expect("scoped() always returns Some tenant_id"),
            created_at: now,
            updated_at: now,
            ..area
        });
        self.areas.put(area.id, tenant_id, owner_user_id, &area)?;
        Ok(area)
    }

    async fn get(&self, ctx: &Context, id: Uuid) -> RepositoryResult<Area> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.areas.get(id, tenant_id, owner_user_id)
    }

    async fn list_by_location(&self, ctx: &Context, location_id: Uuid) -> RepositoryResult<Vec<Area>> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.areas
            .list_filtered(tenant_id, owner_user_id, |a: &Area| a.location_id == location_id)
    }

    async fn update(&self, ctx: &Context, area: Area) -> RepositoryResult<Area> {
        area.validate(ctx)?;
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.areas.get::<Area>(area.id, tenant_id, owner_user_id)?;
        let area = Area {
            updated_at: Utc::now(),
            ..area
        };
        self.areas.put(area.id, tenant_id, owner_user_id, &area)?;
        Ok(area)
    }

    async fn delete(&self, ctx: &Context, id: Uuid) -> RepositoryResult<()> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.areas.get::<Area>(id, tenant_id, owner_user_id)?;
        let has_commodities = !self
            .commodities
            .list_filtered(tenant_id, owner_user_id, |c: &Commodity| c.area_id == id)?
            .is_empty();
        if has_commodities {
            return Err(RepositoryError::CannotDelete(
                "area has commodities".to_string(),
            ));
        }
        self.areas.delete(id)
    }

    async fn count(&self, ctx: &Context) -> RepositoryResult<u64> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.areas.count(tenant_id, owner_user_id)
    }

    async fn get_commodities(&self, ctx: &Context, area_id: Uuid) -> RepositoryResult<Vec<Commodity>> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.commodities
            .list_filtered(tenant_id, owner_user_id, |c: &Commodity| c.area_id == area_id)
    }

    async fn total_worth(&self, ctx: &Context, area_id: Uuid) -> RepositoryResult<Money> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        let commodities: Vec<Commodity> = self
            .commodities
            .list_filtered(tenant_id, owner_user_id, |c: &Commodity| c.area_id == area_id)?;
        Ok(sum_worth(commodities.iter()))
    }
}

fn sum_worth<'a>(commodities: impl Iterator<Item = &'a Commodity>) -> Money {
    let mut total = BigDecimal::from(0);
    let mut currency: Option<String> = None;
    for c in commodities.filter(|c| c.counts_toward_worth()) {
        total += &c.price * BigDecimal::from(c.count);
        currency.get_or_insert_with(|| c.currency.clone());
    }
    Money {
        amount: total,
        currency: currency.unwrap_or_default(),
    }
}

pub struct EmbeddedCommodityRepository<S: ByteStore> {
    commodities: Arc<RecordStore<S>>,
    files: Arc<RecordStore<S>>,
}

impl<S: ByteStore> EmbeddedCommodityRepository<S> {
    pub fn new(commodities: Arc<RecordStore<S>>, files: Arc<RecordStore<S>>) -> Self {
        Self { commodities, files }
    }
}

#[async_trait]
impl<S: ByteStore + 'static> CommodityRepository for EmbeddedCommodityRepository<S> {
    async fn create(&self, ctx: &Context, commodity: Commodity) -> RepositoryResult<Commodity> {
        commodity.validate(ctx)?;
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        let now = Utc::now();
        let commodity = stamp_new(Commodity {
            tenant_id: tenant_id.expect("scoped() always returns Some tenant_id"),
            created_at: now,
            updated_at: now,
            ..commodity
        });
        self.commodities.put(commodity.id, tenant_id, owner_user_id, &commodity)?;
        Ok(commodity)
    }

    async fn get(&self, ctx: &Context, id: Uuid) -> RepositoryResult<Commodity> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.commodities.get(id, tenant_id, owner_user_id)
    }

    async fn list_by_area(&self, ctx: &Context, area_id: Uuid) -> RepositoryResult<Vec<Commodity>> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.commodities
            .list_filtered(tenant_id, owner_user_id, |c: &Commodity| c.area_id == area_id)
    }

    async fn update(&self, ctx: &Context, commodity: Commodity) -> RepositoryResult<Commodity> {
        commodity.validate(ctx)?;
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.commodities.get::<Commodity>(commodity.id, tenant_id, owner_user_id)?;
        let commodity = Commodity {
            updated_at: Utc::now(),
            ..commodity
        };
        self.commodities.put(commodity.id, tenant_id, owner_user_id, &commodity)?;
        Ok(commodity)
    }

    async fn delete(&self, ctx: &Context, id: Uuid) -> RepositoryResult<()> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.commodities.get::<Commodity>(id, tenant_id, owner_user_id)?;
        let has_files = !self
            .files
            .list_filtered(tenant_id, owner_user_id, |f: &File| f.commodity_id == id)?
            .is_empty();
        if has_files {
            return Err(RepositoryError::CannotDelete(
                "commodity has files".to_string(),
            ));
        }
        self.commodities.delete(id)
    }

    async fn count(&self, ctx: &Context) -> RepositoryResult<u64> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.commodities.count(tenant_id, owner_user_id)
    }

    async fn get_files(&self, ctx: &Context, commodity_id: Uuid) -> RepositoryResult<Vec<File>> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.files
            .list_filtered(tenant_id, owner_user_id, |f: &File| f.commodity_id == commodity_id)
    }

    async fn search_by_name(&self, ctx: &Context, query: &str) -> RepositoryResult<Vec<Commodity>> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        let needle = query.to_lowercase();
        self.commodities
            .list_filtered(tenant_id, owner_user_id, |c: &Commodity| c.name.to_lowercase().contains(&needle))
    }
}

pub struct EmbeddedFileRepository<S: ByteStore> {
    files: Arc<RecordStore<S>>,
}

impl<S: ByteStore> EmbeddedFileRepository<S> {
    pub fn new(files: Arc<RecordStore<S>>) -> Self {
        Self { files }
    }
}

#[async_trait]
impl<S: ByteStore + 'static> FileRepository for EmbeddedFileRepository<S> {
    async fn create(&self, ctx: &Context, file: File) -> RepositoryResult<File> {
        file.validate(ctx)?;
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        let file = stamp_new(File {
            tenant_id: tenant_id.expect("scoped() always returns Some tenant_id"),
            created_at: Utc::now(),
            ..file
        });
        self.files.put(file.id, tenant_id, owner_user_id, &file)?;
        Ok(file)
    }

    async fn get(&self, ctx: &Context, id: Uuid) -> RepositoryResult<File> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.files.get(id, tenant_id, owner_user_id)
    }

    async fn list_by_commodity(&self, ctx: &Context, commodity_id: Uuid) -> RepositoryResult<Vec<File>> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.files
            .list_filtered(tenant_id, owner_user_id, |f: &File| f.commodity_id == commodity_id)
    }

    async fn delete(&self, ctx: &Context, id: Uuid) -> RepositoryResult<()> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.files.get::<File>(id, tenant_id, owner_user_id)?;
        self.files.delete(id)
    }

    async fn count(&self, ctx: &Context) -> RepositoryResult<u64> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.files.count(tenant_id, owner_user_id)
    }
}

pub struct EmbeddedExportRepository<S: ByteStore> {
    exports: Arc<RecordStore<S>>,
}

impl<S: ByteStore> EmbeddedExportRepository<S> {
    pub fn new(exports: Arc<RecordStore<S>>) -> Self {
        Self { exports }
    }
}

#[async_trait]
impl<S: ByteStore + 'static> ExportRepository for EmbeddedExportRepository<S> {
    async fn create(&self, ctx: &Context, export: Export) -> RepositoryResult<Export> {
        export.validate(ctx)?;
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        let now = Utc::now();
        let export = stamp_new(Export {
            tenant_id: tenant_id.expect("scoped() always returns Some tenant_id"),
            created_at: now,
            updated_at: now,
            ..export
        });
        self.exports.put(export.id, tenant_id, owner_user_id, &export)?;
        Ok(export)
    }

    async fn get(&self, ctx: &Context, id: Uuid) -> RepositoryResult<Export> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.exports.get(id, tenant_id, owner_user_id)
    }

    async fn list(&self, ctx: &Context) -> RepositoryResult<Vec<Export>> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.exports.list(tenant_id, owner_user_id)
    }

    async fn transition(
        &self,
        ctx: &Context,
        id: Uuid,
        next: ExportStatus,
        bucket_key: Option<String>,
        error_message: Option<String>,
    ) -> RepositoryResult<Export> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        let mut export: Export = self.exports.get(id, tenant_id, owner_user_id)?;
        export.transition(next)?;
        match next {
            ExportStatus::Completed => {
                export.bucket_key = bucket_key;
                export.error_message = None;
                export.completed_date = Some(Utc::now());
            }
            ExportStatus::Failed => export.error_message = error_message,
            _ => {}
        }
        export.validate(ctx)?;
        export.updated_at = Utc::now();
        self.exports.put(export.id, tenant_id, owner_user_id, &export)?;
        Ok(export)
    }

    async fn count(&self, ctx: &Context) -> RepositoryResult<u64> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.exports.count(tenant_id, owner_user_id)
    }
}

pub struct EmbeddedImportRestoreRepository<S: ByteStore> {
    import_restores: Arc<RecordStore<S>>,
}

impl<S: ByteStore> EmbeddedImportRestoreRepository<S> {
    pub fn new(import_restores: Arc<RecordStore<S>>) -> Self {
        Self { import_restores }
    }
}

#[async_trait]
impl<S: ByteStore + 'static> ImportRestoreRepository for EmbeddedImportRestoreRepository<S> {
    async fn create(&self, ctx: &Context, job: ImportRestore) -> RepositoryResult<ImportRestore> {
        job.validate(ctx)?;
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        let now = Utc::now();
        let job = stamp_new(ImportRestore {
            tenant_id: tenant_id.expect("scoped() always returns Some tenant_id"),
            created_at: now,
            updated_at: now,
            ..job
        });
        self.import_restores.put(job.id, tenant_id, owner_user_id, &job)?;
        Ok(job)
    }

    async fn get(&self, ctx: &Context, id: Uuid) -> RepositoryResult<ImportRestore> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.import_restores.get(id, tenant_id, owner_user_id)
    }

    async fn list(&self, ctx: &Context) -> RepositoryResult<Vec<ImportRestore>> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.import_restores.list(tenant_id, owner_user_id)
    }

    async fn transition(
        &self,
        ctx: &Context,
        id: Uuid,
        next: TransferStatus,
        error_message: Option<String>,
    ) -> RepositoryResult<ImportRestore> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        let mut job: ImportRestore = self.import_restores.get(id, tenant_id, owner_user_id)?;
        job.transition(next)?;
        if next == TransferStatus::Failed {
            job.error_message = error_message;
        }
        job.validate(ctx)?;
        job.updated_at = Utc::now();
        self.import_restores.put(job.id, tenant_id, owner_user_id, &job)?;
        Ok(job)
    }

    async fn count(&self, ctx: &Context) -> RepositoryResult<u64> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.import_restores.count(tenant_id, owner_user_id)
    }
}

/// `acquire_slot` needs a check-then-insert that is atomic under concurrent
/// callers; the relational backend gets this from `SELECT ... FOR UPDATE`,
/// this backend gets it from an explicit mutex guarding the slot table.
pub struct EmbeddedConcurrencySlotRepository<S: ByteStore> {
    slots: Arc<RecordStore<S>>,
    acquire_lock: Mutex<()>,
}

impl<S: ByteStore> EmbeddedConcurrencySlotRepository<S> {
    pub fn new(slots: Arc<RecordStore<S>>) -> Self {
        Self {
            slots,
            acquire_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl<S: ByteStore + 'static> ConcurrencySlotRepository for EmbeddedConcurrencySlotRepository<S> {
    async fn acquire_slot(
        &self,
        ctx: &Context,
        job_kind: &str,
        max_slots: u32,
        ttl: Duration,
    ) -> RepositoryResult<ConcurrencySlot> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        let _guard = self
            .acquire_lock
            .lock()
            .map_err(|_| RepositoryError::Internal("concurrency slot lock poisoned".to_string()))?;
        let now = Utc::now();
        let active = self
            .slots
            .list_filtered(tenant_id, owner_user_id, |s: &ConcurrencySlot| !s.is_expired(now))?
            .len() as u32;
        if active >= max_slots {
            return Err(RepositoryError::ResourceLimitExceeded(format!(
                "user already holds {active} of {max_slots} concurrency slots"
            )));
        }
        let slot = stamp_new(ConcurrencySlot {
            id: Uuid::nil(),
            tenant_id: tenant_id.expect("scoped() always returns Some tenant_id"),
            user_id: owner_user_id.expect("scoped() always returns Some owner_user_id"),
            job_kind: job_kind.to_string(),
            acquired_at: now,
            expires_at: now + ttl,
        });
        self.slots.put(slot.id, tenant_id, owner_user_id, &slot)?;
        Ok(slot)
    }

    async fn release_slot(&self, ctx: &Context, id: Uuid) -> RepositoryResult<()> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.slots.get::<ConcurrencySlot>(id, tenant_id, owner_user_id)?;
        self.slots.delete(id)
    }

    async fn count_active(&self, ctx: &Context) -> RepositoryResult<u32> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        let now = Utc::now();
        Ok(self
            .slots
            .list_filtered(tenant_id, owner_user_id, |s: &ConcurrencySlot| !s.is_expired(now))?
            .len() as u32)
    }

    async fn count(&self, ctx: &Context) -> RepositoryResult<u64> {
        let (tenant_id, owner_user_id) = scoped(ctx)?;
        self.slots.count(tenant_id, owner_user_id)
    }

    async fn cleanup_expired_slots(&self) -> RepositoryResult<u64> {
        let now = Utc::now();
        let expired: Vec<ConcurrencySlot> = self
            .slots
            .list_filtered(None, None, |s: &ConcurrencySlot| s.is_expired(now))?;
        let count = expired.len() as u64;
        for slot in expired {
            self.slots.delete(slot.id)?;
        }
        Ok(count)
    }
}
