//! C3 — the repository contract: one trait per entity, each implemented by
//! every backend (C4 relational, C5 embedded KV, C6 in-memory) behind the
//! same `RepositoryError` semantics, plus the factory (§4.3) that hands out
//! user-scoped or service-scoped instances.

pub mod area;
pub mod commodity;
pub mod concurrency_slot;
pub mod export;
pub mod factory;
pub mod file;
pub mod import_restore;
pub mod location;
pub mod tenant;
pub mod user;

pub use area::AreaRepository;
pub use commodity::CommodityRepository;
pub use concurrency_slot::ConcurrencySlotRepository;
pub use export::ExportRepository;
pub use factory::{RepositoryFactory, ServiceRegistry, UserRegistry};
pub use file::FileRepository;
pub use import_restore::ImportRestoreRepository;
pub use location::LocationRepository;
pub use tenant::TenantRepository;
pub use user::UserRepository;
