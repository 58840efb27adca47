//! Relational (Postgres + RLS) implementations of every repository trait
//! (C4). Each repository holds only the shared pool; the isolation
//! mechanism lives entirely in the session-variable discipline from
//! `backend::relational::session`, not in per-repository state.

pub mod area;
pub mod commodity;
pub mod concurrency_slot;
pub mod export;
pub mod file;
pub mod import_restore;
pub mod location;
pub mod tenant;
pub mod user;

pub use area::RelationalAreaRepository;
pub use commodity::RelationalCommodityRepository;
pub use concurrency_slot::RelationalConcurrencySlotRepository;
pub use export::RelationalExportRepository;
pub use file::RelationalFileRepository;
pub use import_restore::RelationalImportRestoreRepository;
pub use location::RelationalLocationRepository;
pub use tenant::RelationalTenantRepository;
pub use user::RelationalUserRepository;
