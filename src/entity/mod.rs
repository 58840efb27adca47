//! C2 — the entity model: the hierarchical domain (Tenant→User→Location→
//! Area→Commodity→File) plus the background-job entities (Export,
//! Import/Restore, ConcurrencySlot), each with an identifier, a validation
//! contract that takes the identity context, and a schema annotation set
//! consumed by the parser (C7).

pub mod area;
pub mod commodity;
pub mod concurrency_slot;
pub mod export;
pub mod file;
pub mod import_restore;
pub mod location;
pub mod tenant;
pub mod user;

pub use area::Area;
pub use commodity::{Commodity, CommodityStatus};
pub use concurrency_slot::ConcurrencySlot;
pub use export::{Export, ExportStatus};
pub use file::{File, FileKind};
pub use import_restore::{ImportRestore, TransferKind, TransferStatus};
pub use location::Location;
pub use tenant::{Tenant, TenantStatus};
pub use user::{Role, User};

use crate::error::RepositoryResult;
use crate::identity::Context;
use uuid::Uuid;

/// Every persisted entity exposes its identifier through this trait so
/// generic store code (§4.4.4) can assign and read it without knowing the
/// concrete type.
pub trait Identifiable {
    fn id(&self) -> Uuid;
    fn set_id(&mut self, id: Uuid);
}

/// Validation takes the identity context because some validators consult
/// tenant or user identity (§4.2) — e.g. uniqueness scoped to the caller's
/// tenant.
pub trait Validatable {
    fn validate(&self, ctx: &Context) -> RepositoryResult<()>;
}
