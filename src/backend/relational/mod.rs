//! C4 — the relational backend: a single shared Postgres pool, RLS enforced
//! through session-local variables (§4.4), and the generic typed store
//! (§4.4.4) entity repositories delegate common CRUD shapes to.

pub mod factory;
pub mod pool;
pub mod repository;
pub mod session;
pub mod store;

pub use factory::RelationalRepositoryFactory;
pub use pool::{ConnectionTester, PgConnectionTester, PgPoolManager, PgPoolManagerTrait};
