//! The three backend implementations of the repository contract (C3):
//! relational (C4, Postgres + RLS), embedded KV (C5, sled), and in-memory
//! (C6, for tests). `embedded_repository` and `shared` hold the logic the
//! latter two share; `relational` is independent since it enforces
//! isolation through the database itself rather than in-application
//! filtering.

mod embedded_repository;
pub mod kv;
pub mod memory;
pub mod relational;
pub mod shared;
