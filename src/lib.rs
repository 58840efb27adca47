//! Palisade core: the data-access and tenancy enforcement engine of a
//! multi-tenant inventory management service (SPEC_FULL.md). Identity
//! propagation (C1), the entity model (C2), and the repository contract
//! (C3) are backend-agnostic; three backends (C4 relational with RLS, C5
//! embedded KV, C6 in-memory) implement that contract, and a schema
//! migration pipeline (C7-C10) keeps the relational backend's live schema
//! in sync with the entity annotations.

pub mod app;
pub mod backend;
pub mod blob;
pub mod entity;
pub mod error;
pub mod identity;
pub mod mail;
pub mod repository;
pub mod schema;
pub mod types;
