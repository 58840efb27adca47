//! Blob storage boundary (§6.5): the core reads and writes file/export/
//! import-restore payloads through this trait without knowing whether the
//! bytes end up on a local filesystem, an object store, or cloud storage.
//! The core never parses or validates a bucket location string beyond
//! handing it to `open_bucket`.

use crate::identity::Context;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("unrecognised bucket location: {0}")]
    UnrecognisedLocation(String),

    #[error("blob backend unavailable: {0}")]
    BackendUnavailable(String),
}

pub type BlobResult<T> = Result<T, BlobError>;

/// A writer for one blob key. Dropping it without calling `close` on the
/// owning bucket leaves delivery undefined, matching the teacher's own
/// "runner owns the lifetime of its output" pattern for background jobs.
pub type BlobWriter = Box<dyn AsyncWrite + Send + Unpin>;
pub type BlobReader = Box<dyn AsyncRead + Send + Unpin>;

/// One opened bucket, scoped to a single location descriptor (scheme+path;
/// filesystem, two object-store variants, and cloud storage schemes are
/// recognised — the core itself never inspects the scheme beyond routing it
/// to whichever `BlobBucket` impl the caller installed).
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BlobBucket: Send + Sync {
    async fn new_writer(&self, ctx: &Context, key: &str) -> BlobResult<BlobWriter>;
    async fn reader(&self, ctx: &Context, key: &str) -> BlobResult<BlobReader>;
    async fn delete(&self, ctx: &Context, key: &str) -> BlobResult<()>;
    async fn close(&self) -> BlobResult<()>;
}

/// Opens a bucket from a URL-like location descriptor. Implemented outside
/// this crate per entity (§1 Non-goals: no blob implementation here).
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BlobBucketOpener: Send + Sync {
    async fn open_bucket(&self, location: &str) -> BlobResult<Box<dyn BlobBucket>>;
}
