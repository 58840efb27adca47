//! Typed error sentinels shared by every repository, backend, and the schema
//! migration engine. No driver-specific type (`sqlx::Error`,
//! `sqlx::migrate::MigrateError`, `sled::Error`) is ever exposed past this
//! module's boundary — see §7 of the spec.

use thiserror::Error;

/// Errors a repository method can return, regardless of backend.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    #[error("field is required: {0}")]
    FieldRequired(String),

    #[error("cannot delete: {0}")]
    CannotDelete(String),

    #[error("resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("identity is required for this operation")]
    IdentityMissing,

    #[error("operation was cancelled")]
    Cancelled,

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    /// True when this error originated from a unique-constraint violation
    /// mapped by the backend into `Conflict`.
    pub fn is_conflict(&self) -> bool {
        matches!(self, RepositoryError::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound)
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::Conflict(db_err.message().to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
                RepositoryError::BackendUnavailable(err.to_string())
            }
            _ => RepositoryError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for RepositoryError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        RepositoryError::Internal(err.to_string())
    }
}

impl From<sled::Error> for RepositoryError {
    fn from(err: sled::Error) -> Self {
        RepositoryError::BackendUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Internal(err.to_string())
    }
}

/// Errors raised while parsing entity annotations, diffing schemas, planning
/// DDL, or rendering SQL (C7-C10).
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("duplicate table declaration: {0}")]
    DuplicateTable(String),

    #[error("unknown foreign key target: {table} references undeclared table {target}")]
    UnknownForeignKeyTarget { table: String, target: String },

    #[error("dependency cycle detected among tables: {0:?}")]
    DependencyCycle(Vec<String>),

    #[error("dialect does not support construct: {0}")]
    UnsupportedConstruct(String),

    #[error("database introspection failed: {0}")]
    Introspection(String),
}

pub type SchemaResult<T> = Result<T, SchemaError>;

impl From<sqlx::Error> for SchemaError {
    fn from(err: sqlx::Error) -> Self {
        SchemaError::Introspection(err.to_string())
    }
}

/// Configuration loading errors, surfaced at process startup only.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Source(#[from] config::ConfigError),

    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}
