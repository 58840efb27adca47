/// The two dialects the SQL renderer (C10) supports (§4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// The reference relational implementation (PostgreSQL-flavoured DDL).
    Postgres,
    /// A second, more restrictive tabular dialect (no enum types, no GIN
    /// indexes, no partial indexes) — exercises the renderer's
    /// warning-comment discipline for unsupported constructs.
    Tabular,
}
