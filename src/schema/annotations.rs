//! The declarative annotation vocabulary entity types attach to themselves,
//! consumed by the schema parser (C7). In the reference implementation this
//! is a struct-tag language; here each entity type provides a
//! `TableAnnotation` value through the `Annotated` trait instead of a
//! derive macro, which keeps the parser a plain data transform over values
//! it can unit test without a compiler pass.

use crate::schema::model::{Column, Index, RlsPolicy};

/// How an embedded field expands into the outer table (§4.7).
#[derive(Debug, Clone, PartialEq)]
pub enum EmbedMode {
    /// The referenced type's columns are expanded into the outer table,
    /// optionally prefixed (e.g. `billing_address_line1`).
    Inline { prefix: Option<String> },
    /// The referenced type is serialized into a single JSON column. A
    /// per-dialect override may change the column type away from `Json`.
    Json { column_name: String },
    /// A foreign-key column referencing another table.
    Relation { column_name: String, references_table: String },
    /// Ignored entirely by the schema parser.
    Skip,
}

/// A field-level override for a specific dialect, applied after the
/// platform-neutral column is built.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformOverride {
    pub dialect: crate::schema::dialect::Dialect,
    pub column_name: String,
    pub override_type: Option<crate::schema::model::ColumnType>,
}

/// One declared column, index, or embedded-field expansion, as an entity
/// type would express it through annotations.
#[derive(Debug, Clone)]
pub enum FieldAnnotation {
    Column(Column),
    Embed {
        mode: EmbedMode,
        fields: Vec<FieldAnnotation>,
    },
}

/// The full annotation set for one entity type — the thing C7 parses.
#[derive(Debug, Clone)]
pub struct TableAnnotation {
    pub table_name: String,
    pub fields: Vec<FieldAnnotation>,
    pub indexes: Vec<Index>,
    pub tenant_scoped: bool,
    pub platform_overrides: Vec<PlatformOverride>,
}

impl TableAnnotation {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            fields: Vec::new(),
            indexes: Vec::new(),
            tenant_scoped: true,
            platform_overrides: Vec::new(),
        }
    }

    pub fn column(mut self, column: Column) -> Self {
        self.fields.push(FieldAnnotation::Column(column));
        self
    }

    pub fn embed(mut self, mode: EmbedMode, fields: Vec<FieldAnnotation>) -> Self {
        self.fields.push(FieldAnnotation::Embed { mode, fields });
        self
    }

    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn not_tenant_scoped(mut self) -> Self {
        self.tenant_scoped = false;
        self
    }

    pub fn rls_policies(&self) -> Vec<RlsPolicy> {
        if self.tenant_scoped {
            vec![RlsPolicy::TenantUserScoped, RlsPolicy::BackgroundBypass]
        } else {
            Vec::new()
        }
    }
}

/// Implemented by every persisted entity type (C2) to expose its schema
/// annotations to the parser.
pub trait Annotated {
    fn table_annotation() -> TableAnnotation;
}
