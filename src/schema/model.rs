//! The abstract schema (C7's output / C8's comparison target): tables,
//! columns, indexes, enums, RLS policies, and functions, independent of any
//! rendering dialect.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColumnType {
    Uuid,
    Text,
    Boolean,
    Integer,
    BigInt,
    Numeric { precision: u8, scale: u8 },
    TimestampTz,
    Json,
    Enum(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
    pub on_delete_cascade: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub col_type: ColumnType,
    pub nullable: bool,
    pub default: Option<String>,
    pub check: Option<String>,
    pub foreign_key: Option<ForeignKey>,
    pub comment: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, col_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            col_type,
            nullable: false,
            default: None,
            check: None,
            foreign_key: None,
            comment: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign_key = Some(ForeignKey {
            table: table.into(),
            column: column.into(),
            on_delete_cascade: true,
        });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    BTree,
    Gin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub unique: bool,
    pub kind: IndexKind,
    pub partial_predicate: Option<String>,
    pub operator_class: Option<String>,
}

impl Index {
    pub fn new(name: impl Into<String>, table: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            columns,
            unique: false,
            kind: IndexKind::BTree,
            partial_predicate: None,
            operator_class: None,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn gin(mut self) -> Self {
        self.kind = IndexKind::Gin;
        self
    }
}

/// The row-level-security predicate for one table (§4.4.2). The core
/// renders exactly the two policy shapes the spec fixes: the tenant/user
/// scoped policy, and the background-role bypass policy.
#[derive(Debug, Clone, PartialEq)]
pub enum RlsPolicy {
    TenantUserScoped,
    BackgroundBypass,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
    pub rls_enabled: bool,
    pub rls_policies: Vec<RlsPolicy>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
            rls_enabled: false,
            rls_policies: Vec::new(),
        }
    }

    pub fn with_tenant_isolation(mut self) -> Self {
        self.rls_enabled = true;
        self.rls_policies = vec![RlsPolicy::TenantUserScoped, RlsPolicy::BackgroundBypass];
        self
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn column_named(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlFunction {
    pub name: String,
    pub body: String,
}

/// The full, dialect-independent schema produced by the parser (C7) and
/// compared against the live database by the differ (C8).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub tables: BTreeMap<String, Table>,
    pub enums: BTreeMap<String, EnumType>,
    pub functions: BTreeMap<String, SqlFunction>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    pub fn add_enum(&mut self, e: EnumType) {
        self.enums.insert(e.name.clone(), e);
    }

    pub fn add_function(&mut self, f: SqlFunction) {
        self.functions.insert(f.name.clone(), f);
    }
}
