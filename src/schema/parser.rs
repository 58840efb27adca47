//! C7 — schema parser: turns entity annotations into the abstract `Schema`.
//!
//! Embedded-field expansion is implemented as the preprocessing pass §9
//! recommends for target languages without struct embedding: `flatten`
//! walks each `TableAnnotation`'s fields and produces a flat `Vec<Column>`
//! before the table is built.

use crate::schema::annotations::{EmbedMode, FieldAnnotation, TableAnnotation};
use crate::schema::dialect::Dialect;
use crate::schema::model::{Column, ColumnType, EnumType, RlsPolicy, Schema, SqlFunction, Table};
use std::collections::BTreeMap;

/// Standard columns every tenant-scoped table carries (§6.2): `id`,
/// `tenant_id`, `user_id`, `created_at`, `updated_at`.
fn base_columns(tenant_scoped: bool) -> Vec<Column> {
    let mut cols = vec![Column::new("id", ColumnType::Uuid)];
    if tenant_scoped {
        cols.push(Column::new("tenant_id", ColumnType::Uuid).references("tenants", "id"));
        cols.push(Column::new("user_id", ColumnType::Uuid).references("users", "id"));
    }
    cols.push(Column::new("created_at", ColumnType::TimestampTz).with_default("now()"));
    cols.push(Column::new("updated_at", ColumnType::TimestampTz).with_default("now()"));
    cols
}

/// Recursively flattens embedded fields into a flat column list, applying
/// each embed mode per §4.7.
fn flatten(fields: &[FieldAnnotation], dialect: Dialect) -> Vec<Column> {
    let mut out = Vec::new();
    for field in fields {
        match field {
            FieldAnnotation::Column(col) => out.push(col.clone()),
            FieldAnnotation::Embed { mode, fields } => match mode {
                EmbedMode::Skip => {}
                EmbedMode::Inline { prefix } => {
                    for mut col in flatten(fields, dialect) {
                        if let Some(prefix) = prefix {
                            col.name = format!("{prefix}{}", col.name);
                        }
                        out.push(col);
                    }
                }
                EmbedMode::Json { column_name } => {
                    let col_type = if dialect == Dialect::Tabular {
                        ColumnType::Text
                    } else {
                        ColumnType::Json
                    };
                    out.push(Column::new(column_name.clone(), col_type).nullable());
                }
                EmbedMode::Relation {
                    column_name,
                    references_table,
                } => {
                    out.push(
                        Column::new(column_name.clone(), ColumnType::Uuid)
                            .references(references_table.clone(), "id"),
                    );
                }
            },
        }
    }
    out
}

fn apply_platform_overrides(columns: &mut [Column], annotation: &TableAnnotation, dialect: Dialect) {
    for over in &annotation.platform_overrides {
        if over.dialect != dialect {
            continue;
        }
        if let Some(col) = columns.iter_mut().find(|c| c.name == over.column_name)
            && let Some(new_type) = &over.override_type
        {
            col.col_type = new_type.clone();
        }
    }
}

fn build_table(annotation: &TableAnnotation, dialect: Dialect) -> Table {
    let mut columns = base_columns(annotation.tenant_scoped);
    columns.extend(flatten(&annotation.fields, dialect));
    apply_platform_overrides(&mut columns, annotation, dialect);

    let mut table = Table::new(annotation.table_name.clone());
    table.columns = columns;
    table.indexes = annotation.indexes.clone();
    table.rls_policies = annotation.rls_policies();
    table.rls_enabled = !table.rls_policies.is_empty();
    table
}

/// Parses a set of entity annotations plus the globally-declared enum types
/// and custom functions into one abstract `Schema`, for the given dialect.
pub fn parse_schema(
    annotations: &[TableAnnotation],
    enums: &[EnumType],
    functions: &[SqlFunction],
    dialect: Dialect,
) -> Schema {
    let mut schema = Schema::new();
    for e in enums {
        schema.add_enum(e.clone());
    }
    for f in functions {
        schema.add_function(f.clone());
    }
    let mut tables = BTreeMap::new();
    for annotation in annotations {
        tables.insert(annotation.table_name.clone(), build_table(annotation, dialect));
    }
    schema.tables = tables;
    schema
}

/// The two session-variable reader functions every tenant-aware policy
/// references (§4.4.2). Declared as schema-level functions so the renderer
/// emits them once, ahead of any table that depends on them.
pub fn session_functions() -> Vec<SqlFunction> {
    vec![
        SqlFunction {
            name: "current_tenant_id".to_string(),
            body: "current_setting('app.current_tenant_id', true)".to_string(),
        },
        SqlFunction {
            name: "current_user_id".to_string(),
            body: "current_setting('app.current_user_id', true)".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::model::Index;

    #[test]
    fn tenant_scoped_table_carries_standard_columns() {
        let annotation = TableAnnotation::new("locations")
            .column(Column::new("name", ColumnType::Text))
            .index(Index::new("locations_name_idx", "locations", vec!["name".to_string()]));
        let schema = parse_schema(&[annotation], &[], &[], Dialect::Postgres);
        let table = schema.tables.get("locations").unwrap();
        assert!(table.column_named("tenant_id").is_some());
        assert!(table.column_named("user_id").is_some());
        assert!(table.column_named("name").is_some());
        assert_eq!(table.rls_policies, vec![RlsPolicy::TenantUserScoped, RlsPolicy::BackgroundBypass]);
    }

    #[test]
    fn non_tenant_scoped_table_has_no_rls() {
        let annotation = TableAnnotation::new("tenants")
            .not_tenant_scoped()
            .column(Column::new("slug", ColumnType::Text));
        let schema = parse_schema(&[annotation], &[], &[], Dialect::Postgres);
        let table = schema.tables.get("tenants").unwrap();
        assert!(!table.rls_enabled);
        assert!(table.column_named("tenant_id").is_none());
    }

    #[test]
    fn inline_embed_prefixes_columns() {
        let annotation = TableAnnotation::new("locations").embed(
            EmbedMode::Inline {
                prefix: Some("address_".to_string()),
            },
            vec![FieldAnnotation::Column(Column::new("line1", ColumnType::Text))],
        );
        let schema = parse_schema(&[annotation], &[], &[], Dialect::Postgres);
        let table = schema.tables.get("locations").unwrap();
        assert!(table.column_named("address_line1").is_some());
    }

    #[test]
    fn json_embed_uses_text_on_tabular_dialect() {
        let annotation = TableAnnotation::new("commodities").embed(
            EmbedMode::Json {
                column_name: "tags".to_string(),
            },
            vec![],
        );
        let pg = parse_schema(&[annotation.clone()], &[], &[], Dialect::Postgres);
        let tabular = parse_schema(&[annotation], &[], &[], Dialect::Tabular);
        assert_eq!(
            pg.tables["commodities"].column_named("tags").unwrap().col_type,
            ColumnType::Json
        );
        assert_eq!(
            tabular.tables["commodities"].column_named("tags").unwrap().col_type,
            ColumnType::Text
        );
    }
}
