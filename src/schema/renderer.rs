//! C10 — SQL renderer: a visitor over `DdlNode`s that emits dialect-specific
//! SQL (§4.10). Each dialect implements every node type; constructs a
//! dialect cannot express produce a warning comment rather than a silent
//! no-op.

use crate::schema::differ::ColumnChange;
use crate::schema::dialect::Dialect;
use crate::schema::model::{Column, ColumnType, Index, IndexKind, RlsPolicy, Table};
use crate::schema::planner::{DdlNode, MigrationPlan};

pub trait SqlRenderer {
    fn dialect(&self) -> Dialect;
    fn render_node(&self, node: &DdlNode) -> String;

    fn render_plan(&self, plan: &MigrationPlan) -> String {
        plan.nodes
            .iter()
            .map(|n| self.render_node(n))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn column_type_sql(col_type: &ColumnType, dialect: Dialect) -> String {
    match col_type {
        ColumnType::Uuid => "UUID".to_string(),
        ColumnType::Text => "TEXT".to_string(),
        ColumnType::Boolean => "BOOLEAN".to_string(),
        ColumnType::Integer => "INTEGER".to_string(),
        ColumnType::BigInt => "BIGINT".to_string(),
        ColumnType::Numeric { precision, scale } => format!("NUMERIC({precision},{scale})"),
        ColumnType::TimestampTz => {
            if dialect == Dialect::Tabular {
                "TIMESTAMP".to_string()
            } else {
                "TIMESTAMPTZ".to_string()
            }
        }
        ColumnType::Json => {
            if dialect == Dialect::Tabular {
                "TEXT".to_string()
            } else {
                "JSONB".to_string()
            }
        }
        ColumnType::Enum(name) => {
            if dialect == Dialect::Tabular {
                "TEXT".to_string()
            } else {
                name.clone()
            }
        }
    }
}

fn column_def_sql(column: &Column, dialect: Dialect) -> String {
    let mut sql = format!(
        "{} {}",
        column.name,
        column_type_sql(&column.col_type, dialect)
    );
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if let Some(default) = &column.default {
        sql.push_str(&format!(" DEFAULT {default}"));
    }
    if let Some(check) = &column.check {
        sql.push_str(&format!(" CHECK ({check})"));
    }
    if let Some(fk) = &column.foreign_key {
        sql.push_str(&format!(" REFERENCES {}({})", fk.table, fk.column));
        if fk.on_delete_cascade {
            sql.push_str(" ON DELETE CASCADE");
        }
    }
    sql
}

fn create_table_sql(table: &Table, dialect: Dialect) -> String {
    let columns = table
        .columns
        .iter()
        .map(|c| format!("    {}", column_def_sql(c, dialect)))
        .collect::<Vec<_>>()
        .join(",\n");
    let mut sql = format!(
        "CREATE TABLE {} (\n{},\n    PRIMARY KEY (id)\n);",
        table.name, columns
    );
    if table.rls_enabled {
        sql.push_str(&format!("\nALTER TABLE {} ENABLE ROW LEVEL SECURITY;", table.name));
        for policy in &table.rls_policies {
            sql.push('\n');
            sql.push_str(&rls_policy_sql(&table.name, policy, dialect));
        }
    }
    sql
}

fn rls_policy_sql(table: &str, policy: &RlsPolicy, dialect: Dialect) -> String {
    if dialect == Dialect::Tabular {
        return format!(
            "-- WARNING: row-level security is not supported by this dialect; \
             isolation for {table} must be enforced in application code"
        );
    }
    match policy {
        RlsPolicy::TenantUserScoped => format!(
            "CREATE POLICY {table}_tenant_isolation ON {table}\n\
             USING (tenant_id = current_tenant_id()::uuid AND current_tenant_id() <> ''\n\
             AND user_id = current_user_id()::uuid AND current_user_id() <> '')\n\
             WITH CHECK (tenant_id = current_tenant_id()::uuid AND current_tenant_id() <> ''\n\
             AND user_id = current_user_id()::uuid AND current_user_id() <> '');"
        ),
        RlsPolicy::BackgroundBypass => format!(
            "CREATE POLICY {table}_background_bypass ON {table}\n\
             TO background_role USING (true) WITH CHECK (true);"
        ),
    }
}

fn index_sql(index: &Index, dialect: Dialect) -> String {
    if index.kind == IndexKind::Gin && dialect == Dialect::Tabular {
        return format!(
            "-- WARNING: GIN indexes are not supported by this dialect; \
             index {} on {} was skipped",
            index.name, index.table
        );
    }
    let unique = if index.unique { "UNIQUE " } else { "" };
    let using = match index.kind {
        IndexKind::Gin => " USING gin",
        IndexKind::BTree => "",
    };
    let cols = if let Some(op_class) = &index.operator_class {
        index
            .columns
            .iter()
            .map(|c| format!("{c} {op_class}"))
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        index.columns.join(", ")
    };
    let mut sql = format!(
        "CREATE {unique}INDEX {} ON {}{using} ({cols})",
        index.name, index.table
    );
    if let Some(predicate) = &index.partial_predicate {
        sql.push_str(&format!(" WHERE {predicate}"));
    }
    sql.push(';');
    sql
}

fn column_change_sql(table: &str, change: &ColumnChange) -> String {
    match change.attribute {
        "type" => format!(
            "ALTER TABLE {table} ALTER COLUMN {} TYPE {};",
            change.column, change.after
        ),
        "nullable" => {
            if change.after == "true" {
                format!("ALTER TABLE {table} ALTER COLUMN {} DROP NOT NULL;", change.column)
            } else {
                format!("ALTER TABLE {table} ALTER COLUMN {} SET NOT NULL;", change.column)
            }
        }
        "default" => {
            if change.after.is_empty() {
                format!("ALTER TABLE {table} ALTER COLUMN {} DROP DEFAULT;", change.column)
            } else {
                format!(
                    "ALTER TABLE {table} ALTER COLUMN {} SET DEFAULT {};",
                    change.column, change.after
                )
            }
        }
        other => format!("-- unsupported column attribute change: {other}"),
    }
}

pub struct PostgresRenderer;
pub struct TabularRenderer;

impl SqlRenderer for PostgresRenderer {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn render_node(&self, node: &DdlNode) -> String {
        render_common(node, Dialect::Postgres)
    }
}

impl SqlRenderer for TabularRenderer {
    fn dialect(&self) -> Dialect {
        Dialect::Tabular
    }

    fn render_node(&self, node: &DdlNode) -> String {
        render_common(node, Dialect::Tabular)
    }
}

fn render_common(node: &DdlNode, dialect: Dialect) -> String {
    match node {
        DdlNode::Comment(text) => format!("-- {text}"),
        DdlNode::CreateEnum(e) => {
            if dialect == Dialect::Tabular {
                format!(
                    "-- WARNING: enum types are not supported by this dialect; {} \
                     will be stored as TEXT with values {:?}",
                    e.name, e.values
                )
            } else {
                let values = e
                    .values
                    .iter()
                    .map(|v| format!("'{v}'"))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("CREATE TYPE {} AS ENUM ({values});", e.name)
            }
        }
        DdlNode::AlterEnumAddValue { enum_name, value } => {
            if dialect == Dialect::Tabular {
                format!(
                    "-- WARNING: cannot add value '{value}' to enum {enum_name} on this dialect"
                )
            } else {
                format!("ALTER TYPE {enum_name} ADD VALUE '{value}';")
            }
        }
        DdlNode::CreateTable(table) => create_table_sql(table, dialect),
        DdlNode::AddColumn { table, column } => format!(
            "ALTER TABLE {table} ADD COLUMN {};",
            column_def_sql(column, dialect)
        ),
        DdlNode::ModifyColumn { table, change } => column_change_sql(table, change),
        DdlNode::DropColumn { table, column } => {
            format!("ALTER TABLE {table} DROP COLUMN {column};")
        }
        DdlNode::CreateIndex(index) => index_sql(index, dialect),
        DdlNode::DropIndex { table, name } => {
            let _ = table;
            format!("DROP INDEX IF EXISTS {name};")
        }
        DdlNode::DropTable { name } => format!("DROP TABLE IF EXISTS {name} CASCADE;"),
        DdlNode::DropEnum { name } => format!("DROP TYPE IF EXISTS {name} CASCADE;"),
    }
}

pub fn renderer_for(dialect: Dialect) -> Box<dyn SqlRenderer> {
    match dialect {
        Dialect::Postgres => Box::new(PostgresRenderer),
        Dialect::Tabular => Box::new(TabularRenderer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::model::{Column, ColumnType, EnumType};

    #[test]
    fn create_table_renders_rls_policies() {
        let table = Table::new("locations")
            .column(Column::new("tenant_id", ColumnType::Uuid))
            .column(Column::new("user_id", ColumnType::Uuid))
            .with_tenant_isolation();
        let sql = PostgresRenderer.render_node(&DdlNode::CreateTable(table));
        assert!(sql.contains("ENABLE ROW LEVEL SECURITY"));
        assert!(sql.contains("locations_tenant_isolation"));
        assert!(sql.contains("locations_background_bypass"));
    }

    #[test]
    fn tabular_dialect_warns_on_enum() {
        let e = EnumType {
            name: "status".to_string(),
            values: vec!["in_use".to_string()],
        };
        let sql = TabularRenderer.render_node(&DdlNode::CreateEnum(e));
        assert!(sql.starts_with("-- WARNING"));
    }

    #[test]
    fn tabular_dialect_warns_on_gin_index() {
        let idx = Index::new("commodities_tags_gin", "commodities", vec!["tags".to_string()]).gin();
        let sql = TabularRenderer.render_node(&DdlNode::CreateIndex(idx));
        assert!(sql.starts_with("-- WARNING"));
    }

    #[test]
    fn postgres_dialect_renders_gin_index() {
        let idx = Index::new("commodities_tags_gin", "commodities", vec!["tags".to_string()]).gin();
        let sql = PostgresRenderer.render_node(&DdlNode::CreateIndex(idx));
        assert!(sql.contains("USING gin"));
    }

    #[test]
    fn drop_table_always_cascades_and_uses_if_exists() {
        let sql = PostgresRenderer.render_node(&DdlNode::DropTable {
            name: "legacy".to_string(),
        });
        assert_eq!(sql, "DROP TABLE IF EXISTS legacy CASCADE;");
    }
}
