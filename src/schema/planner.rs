//! C9 — migration planner: turns a `SchemaDiff` into a dependency-safe,
//! ordered sequence of DDL AST nodes (§4.9). The renderer (C10) is the only
//! component that turns these nodes into text.

use crate::error::{SchemaError, SchemaResult};
use crate::schema::differ::{ColumnChange, SchemaDiff};
use crate::schema::model::{Column, EnumType, Index, Table};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub enum DdlNode {
    Comment(String),
    CreateEnum(EnumType),
    AlterEnumAddValue { enum_name: String, value: String },
    CreateTable(Table),
    AddColumn { table: String, column: Column },
    ModifyColumn { table: String, change: ColumnChange },
    DropColumn { table: String, column: String },
    CreateIndex(Index),
    DropIndex { table: String, name: String },
    DropTable { name: String },
    DropEnum { name: String },
}

/// An ordered migration plan. Each node executes in sequence; the caller
/// (the migration runner) groups them into transactional steps — the
/// planner itself only fixes the order, not the transaction boundaries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationPlan {
    pub nodes: Vec<DdlNode>,
}

impl MigrationPlan {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Topologically sorts `tables` by foreign-key dependency so a referenced
/// table is always created before the table that references it.
fn topo_sort_tables(tables: &[Table]) -> SchemaResult<Vec<Table>> {
    let by_name: HashMap<&str, &Table> = tables.iter().map(|t| (t.name.as_str(), t)).collect();
    let mut visited: HashSet<String> = HashSet::new();
    let mut in_progress: HashSet<String> = HashSet::new();
    let mut ordered: Vec<Table> = Vec::new();

    fn visit(
        name: &str,
        by_name: &HashMap<&str, &Table>,
        visited: &mut HashSet<String>,
        in_progress: &mut HashSet<String>,
        ordered: &mut Vec<Table>,
    ) -> SchemaResult<()> {
        if visited.contains(name) {
            return Ok(());
        }
        let Some(table) = by_name.get(name) else {
            // Foreign key points outside the set of tables being created in
            // this plan (e.g. it already exists) — nothing to order against.
            return Ok(());
        };
        if in_progress.contains(name) {
            return Err(SchemaError::DependencyCycle(vec![name.to_string()]));
        }
        in_progress.insert(name.to_string());
        for column in &table.columns {
            if let Some(fk) = &column.foreign_key
                && fk.table != name
            {
                visit(&fk.table, by_name, visited, in_progress, ordered)?;
            }
        }
        in_progress.remove(name);
        visited.insert(name.to_string());
        ordered.push((*table).clone());
        Ok(())
    }

    let mut names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    names.sort();
    for name in names {
        visit(name, &by_name, &mut visited, &mut in_progress, &mut ordered)?;
    }
    Ok(ordered)
}

/// Plans the ordered DDL sequence for `diff`, per the eight-step order in
/// §4.9. Destructive or irreversible steps are always preceded by a
/// `Comment` node.
pub fn plan(diff: &SchemaDiff) -> SchemaResult<MigrationPlan> {
    let mut nodes = Vec::new();

    // 1. Create new enum types.
    let mut enum_names = diff.enums_added.clone();
    enum_names.sort();
    for name in &enum_names {
        // The caller supplies the full `EnumType` via enums_modified/added
        // lookups in practice; the planner works purely off names plus the
        // diff's own added-enum bookkeeping, so the full definition is
        // threaded through a companion lookup built by the caller. See
        // `plan_with_schema` for the variant used by the migration runner.
        nodes.push(DdlNode::CreateEnum(EnumType {
            name: name.clone(),
            values: Vec::new(),
        }));
    }

    // 2. Add values to existing enums; removing values only gets a warning.
    for (name, enum_diff) in &diff.enums_modified {
        for value in &enum_diff.values_added {
            nodes.push(DdlNode::AlterEnumAddValue {
                enum_name: name.clone(),
                value: value.clone(),
            });
        }
        if !enum_diff.values_removed.is_empty() {
            nodes.push(DdlNode::Comment(format!(
                "WARNING: enum {name} lost values {:?}; removing enum values requires \
                 recreating the type and is not done automatically",
                enum_diff.values_removed
            )));
        }
    }

    // 3. Create new tables in dependency order.
    for table in topo_sort_tables(&diff.tables_added)? {
        nodes.push(DdlNode::CreateTable(table));
    }

    // 4. Modify tables: add columns, modify columns, drop columns (warned).
    let mut modified: Vec<_> = diff.tables_modified.clone();
    modified.sort_by(|a, b| a.0.cmp(&b.0));
    for (table, table_diff) in &modified {
        for column in &table_diff.columns_added {
            nodes.push(DdlNode::AddColumn {
                table: table.clone(),
                column: column.clone(),
            });
        }
        for change in &table_diff.columns_modified {
            nodes.push(DdlNode::ModifyColumn {
                table: table.clone(),
                change: change.clone(),
            });
        }
        for column in &table_diff.columns_removed {
            nodes.push(DdlNode::Comment(format!(
                "WARNING: dropping column {}.{} — this discards data",
                table, column.name
            )));
            nodes.push(DdlNode::DropColumn {
                table: table.clone(),
                column: column.name.clone(),
            });
        }
    }

    // 5. Create new indexes.
    for (table, table_diff) in &modified {
        for index in &table_diff.indexes_added {
            let _ = table;
            nodes.push(DdlNode::CreateIndex(index.clone()));
        }
    }
    for table in &diff.tables_added {
        for index in &table.indexes {
            nodes.push(DdlNode::CreateIndex(index.clone()));
        }
    }

    // 6. Drop removed indexes.
    for (table, table_diff) in &modified {
        for index in &table_diff.indexes_removed {
            nodes.push(DdlNode::DropIndex {
                table: table.clone(),
                name: index.name.clone(),
            });
        }
    }

    // 7. Drop removed tables (warned, cascade).
    let mut removed_tables = diff.tables_removed.clone();
    removed_tables.sort_by(|a, b| a.name.cmp(&b.name));
    for table in removed_tables {
        nodes.push(DdlNode::Comment(format!(
            "WARNING: dropping table {} — this discards all its data",
            table.name
        )));
        nodes.push(DdlNode::DropTable { name: table.name });
    }

    // 8. Drop removed enums (warned, cascade).
    let mut removed_enums = diff.enums_removed.clone();
    removed_enums.sort();
    for name in removed_enums {
        nodes.push(DdlNode::Comment(format!(
            "WARNING: dropping enum {name} — any column still using it will fail"
        )));
        nodes.push(DdlNode::DropEnum { name });
    }

    Ok(MigrationPlan { nodes })
}

/// Same ordering as `plan`, but takes the full desired schema so
/// `CreateEnum` nodes carry their declared values instead of an empty
/// placeholder. This is the variant the migration runner actually calls;
/// `plan` is kept for differs that only have a diff, not the full schema
/// (e.g. `--check`, which never needs to render enum bodies).
pub fn plan_with_schema(
    diff: &SchemaDiff,
    desired: &crate::schema::model::Schema,
) -> SchemaResult<MigrationPlan> {
    let mut migration = plan(diff)?;
    for node in &mut migration.nodes {
        if let DdlNode::CreateEnum(e) = node
            && let Some(full) = desired.enums.get(&e.name)
        {
            e.values = full.values.clone();
        }
    }
    Ok(migration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::model::{Column, ColumnType, Schema};

    fn table_with_fk(name: &str, fk: Option<(&str, &str)>) -> Table {
        let mut t = Table::new(name);
        if let Some((ref_table, ref_col)) = fk {
            t = t.column(Column::new("parent_id", ColumnType::Uuid).references(ref_table, ref_col));
        }
        t
    }

    #[test]
    fn tables_created_in_dependency_order() {
        let child = table_with_fk("areas", Some(("locations", "id")));
        let parent = table_with_fk("locations", None);
        let diff = SchemaDiff {
            tables_added: vec![child, parent],
            ..Default::default()
        };
        let plan = plan(&diff).unwrap();
        let positions: Vec<&str> = plan
            .nodes
            .iter()
            .filter_map(|n| match n {
                DdlNode::CreateTable(t) => Some(t.name.as_str()),
                _ => None,
            })
            .collect();
        let loc_pos = positions.iter().position(|n| *n == "locations").unwrap();
        let area_pos = positions.iter().position(|n| *n == "areas").unwrap();
        assert!(loc_pos < area_pos);
    }

    #[test]
    fn cycle_is_rejected() {
        let a = table_with_fk("a", Some(("b", "id")));
        let b = table_with_fk("b", Some(("a", "id")));
        let diff = SchemaDiff {
            tables_added: vec![a, b],
            ..Default::default()
        };
        assert!(plan(&diff).is_err());
    }

    #[test]
    fn dropped_table_gets_warning_comment() {
        let diff = SchemaDiff {
            tables_removed: vec![Table::new("legacy")],
            ..Default::default()
        };
        let plan = plan(&diff).unwrap();
        assert!(matches!(plan.nodes[0], DdlNode::Comment(_)));
        assert!(matches!(plan.nodes[1], DdlNode::DropTable { .. }));
    }

    #[test]
    fn removed_enum_value_only_warns_does_not_execute() {
        let diff = SchemaDiff {
            enums_modified: vec![(
                "status".to_string(),
                crate::schema::differ::EnumDiff {
                    values_added: vec![],
                    values_removed: vec!["lost".to_string()],
                },
            )],
            ..Default::default()
        };
        let plan = plan(&diff).unwrap();
        assert_eq!(plan.nodes.len(), 1);
        assert!(matches!(plan.nodes[0], DdlNode::Comment(_)));
    }

    #[test]
    fn plan_with_schema_fills_enum_values() {
        let diff = SchemaDiff {
            enums_added: vec!["status".to_string()],
            ..Default::default()
        };
        let mut schema = Schema::new();
        schema.add_enum(EnumType {
            name: "status".to_string(),
            values: vec!["in_use".to_string(), "sold".to_string()],
        });
        let migration = plan_with_schema(&diff, &schema).unwrap();
        let DdlNode::CreateEnum(e) = &migration.nodes[0] else {
            panic!("expected CreateEnum node");
        };
        assert_eq!(e.values, vec!["in_use".to_string(), "sold".to_string()]);
    }
}
