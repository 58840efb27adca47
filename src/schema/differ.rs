//! C8 — schema differ: compares the parsed schema against the live
//! database schema and produces a structured diff.

use crate::schema::model::{Column, Index, Schema, Table};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnChange {
    pub column: String,
    pub attribute: &'static str,
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableDiff {
    pub columns_added: Vec<Column>,
    pub columns_removed: Vec<Column>,
    pub columns_modified: Vec<ColumnChange>,
    pub indexes_added: Vec<Index>,
    pub indexes_removed: Vec<Index>,
}

impl TableDiff {
    pub fn is_empty(&self) -> bool {
        self.columns_added.is_empty()
            && self.columns_removed.is_empty()
            && self.columns_modified.is_empty()
            && self.indexes_added.is_empty()
            && self.indexes_removed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnumDiff {
    pub values_added: Vec<String>,
    pub values_removed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaDiff {
    pub enums_added: Vec<String>,
    pub enums_removed: Vec<String>,
    pub enums_modified: Vec<(String, EnumDiff)>,
    pub tables_added: Vec<Table>,
    pub tables_removed: Vec<Table>,
    pub tables_modified: Vec<(String, TableDiff)>,
}

impl SchemaDiff {
    pub fn is_empty(&self) -> bool {
        self.enums_added.is_empty()
            && self.enums_removed.is_empty()
            && self.enums_modified.is_empty()
            && self.tables_added.is_empty()
            && self.tables_removed.is_empty()
            && self.tables_modified.is_empty()
    }
}

fn diff_table(desired: &Table, live: &Table) -> TableDiff {
    let desired_cols: BTreeSet<_> = desired.columns.iter().map(|c| c.name.clone()).collect();
    let live_cols: BTreeSet<_> = live.columns.iter().map(|c| c.name.clone()).collect();

    let mut diff = TableDiff::default();

    for name in desired_cols.difference(&live_cols) {
        diff.columns_added
            .push(desired.column_named(name).unwrap().clone());
    }
    for name in live_cols.difference(&desired_cols) {
        diff.columns_removed
            .push(live.column_named(name).unwrap().clone());
    }
    for name in desired_cols.intersection(&live_cols) {
        let d = desired.column_named(name).unwrap();
        let l = live.column_named(name).unwrap();
        if d.col_type != l.col_type {
            diff.columns_modified.push(ColumnChange {
                column: name.clone(),
                attribute: "type",
                before: format!("{:?}", l.col_type),
                after: format!("{:?}", d.col_type),
            });
        }
        if d.nullable != l.nullable {
            diff.columns_modified.push(ColumnChange {
                column: name.clone(),
                attribute: "nullable",
                before: l.nullable.to_string(),
                after: d.nullable.to_string(),
            });
        }
        if d.default != l.default {
            diff.columns_modified.push(ColumnChange {
                column: name.clone(),
                attribute: "default",
                before: l.default.clone().unwrap_or_default(),
                after: d.default.clone().unwrap_or_default(),
            });
        }
    }

    let desired_idx: BTreeSet<_> = desired.indexes.iter().map(|i| i.name.clone()).collect();
    let live_idx: BTreeSet<_> = live.indexes.iter().map(|i| i.name.clone()).collect();
    for name in desired_idx.difference(&live_idx) {
        diff.indexes_added.push(
            desired
                .indexes
                .iter()
                .find(|i| &i.name == name)
                .unwrap()
                .clone(),
        );
    }
    for name in live_idx.difference(&desired_idx) {
        diff.indexes_removed.push(
            live.indexes
                .iter()
                .find(|i| &i.name == name)
                .unwrap()
                .clone(),
        );
    }

    diff
}

/// Compares `desired` (parsed from annotations) against `live` (read back
/// from the database) and produces the structured diff C9 will plan from.
pub fn diff(desired: &Schema, live: &Schema) -> SchemaDiff {
    let mut out = SchemaDiff::default();

    let desired_enums: BTreeSet<_> = desired.enums.keys().cloned().collect();
    let live_enums: BTreeSet<_> = live.enums.keys().cloned().collect();
    out.enums_added = desired_enums.difference(&live_enums).cloned().collect();
    out.enums_removed = live_enums.difference(&desired_enums).cloned().collect();
    for name in desired_enums.intersection(&live_enums) {
        let d = &desired.enums[name];
        let l = &live.enums[name];
        let d_values: BTreeSet<_> = d.values.iter().cloned().collect();
        let l_values: BTreeSet<_> = l.values.iter().cloned().collect();
        let values_added: Vec<_> = d_values.difference(&l_values).cloned().collect();
        let values_removed: Vec<_> = l_values.difference(&d_values).cloned().collect();
        if !values_added.is_empty() || !values_removed.is_empty() {
            out.enums_modified.push((
                name.clone(),
                EnumDiff {
                    values_added,
                    values_removed,
                },
            ));
        }
    }

    let desired_tables: BTreeSet<_> = desired.tables.keys().cloned().collect();
    let live_tables: BTreeSet<_> = live.tables.keys().cloned().collect();
    for name in desired_tables.difference(&live_tables) {
        out.tables_added.push(desired.tables[name].clone());
    }
    for name in live_tables.difference(&desired_tables) {
        out.tables_removed.push(live.tables[name].clone());
    }
    for name in desired_tables.intersection(&live_tables) {
        let table_diff = diff_table(&desired.tables[name], &live.tables[name]);
        if !table_diff.is_empty() {
            out.tables_modified.push((name.clone(), table_diff));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::model::{Column, ColumnType};

    #[test]
    fn empty_live_schema_yields_all_tables_added() {
        let mut desired = Schema::new();
        desired.add_table(Table::new("locations").column(Column::new("name", ColumnType::Text)));
        let live = Schema::new();
        let d = diff(&desired, &live);
        assert_eq!(d.tables_added.len(), 1);
        assert!(d.tables_removed.is_empty());
        assert!(d.tables_modified.is_empty());
    }

    #[test]
    fn identical_schemas_yield_empty_diff() {
        let mut schema = Schema::new();
        schema.add_table(Table::new("locations").column(Column::new("name", ColumnType::Text)));
        let d = diff(&schema, &schema);
        assert!(d.is_empty());
    }

    #[test]
    fn column_type_change_is_detected() {
        let mut desired = Schema::new();
        desired.add_table(Table::new("locations").column(Column::new("name", ColumnType::Text)));
        let mut live = Schema::new();
        live.add_table(Table::new("locations").column(Column::new("name", ColumnType::Integer)));
        let d = diff(&desired, &live);
        assert_eq!(d.tables_modified.len(), 1);
        assert_eq!(d.tables_modified[0].1.columns_modified.len(), 1);
    }

    #[test]
    fn dropped_column_is_detected() {
        let mut desired = Schema::new();
        desired.add_table(Table::new("locations"));
        let mut live = Schema::new();
        live.add_table(Table::new("locations").column(Column::new("legacy", ColumnType::Text)));
        let d = diff(&desired, &live);
        assert_eq!(d.tables_modified[0].1.columns_removed.len(), 1);
    }
}
