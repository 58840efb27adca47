//! The fixed list of entity types this core knows how to turn into schema
//! (C7's input). Adding an entity means adding one line here and to
//! `entity::mod`; nothing else in the migration pipeline changes.

use crate::entity::{
    Area, Commodity, ConcurrencySlot, Export, File, ImportRestore, Location, Tenant, User,
};
use crate::schema::annotations::{Annotated, TableAnnotation};
use crate::schema::model::SqlFunction;
use crate::schema::parser::session_functions;

/// All entity table annotations, in no particular order — the planner (C9)
/// is responsible for dependency ordering, not this list.
pub fn all_table_annotations() -> Vec<TableAnnotation> {
    vec![
        Tenant::table_annotation(),
        User::table_annotation(),
        Location::table_annotation(),
        Area::table_annotation(),
        Commodity::table_annotation(),
        File::table_annotation(),
        Export::table_annotation(),
        ImportRestore::table_annotation(),
        ConcurrencySlot::table_annotation(),
    ]
}

/// The schema-level functions this core always declares, regardless of which
/// entities are in play (§4.4.2).
pub fn all_functions() -> Vec<SqlFunction> {
    session_functions()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::dialect::Dialect;
    use crate::schema::parser::parse_schema;

    #[test]
    fn all_entities_parse_without_duplicate_columns() {
        let schema = parse_schema(&all_table_annotations(), &[], &all_functions(), Dialect::Postgres);
        assert_eq!(schema.tables.len(), 9);
        for table in schema.tables.values() {
            let mut seen = std::collections::HashSet::new();
            for column in &table.columns {
                assert!(
                    seen.insert(column.name.clone()),
                    "duplicate column {} in table {}",
                    column.name,
                    table.name
                );
            }
        }
    }

    #[test]
    fn tenants_table_has_no_tenant_id_column() {
        let schema = parse_schema(&all_table_annotations(), &[], &all_functions(), Dialect::Postgres);
        let tenants = schema.tables.get("tenants").unwrap();
        assert!(tenants.column_named("tenant_id").is_none());
    }
}
