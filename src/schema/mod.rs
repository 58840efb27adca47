//! The schema migration engine (C7-C10): parse entity annotations, read the
//! live database schema, diff the two, plan ordered DDL, and render it to
//! dialect-specific SQL.

pub mod annotations;
pub mod dialect;
pub mod differ;
pub mod live_reader;
pub mod migrator;
pub mod model;
pub mod parser;
pub mod planner;
pub mod renderer;
pub mod registry;

pub use annotations::{Annotated, EmbedMode, FieldAnnotation, TableAnnotation};
pub use dialect::Dialect;
pub use differ::{diff, SchemaDiff};
pub use model::Schema;
pub use planner::{plan_with_schema, DdlNode, MigrationPlan};
pub use renderer::{renderer_for, SqlRenderer};
