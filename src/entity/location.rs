use crate::entity::Identifiable;
use crate::error::{RepositoryError, RepositoryResult};
use crate::identity::Context;
use crate::schema::annotations::{Annotated, TableAnnotation};
use crate::schema::model::{Column, ColumnType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A physical place within a tenant that groups `Area`s (§3.2).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for Location {
    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

impl Location {
    pub fn validate(&self, _ctx: &Context) -> RepositoryResult<()> {
        if self.name.trim().is_empty() {
            return Err(RepositoryError::FieldRequired("name".to_string()));
        }
        Ok(())
    }
}

impl Annotated for Location {
    fn table_annotation() -> TableAnnotation {
        TableAnnotation::new("locations")
            .column(Column::new("name", ColumnType::Text))
            .column(Column::new("address", ColumnType::Text).nullable())
    }
}
