use crate::entity::Identifiable;
use crate::error::{RepositoryError, RepositoryResult};
use crate::identity::Context;
use crate::schema::annotations::{Annotated, TableAnnotation};
use crate::schema::model::{Column, ColumnType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A subdivision of a `Location` that groups `Commodity` rows (§3.2).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Area {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub location_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for Area {
    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

impl Area {
    pub fn validate(&self, _ctx: &Context) -> RepositoryResult<()> {
        if self.name.trim().is_empty() {
            return Err(RepositoryError::FieldRequired("name".to_string()));
        }
        Ok(())
    }
}

impl Annotated for Area {
    fn table_annotation() -> TableAnnotation {
        TableAnnotation::new("areas")
            .column(Column::new("location_id", ColumnType::Uuid).references("locations", "id"))
            .column(Column::new("name", ColumnType::Text))
    }
}
