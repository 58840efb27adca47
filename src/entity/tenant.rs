use crate::entity::Identifiable;
use crate::error::{RepositoryError, RepositoryResult};
use crate::identity::Context;
use crate::schema::annotations::{Annotated, TableAnnotation};
use crate::schema::model::{Column, ColumnType, Index};
use crate::types::{Slug, ValueObject, ValueObjectable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "tenant_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    Active,
    Suspended,
    Inactive,
}

/// The organization boundary for data isolation (§3.1). Created only by
/// administrative operations — there is no user-scoped factory for it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub domain: Option<String>,
    pub status: TenantStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for Tenant {
    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

impl Tenant {
    pub fn validate(&self, _ctx: &Context) -> RepositoryResult<()> {
        if self.name.trim().is_empty() {
            return Err(RepositoryError::FieldRequired("name".to_string()));
        }
        ValueObject::new(Slug(self.slug.clone()))
            .map_err(|_| RepositoryError::InvalidInput("slug".to_string()))?
            .extract()
            .get_value();
        Ok(())
    }
}

impl Annotated for Tenant {
    fn table_annotation() -> TableAnnotation {
        TableAnnotation::new("tenants")
            .not_tenant_scoped()
            .column(Column::new("name", ColumnType::Text))
            .column(Column::new("slug", ColumnType::Text))
            .column(Column::new("domain", ColumnType::Text).nullable())
            .column(Column::new("status", ColumnType::Enum("tenant_status".to_string())).with_default("'active'"))
            .index(Index::new("tenants_slug_key", "tenants", vec!["slug".to_string()]).unique())
    }
}
