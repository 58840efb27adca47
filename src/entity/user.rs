use crate::entity::Identifiable;
use crate::error::{RepositoryError, RepositoryResult};
use crate::identity::Context;
use crate::schema::annotations::{Annotated, TableAnnotation};
use crate::schema::model::{Column, ColumnType, Index};
use crate::types::{Email, ValueObject, ValueObjectable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    User,
}

/// A principal within exactly one tenant (§3.1). Email uniqueness is scoped
/// to `(tenant_id, email)`, not global.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_verifier: String,
    pub display_name: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for User {
    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

impl User {
    pub fn validate(&self, _ctx: &Context) -> RepositoryResult<()> {
        ValueObject::new(Email(self.email.clone()))
            .map_err(|_| RepositoryError::InvalidInput("email".to_string()))?;
        if self.display_name.trim().is_empty() {
            return Err(RepositoryError::FieldRequired("display_name".to_string()));
        }
        if self.password_verifier.trim().is_empty() {
            return Err(RepositoryError::FieldRequired(
                "password_verifier".to_string(),
            ));
        }
        Ok(())
    }
}

impl Annotated for User {
    fn table_annotation() -> TableAnnotation {
        TableAnnotation::new("users")
            .column(Column::new("email", ColumnType::Text))
            .column(Column::new("password_verifier", ColumnType::Text))
            .column(Column::new("display_name", ColumnType::Text))
            .column(Column::new("role", ColumnType::Enum("user_role".to_string())).with_default("'user'"))
            .column(Column::new("active", ColumnType::Boolean).with_default("true"))
            .index(
                Index::new(
                    "users_tenant_email_key",
                    "users",
                    vec!["tenant_id".to_string(), "email".to_string()],
                )
                .unique(),
            )
    }
}
