use crate::entity::Identifiable;
use crate::error::{RepositoryError, RepositoryResult};
use crate::identity::Context;
use crate::schema::annotations::{Annotated, TableAnnotation};
use crate::schema::model::{Column, ColumnType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transfer_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    Import,
    Restore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transfer_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// The symmetric counterpart to `Export`: an Import or a Restore job,
/// sharing the same pending -> in_progress -> (completed | failed) state
/// machine (§4.11, SPEC_FULL §B).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ImportRestore {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub requested_by: Uuid,
    pub kind: TransferKind,
    pub status: TransferStatus,
    pub source_bucket_key: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for ImportRestore {
    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

impl ImportRestore {
    pub fn validate(&self, _ctx: &Context) -> RepositoryResult<()> {
        if self.source_bucket_key.trim().is_empty() {
            return Err(RepositoryError::FieldRequired(
                "source_bucket_key".to_string(),
            ));
        }
        if self.status == TransferStatus::Failed && self.error_message.is_none() {
            return Err(RepositoryError::InvalidInput(
                "error_message required for failed transfer".to_string(),
            ));
        }
        Ok(())
    }

    pub fn can_transition_to(&self, next: TransferStatus) -> bool {
        use TransferStatus::*;
        matches!(
            (self.status, next),
            (Pending, InProgress) | (InProgress, Completed) | (InProgress, Failed)
        )
    }

    pub fn transition(&mut self, next: TransferStatus) -> RepositoryResult<()> {
        if !self.can_transition_to(next) {
            return Err(RepositoryError::InvalidInput(format!(
                "illegal transfer transition {:?} -> {:?}",
                self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }
}

impl Annotated for ImportRestore {
    fn table_annotation() -> TableAnnotation {
        TableAnnotation::new("import_restores")
            .column(Column::new("requested_by", ColumnType::Uuid).references("users", "id"))
            .column(Column::new("kind", ColumnType::Enum("transfer_kind".to_string())))
            .column(
                Column::new("status", ColumnType::Enum("transfer_status".to_string()))
                    .with_default("'pending'"),
            )
            .column(Column::new("source_bucket_key", ColumnType::Text))
            .column(Column::new("error_message", ColumnType::Text).nullable())
    }
}
