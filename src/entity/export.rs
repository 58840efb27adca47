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
#[sqlx(type_name = "export_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExportStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// A background export job (§4.11). `transition` is the only mutator that
/// changes `status`; it enforces the legal edges pending -> in_progress ->
/// (completed | failed). `in_progress` cannot go back to `pending`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Export {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub requested_by: Uuid,
    pub status: ExportStatus,
    pub bucket_key: Option<String>,
    pub error_message: Option<String>,
    pub completed_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for Export {
    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

impl Export {
    pub fn validate(&self, _ctx: &Context) -> RepositoryResult<()> {
        if self.status == ExportStatus::Completed && self.bucket_key.is_none() {
            return Err(RepositoryError::InvalidInput(
                "bucket_key required for completed export".to_string(),
            ));
        }
        if self.status == ExportStatus::Completed && self.completed_date.is_none() {
            return Err(RepositoryError::InvalidInput(
                "completed_date required for completed export".to_string(),
            ));
        }
        if self.status == ExportStatus::Failed && self.error_message.is_none() {
            return Err(RepositoryError::InvalidInput(
                "error_message required for failed export".to_string(),
            ));
        }
        Ok(())
    }

    /// Checks whether moving from the current status to `next` is a legal
    /// edge of the job state machine, without mutating `self`.
    pub fn can_transition_to(&self, next: ExportStatus) -> bool {
        use ExportStatus::*;
        matches!(
            (self.status, next),
            (Pending, InProgress) | (InProgress, Completed) | (InProgress, Failed)
        )
    }

    pub fn transition(&mut self, next: ExportStatus) -> RepositoryResult<()> {
        if !self.can_transition_to(next) {
            return Err(RepositoryError::InvalidInput(format!(
                "illegal export transition {:?} -> {:?}",
                self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }
}

impl Annotated for Export {
    fn table_annotation() -> TableAnnotation {
        TableAnnotation::new("exports")
            .column(Column::new("requested_by", ColumnType::Uuid).references("users", "id"))
            .column(
                Column::new("status", ColumnType::Enum("export_status".to_string()))
                    .with_default("'pending'"),
            )
            .column(Column::new("bucket_key", ColumnType::Text).nullable())
            .column(Column::new("error_message", ColumnType::Text).nullable())
            .column(Column::new("completed_date", ColumnType::TimestampTz).nullable())
    }
}
