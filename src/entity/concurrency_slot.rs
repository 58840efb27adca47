use crate::entity::Identifiable;
use crate::error::{RepositoryError, RepositoryResult};
use crate::identity::Context;
use crate::schema::annotations::{Annotated, TableAnnotation};
use crate::schema::model::{Column, ColumnType, Index};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One in-flight background job slot for a user (§5). A user may hold at
/// most `max_slots` concurrent slots; `expires_at` bounds how long a slot
/// may be held before `cleanup_expired_slots` reclaims it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConcurrencySlot {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub job_kind: String,
    pub acquired_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Identifiable for ConcurrencySlot {
    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

impl ConcurrencySlot {
    pub fn validate(&self, _ctx: &Context) -> RepositoryResult<()> {
        if self.job_kind.trim().is_empty() {
            return Err(RepositoryError::FieldRequired("job_kind".to_string()));
        }
        if self.expires_at <= self.acquired_at {
            return Err(RepositoryError::InvalidInput("expires_at".to_string()));
        }
        Ok(())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

impl Annotated for ConcurrencySlot {
    fn table_annotation() -> TableAnnotation {
        TableAnnotation::new("concurrency_slots")
            .column(Column::new("job_kind", ColumnType::Text))
            .column(Column::new("acquired_at", ColumnType::TimestampTz))
            .column(Column::new("expires_at", ColumnType::TimestampTz))
            .index(Index::new(
                "concurrency_slots_user_id_idx",
                "concurrency_slots",
                vec!["user_id".to_string()],
            ))
    }
}
