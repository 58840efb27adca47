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
#[sqlx(type_name = "file_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Image,
    Invoice,
    Manual,
    File,
}

/// A blob attached to a `Commodity` (§3.2). The blob bytes themselves live
/// behind the `BlobBucket` boundary interface (§6.5); this row is metadata
/// and the bucket key only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub commodity_id: Uuid,
    pub bucket_key: String,
    pub original_name: String,
    pub extension: String,
    pub mime_type: String,
    pub kind: FileKind,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for File {
    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

impl File {
    pub fn validate(&self, _ctx: &Context) -> RepositoryResult<()> {
        if self.bucket_key.trim().is_empty() {
            return Err(RepositoryError::FieldRequired("bucket_key".to_string()));
        }
        if self.original_name.trim().is_empty() {
            return Err(RepositoryError::FieldRequired("original_name".to_string()));
        }
        if self.mime_type.trim().is_empty() {
            return Err(RepositoryError::FieldRequired("mime_type".to_string()));
        }
        if self.size_bytes < 0 {
            return Err(RepositoryError::InvalidInput("size_bytes".to_string()));
        }
        Ok(())
    }
}

impl Annotated for File {
    fn table_annotation() -> TableAnnotation {
        TableAnnotation::new("files")
            .column(Column::new("commodity_id", ColumnType::Uuid).references("commodities", "id"))
            .column(Column::new("bucket_key", ColumnType::Text))
            .column(Column::new("original_name", ColumnType::Text))
            .column(Column::new("extension", ColumnType::Text))
            .column(Column::new("mime_type", ColumnType::Text))
            .column(Column::new("kind", ColumnType::Enum("file_kind".to_string())).with_default("'file'"))
            .column(Column::new("size_bytes", ColumnType::BigInt).with_default("0"))
    }
}
