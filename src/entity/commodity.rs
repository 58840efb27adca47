use crate::entity::Identifiable;
use crate::error::{RepositoryError, RepositoryResult};
use crate::identity::Context;
use crate::schema::annotations::{Annotated, TableAnnotation};
use crate::schema::model::{Column, ColumnType, Index};
use crate::types::Money;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "commodity_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CommodityStatus {
    InUse,
    Sold,
    Lost,
    Disposed,
    WrittenOff,
}

/// A tracked item within an `Area` (§3.2). `draft` rows and rows whose
/// status is not `in_use` are excluded from the aggregate-worth calculation
/// (§3.3, SPEC_FULL §B).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Commodity {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub area_id: Uuid,
    pub name: String,
    pub short_name: Option<String>,
    pub commodity_type: Option<String>,
    pub count: i32,
    pub price: BigDecimal,
    pub currency: String,
    pub status: CommodityStatus,
    pub serial_numbers: Json<Vec<String>>,
    pub tags: Json<Vec<String>>,
    pub urls: Json<Vec<String>>,
    pub comments: Option<String>,
    pub draft: bool,
    pub purchase_date: Option<DateTime<Utc>>,
    pub warranty_expires_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Commodity {
    pub fn worth(&self) -> Money {
        Money {
            amount: &self.price * BigDecimal::from(self.count),
            currency: self.currency.clone(),
        }
    }

    pub fn counts_toward_worth(&self) -> bool {
        !self.draft && self.status == CommodityStatus::InUse
    }
}

impl Identifiable for Commodity {
    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

impl Commodity {
    pub fn validate(&self, _ctx: &Context) -> RepositoryResult<()> {
        if self.name.trim().is_empty() {
            return Err(RepositoryError::FieldRequired("name".to_string()));
        }
        if self.count < 0 {
            return Err(RepositoryError::InvalidInput("count".to_string()));
        }
        if self.currency.trim().is_empty() {
            return Err(RepositoryError::FieldRequired("currency".to_string()));
        }
        Ok(())
    }
}

impl Annotated for Commodity {
    fn table_annotation() -> TableAnnotation {
        TableAnnotation::new("commodities")
            .column(Column::new("area_id", ColumnType::Uuid).references("areas", "id"))
            .column(Column::new("name", ColumnType::Text))
            .column(Column::new("short_name", ColumnType::Text).nullable())
            .column(Column::new("commodity_type", ColumnType::Text).nullable())
            .column(Column::new("count", ColumnType::Integer).with_default("0"))
            .column(Column::new(
                "price",
                ColumnType::Numeric {
                    precision: 18,
                    scale: 4,
                },
            ))
            .column(Column::new("currency", ColumnType::Text))
            .column(
                Column::new("status", ColumnType::Enum("commodity_status".to_string()))
                    .with_default("'in_use'"),
            )
            .column(Column::new("serial_numbers", ColumnType::Json).with_default("'[]'"))
            .column(Column::new("tags", ColumnType::Json).with_default("'[]'"))
            .column(Column::new("urls", ColumnType::Json).with_default("'[]'"))
            .column(Column::new("comments", ColumnType::Text).nullable())
            .column(Column::new("draft", ColumnType::Boolean).with_default("false"))
            .column(Column::new("purchase_date", ColumnType::TimestampTz).nullable())
            .column(Column::new("warranty_expires_date", ColumnType::TimestampTz).nullable())
            .index(Index::new(
                "commodities_area_id_idx",
                "commodities",
                vec!["area_id".to_string()],
            ))
    }
}
