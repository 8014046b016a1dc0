use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One scheduled report generation and its attempts.
///
/// Unlike email logs, the report retry sweep re-runs generation against
/// the same row rather than creating a new one.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// DAILY or WEEKLY.
    pub report_type: String,

    /// One of PENDING / SUCCESS / FAILED.
    pub status: String,

    pub generated_at: DateTime<Utc>,
    pub retry_count: i32,
    pub error_message: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {}
