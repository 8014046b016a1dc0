use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One outbound email and its delivery attempts.
///
/// Rows start PENDING and are always finalized to SUCCESS or FAILED.
/// The retry sweep only picks up FAILED rows with `retry_count` below
/// the ceiling; attachment sends are created with `retry_count` already
/// at the ceiling so the sweep skips them.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "email_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub recipient: String,
    pub subject: String,

    #[sea_orm(column_type = "Text")]
    pub body: String,

    /// One of PENDING / SUCCESS / FAILED.
    pub status: String,

    pub retry_count: i32,
    pub last_attempt: DateTime<Utc>,
    pub error_message: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {}
