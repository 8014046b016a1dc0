use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only audit record of a single approve/reject decision.
/// Rows are inserted once and never mutated or deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "approval_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub pr_id: Uuid,
    pub approver_id: Uuid,

    /// APPROVED or REJECTED.
    pub action: String,

    pub comments: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchase_requisition::Entity",
        from = "Column::PrId",
        to = "super::purchase_requisition::Column::Id"
    )]
    PurchaseRequisition,
}

impl Related<super::purchase_requisition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseRequisition.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {}
