use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A purchase requisition: the request-to-buy document.
///
/// `items`, `quantities` and `unit_amounts` are parallel JSON arrays of
/// equal length; `total_amount` is always Σ(quantity × unit amount).
/// `version` implements optimistic concurrency: every save filters on
/// the loaded version, and a lost race surfaces as `Conflict`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_requisitions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub pr_number: String,

    pub vendor_id: Uuid,
    pub requester_id: Uuid,

    /// One of DRAFT / SUBMITTED / APPROVED / REJECTED.
    pub status: String,

    #[sea_orm(column_type = "Json")]
    pub items: Json,
    #[sea_orm(column_type = "Json")]
    pub quantities: Json,
    #[sea_orm(column_type = "Json")]
    pub unit_amounts: Json,

    pub total_amount: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vendor::Entity",
        from = "Column::VendorId",
        to = "super::vendor::Column::Id"
    )]
    Vendor,
    #[sea_orm(has_many = "super::purchase_order::Entity")]
    PurchaseOrders,
    #[sea_orm(has_many = "super::approval_history::Entity")]
    ApprovalHistory,
}

impl Related<super::vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl Related<super::purchase_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrders.def()
    }
}

impl Related<super::approval_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ApprovalHistory.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {}
