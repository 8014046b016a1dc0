use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A purchase order derived from an APPROVED purchase requisition.
///
/// Tax splitting invariant: cgst + sgst + igst amounts always equal
/// `total_gst_amount`, and `total_amount = base_amount + total_gst_amount`.
/// `delivered_quantity` is monotonically non-decreasing and never exceeds
/// `total_quantity`; the status column is derived from those counters
/// except for the explicit terminal CLOSED.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub po_number: String,

    pub pr_id: Uuid,

    /// One of CREATED / PARTIAL_DELIVERED / DELIVERED / CLOSED.
    pub status: String,

    pub base_amount: Decimal,

    pub cgst_percent: Decimal,
    pub sgst_percent: Decimal,
    pub igst_percent: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub igst_amount: Decimal,
    pub total_gst_amount: Decimal,
    pub total_amount: Decimal,

    pub total_quantity: i32,
    pub delivered_quantity: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
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
