use crate::{
    db::DbPool,
    entities::{purchase_order, purchase_requisition},
    errors::ServiceError,
    events::{Event, EventSender},
    ids,
    models::{PoStatus, PrStatus},
};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePoRequest {
    pub pr_id: Uuid,
    #[schema(value_type = String, example = "9")]
    pub cgst_percent: Decimal,
    #[schema(value_type = String, example = "9")]
    pub sgst_percent: Decimal,
    #[schema(value_type = String, example = "0")]
    pub igst_percent: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeliveryRequest {
    /// Quantity delivered in this shipment (adds to the running counter).
    pub quantity: i32,
}

/// PO representation returned over HTTP: the stored row plus the two
/// derived fields callers always recompute otherwise.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoResponse {
    pub id: Uuid,
    pub po_number: String,
    pub pr_id: Uuid,
    pub status: String,
    #[schema(value_type = String)]
    pub base_amount: Decimal,
    #[schema(value_type = String)]
    pub cgst_percent: Decimal,
    #[schema(value_type = String)]
    pub sgst_percent: Decimal,
    #[schema(value_type = String)]
    pub igst_percent: Decimal,
    #[schema(value_type = String)]
    pub cgst_amount: Decimal,
    #[schema(value_type = String)]
    pub sgst_amount: Decimal,
    #[schema(value_type = String)]
    pub igst_amount: Decimal,
    #[schema(value_type = String)]
    pub total_gst_amount: Decimal,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
    pub total_quantity: i32,
    pub delivered_quantity: i32,
    pub remaining_quantity: i32,
    /// Value of the undelivered remainder, pro-rated per unit.
    #[schema(value_type = String)]
    pub balance_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
}

impl From<purchase_order::Model> for PoResponse {
    fn from(po: purchase_order::Model) -> Self {
        let remaining = po.total_quantity - po.delivered_quantity;
        let balance = balance_amount(po.total_amount, po.total_quantity, po.delivered_quantity);
        Self {
            id: po.id,
            po_number: po.po_number,
            pr_id: po.pr_id,
            status: po.status,
            base_amount: po.base_amount,
            cgst_percent: po.cgst_percent,
            sgst_percent: po.sgst_percent,
            igst_percent: po.igst_percent,
            cgst_amount: po.cgst_amount,
            sgst_amount: po.sgst_amount,
            igst_amount: po.igst_amount,
            total_gst_amount: po.total_gst_amount,
            total_amount: po.total_amount,
            total_quantity: po.total_quantity,
            delivered_quantity: po.delivered_quantity,
            remaining_quantity: remaining,
            balance_amount: balance,
            created_at: po.created_at,
            updated_at: po.updated_at,
            version: po.version,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PoListResponse {
    pub purchase_orders: Vec<PoResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// One GST component: `base × percent / 100`, rounded half-up to 2
/// decimal places. Each component rounds independently before summing.
pub fn gst_amount(base: Decimal, percent: Decimal) -> Decimal {
    (base * percent / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Monetary value of the undelivered remainder: per-unit price times
/// remaining units, rounded half-up to 2 decimal places.
pub fn balance_amount(total_amount: Decimal, total_quantity: i32, delivered: i32) -> Decimal {
    if total_quantity == 0 {
        return Decimal::ZERO;
    }
    let remaining = Decimal::from(total_quantity - delivered);
    (total_amount / Decimal::from(total_quantity) * remaining)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Purchase order workflow: creation from an APPROVED PR with GST
/// splitting, counter-driven delivery tracking, and the explicit close.
#[derive(Clone)]
pub struct PoService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl PoService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Raises a PO from an APPROVED PR. The PR's total becomes the base
    /// amount, GST components are computed here, and the ordered
    /// quantity is the sum of the PR's line quantities. At most one PO
    /// per PR.
    #[instrument(skip(self, request), fields(pr_id = %request.pr_id))]
    pub async fn create_po(
        &self,
        request: CreatePoRequest,
    ) -> Result<purchase_order::Model, ServiceError> {
        for (name, pct) in [
            ("cgst_percent", request.cgst_percent),
            ("sgst_percent", request.sgst_percent),
            ("igst_percent", request.igst_percent),
        ] {
            if pct.is_sign_negative() || pct > Decimal::ONE_HUNDRED {
                return Err(ServiceError::ValidationError(format!(
                    "{name} must be between 0 and 100"
                )));
            }
        }

        let pr = purchase_requisition::Entity::find_by_id(request.pr_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Purchase requisition {} not found",
                    request.pr_id
                ))
            })?;
        if pr.status != PrStatus::Approved.to_string() {
            return Err(ServiceError::InvalidState(format!(
                "Purchase requisition {} is {}; only APPROVED requisitions can raise a purchase order",
                pr.pr_number, pr.status
            )));
        }
        if let Some(existing) = self.find_by_pr(pr.id).await? {
            return Err(ServiceError::Conflict(format!(
                "Purchase order {} already exists for requisition {}",
                existing.po_number, pr.pr_number
            )));
        }

        let quantities: Vec<i32> = serde_json::from_value(pr.quantities.clone())
            .map_err(|e| ServiceError::InternalError(format!("corrupt quantities on PR: {e}")))?;
        let total_quantity = quantities
            .iter()
            .try_fold(0i32, |acc, q| acc.checked_add(*q))
            .ok_or_else(|| {
                ServiceError::ValidationError(
                    "Ordered quantity exceeds the supported range".into(),
                )
            })?;

        let base = pr.total_amount;
        let cgst = gst_amount(base, request.cgst_percent);
        let sgst = gst_amount(base, request.sgst_percent);
        let igst = gst_amount(base, request.igst_percent);
        let total_gst = cgst + sgst + igst;

        let po = purchase_order::ActiveModel {
            id: Set(Uuid::new_v4()),
            po_number: Set(ids::next_po_number()),
            pr_id: Set(pr.id),
            status: Set(PoStatus::Created.to_string()),
            base_amount: Set(base),
            cgst_percent: Set(request.cgst_percent),
            sgst_percent: Set(request.sgst_percent),
            igst_percent: Set(request.igst_percent),
            cgst_amount: Set(cgst),
            sgst_amount: Set(sgst),
            igst_amount: Set(igst),
            total_gst_amount: Set(total_gst),
            total_amount: Set(base + total_gst),
            total_quantity: Set(total_quantity),
            delivered_quantity: Set(0),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            version: Set(1),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(
            po_id = %po.id,
            po_number = %po.po_number,
            total = %po.total_amount,
            quantity = po.total_quantity,
            "PO created"
        );
        self.emit(Event::PoCreated {
            po_id: po.id,
            pr_id: po.pr_id,
        })
        .await;
        Ok(po)
    }

    /// Records a delivery against the running counter and re-derives the
    /// status from the counters. Over-delivery is rejected outright; a
    /// CLOSED order admits no further deliveries.
    #[instrument(skip(self))]
    pub async fn update_delivery(
        &self,
        po_id: Uuid,
        request: DeliveryRequest,
    ) -> Result<purchase_order::Model, ServiceError> {
        if request.quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "Delivered quantity must be positive".into(),
            ));
        }

        let po = self.find_po(po_id).await?;
        if po.status == PoStatus::Closed.to_string() {
            return Err(ServiceError::InvalidState(format!(
                "Purchase order {} is CLOSED and cannot accept deliveries",
                po.po_number
            )));
        }

        // checked_add: an i32-overflowing sum is by definition past the total
        let delivered = match po.delivered_quantity.checked_add(request.quantity) {
            Some(d) if d <= po.total_quantity => d,
            _ => {
                return Err(ServiceError::ValidationError(format!(
                    "Delivery of {} exceeds ordered quantity: {} of {} already delivered",
                    request.quantity, po.delivered_quantity, po.total_quantity
                )))
            }
        };

        let total = po.total_quantity;
        let version = po.version;
        let mut active: purchase_order::ActiveModel = po.into();
        active.delivered_quantity = Set(delivered);
        active.status = Set(PoStatus::from_counters(delivered, total).to_string());
        active.updated_at = Set(Some(Utc::now()));
        active.version = Set(version + 1);

        let updated = self.save_guarded(active, version).await?;
        info!(
            po_id = %updated.id,
            delivered = updated.delivered_quantity,
            total = updated.total_quantity,
            status = %updated.status,
            "PO delivery recorded"
        );
        self.emit(Event::PoDeliveryUpdated {
            po_id: updated.id,
            delivered_quantity: updated.delivered_quantity,
            total_quantity: updated.total_quantity,
        })
        .await;
        Ok(updated)
    }

    /// DELIVERED -> CLOSED. The only explicit status write besides
    /// creation; everything else derives from the counters.
    #[instrument(skip(self))]
    pub async fn close_po(&self, po_id: Uuid) -> Result<purchase_order::Model, ServiceError> {
        let po = self.find_po(po_id).await?;
        if po.status != PoStatus::Delivered.to_string() {
            return Err(ServiceError::InvalidState(format!(
                "Purchase order {} is {}; only fully DELIVERED orders can be closed",
                po.po_number, po.status
            )));
        }

        let version = po.version;
        let mut active: purchase_order::ActiveModel = po.into();
        active.status = Set(PoStatus::Closed.to_string());
        active.updated_at = Set(Some(Utc::now()));
        active.version = Set(version + 1);

        let updated = self.save_guarded(active, version).await?;
        info!(po_id = %updated.id, po_number = %updated.po_number, "PO closed");
        self.emit(Event::PoClosed(updated.id)).await;
        Ok(updated)
    }

    pub async fn get_po(&self, po_id: Uuid) -> Result<purchase_order::Model, ServiceError> {
        self.find_po(po_id).await
    }

    /// Lists POs newest first, optionally filtered by status.
    pub async fn list_pos(
        &self,
        status: Option<PoStatus>,
        page: u64,
        per_page: u64,
    ) -> Result<PoListResponse, ServiceError> {
        let mut query =
            purchase_order::Entity::find().order_by_desc(purchase_order::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(purchase_order::Column::Status.eq(status.to_string()));
        }

        let paginator = query.paginate(&*self.db_pool, per_page.max(1));
        let total = paginator.num_items().await?;
        let purchase_orders = paginator
            .fetch_page(page.max(1) - 1)
            .await?
            .into_iter()
            .map(PoResponse::from)
            .collect();

        Ok(PoListResponse {
            purchase_orders,
            total,
            page,
            per_page,
        })
    }

    pub async fn find_by_pr(
        &self,
        pr_id: Uuid,
    ) -> Result<Option<purchase_order::Model>, ServiceError> {
        Ok(purchase_order::Entity::find()
            .filter(purchase_order::Column::PrId.eq(pr_id))
            .one(&*self.db_pool)
            .await?)
    }

    async fn find_po(&self, po_id: Uuid) -> Result<purchase_order::Model, ServiceError> {
        purchase_order::Entity::find_by_id(po_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Purchase order {po_id} not found")))
    }

    async fn save_guarded(
        &self,
        active: purchase_order::ActiveModel,
        version: i32,
    ) -> Result<purchase_order::Model, ServiceError> {
        purchase_order::Entity::update(active)
            .filter(purchase_order::Column::Version.eq(version))
            .exec(&*self.db_pool)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => ServiceError::Conflict(
                    "Purchase order was modified concurrently; reload and retry".into(),
                ),
                other => other.into(),
            })
    }

    async fn emit(&self, event: Event) {
        if let Err(e) = self.event_sender.send(event).await {
            warn!(error = %e, "event emission failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn gst_splits_the_standard_example() {
        let base = dec!(1100);
        assert_eq!(gst_amount(base, dec!(9)), dec!(99.00));
        assert_eq!(gst_amount(base, dec!(0)), dec!(0.00));

        let total_gst = gst_amount(base, dec!(9)) + gst_amount(base, dec!(9));
        assert_eq!(total_gst, dec!(198.00));
        assert_eq!(base + total_gst, dec!(1298.00));
    }

    #[test]
    fn gst_rounds_midpoints_away_from_zero() {
        // 10 × 1.25% = 0.125: half-up gives 0.13, not banker's 0.12.
        assert_eq!(gst_amount(dec!(10), dec!(1.25)), dec!(0.13));
        assert_eq!(gst_amount(dec!(333.33), dec!(9)), dec!(30.00));
    }

    #[test]
    fn each_component_rounds_before_summing() {
        // Two components of 0.125 each round to 0.13 independently,
        // so the sum is 0.26 rather than round(0.25) = 0.25.
        let base = dec!(10);
        let sum = gst_amount(base, dec!(1.25)) + gst_amount(base, dec!(1.25));
        assert_eq!(sum, dec!(0.26));
    }

    #[test]
    fn balance_is_pro_rated_over_remaining_units() {
        assert_eq!(balance_amount(dec!(1298.00), 15, 0), dec!(1298.00));
        assert_eq!(balance_amount(dec!(1298.00), 15, 15), dec!(0.00));
        // 1298 / 15 = 86.5333… per unit; 5 remaining → 432.67.
        assert_eq!(balance_amount(dec!(1298.00), 15, 10), dec!(432.67));
    }

    #[test]
    fn balance_with_zero_quantity_is_zero() {
        assert_eq!(balance_amount(dec!(100), 0, 0), Decimal::ZERO);
    }
}
