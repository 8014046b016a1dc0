use crate::{
    db::DbPool,
    entities::{approval_history, purchase_requisition},
    errors::ServiceError,
    events::{Event, EventSender},
    ids,
    models::{ApprovalAction, PrStatus},
    services::{directory::DirectoryService, emails::EmailService, templates},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePrRequest {
    pub vendor_id: Uuid,
    pub requester_id: Uuid,
    pub items: Vec<String>,
    pub quantities: Vec<i32>,
    #[schema(value_type = Vec<String>, example = json!(["100", "20"]))]
    pub unit_amounts: Vec<Decimal>,
}

/// DRAFT-only edit of the line items. Vendor and requester are fixed at
/// creation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdatePrRequest {
    pub items: Vec<String>,
    pub quantities: Vec<i32>,
    #[schema(value_type = Vec<String>)]
    pub unit_amounts: Vec<Decimal>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ApprovalRequest {
    pub comments: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PrListResponse {
    pub purchase_requisitions: Vec<purchase_requisition::Model>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Checks the parallel line-item arrays and returns the computed total.
///
/// The arrays must be the same non-zero length, every quantity must be
/// positive and every unit amount non-negative.
pub fn validate_line_items(
    items: &[String],
    quantities: &[i32],
    unit_amounts: &[Decimal],
) -> Result<Decimal, ServiceError> {
    if items.is_empty() {
        return Err(ServiceError::ValidationError(
            "At least one line item is required".into(),
        ));
    }
    if items.len() != quantities.len() || items.len() != unit_amounts.len() {
        return Err(ServiceError::ValidationError(
            "Items, quantities and unit amounts must have the same length".into(),
        ));
    }
    if items.iter().any(|i| i.trim().is_empty()) {
        return Err(ServiceError::ValidationError(
            "Item names must not be empty".into(),
        ));
    }
    if quantities.iter().any(|q| *q <= 0) {
        return Err(ServiceError::ValidationError(
            "Quantities must be positive".into(),
        ));
    }
    // The summed quantity later becomes a PO counter, so it must fit i32.
    if quantities
        .iter()
        .try_fold(0i32, |acc, q| acc.checked_add(*q))
        .is_none()
    {
        return Err(ServiceError::ValidationError(
            "Total quantity exceeds the supported range".into(),
        ));
    }
    if unit_amounts.iter().any(|a| a.is_sign_negative()) {
        return Err(ServiceError::ValidationError(
            "Unit amounts must not be negative".into(),
        ));
    }

    Ok(quantities
        .iter()
        .zip(unit_amounts)
        .map(|(q, a)| Decimal::from(*q) * a)
        .sum())
}

/// Purchase requisition workflow: creation and DRAFT edits, submission,
/// and the approve/reject decision with its append-only audit trail.
#[derive(Clone)]
pub struct PrService {
    db_pool: Arc<DbPool>,
    directory: DirectoryService,
    emails: Arc<EmailService>,
    event_sender: EventSender,
    budget_limit: Decimal,
}

impl PrService {
    pub fn new(
        db_pool: Arc<DbPool>,
        directory: DirectoryService,
        emails: Arc<EmailService>,
        event_sender: EventSender,
        budget_limit: Decimal,
    ) -> Self {
        Self {
            db_pool,
            directory,
            emails,
            event_sender,
            budget_limit,
        }
    }

    /// Creates a new PR in DRAFT.
    ///
    /// Validation order: line items first, then the budget ceiling, then
    /// vendor active and requester existence. The generated `pr_number`
    /// is unique-indexed; a lost insert race surfaces as `Conflict`.
    #[instrument(skip(self, request), fields(vendor_id = %request.vendor_id))]
    pub async fn create_pr(
        &self,
        request: CreatePrRequest,
    ) -> Result<purchase_requisition::Model, ServiceError> {
        let total = validate_line_items(&request.items, &request.quantities, &request.unit_amounts)?;
        self.check_budget(total)?;
        self.directory.require_active_vendor(request.vendor_id).await?;
        if !self.directory.user_exists(request.requester_id).await? {
            return Err(ServiceError::NotFound(format!(
                "Requester {} not found",
                request.requester_id
            )));
        }

        let now = Utc::now();
        let pr = purchase_requisition::ActiveModel {
            id: Set(Uuid::new_v4()),
            pr_number: Set(ids::next_pr_number()),
            vendor_id: Set(request.vendor_id),
            requester_id: Set(request.requester_id),
            status: Set(PrStatus::Draft.to_string()),
            items: Set(serde_json::to_value(&request.items)
                .map_err(|e| ServiceError::InternalError(e.to_string()))?),
            quantities: Set(serde_json::to_value(&request.quantities)
                .map_err(|e| ServiceError::InternalError(e.to_string()))?),
            unit_amounts: Set(serde_json::to_value(&request.unit_amounts)
                .map_err(|e| ServiceError::InternalError(e.to_string()))?),
            total_amount: Set(total),
            created_at: Set(now),
            updated_at: Set(None),
            version: Set(1),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(pr_id = %pr.id, pr_number = %pr.pr_number, total = %pr.total_amount, "PR created");
        self.notify_requester(&pr, "Purchase Requisition Created", templates::pr_created(&pr))
            .await;
        self.emit(Event::PrCreated(pr.id)).await;
        Ok(pr)
    }

    /// Replaces the line items of a DRAFT PR and recomputes its total.
    #[instrument(skip(self, request))]
    pub async fn update_pr(
        &self,
        pr_id: Uuid,
        request: UpdatePrRequest,
    ) -> Result<purchase_requisition::Model, ServiceError> {
        let pr = self.find_pr(pr_id).await?;
        self.require_status(&pr, PrStatus::Draft, "edited")?;

        let total = validate_line_items(&request.items, &request.quantities, &request.unit_amounts)?;
        self.check_budget(total)?;

        let version = pr.version;
        let mut active: purchase_requisition::ActiveModel = pr.into();
        active.items = Set(serde_json::to_value(&request.items)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?);
        active.quantities = Set(serde_json::to_value(&request.quantities)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?);
        active.unit_amounts = Set(serde_json::to_value(&request.unit_amounts)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?);
        active.total_amount = Set(total);
        active.updated_at = Set(Some(Utc::now()));
        active.version = Set(version + 1);

        let updated = self.save_guarded(active, version).await?;
        info!(pr_id = %updated.id, total = %updated.total_amount, "PR updated");
        self.emit(Event::PrUpdated(updated.id)).await;
        Ok(updated)
    }

    /// DRAFT -> SUBMITTED.
    #[instrument(skip(self))]
    pub async fn submit_pr(
        &self,
        pr_id: Uuid,
    ) -> Result<purchase_requisition::Model, ServiceError> {
        let pr = self.find_pr(pr_id).await?;
        self.require_status(&pr, PrStatus::Draft, "submitted")?;

        let version = pr.version;
        let mut active: purchase_requisition::ActiveModel = pr.into();
        active.status = Set(PrStatus::Submitted.to_string());
        active.updated_at = Set(Some(Utc::now()));
        active.version = Set(version + 1);

        let updated = self.save_guarded(active, version).await?;
        info!(pr_id = %updated.id, pr_number = %updated.pr_number, "PR submitted");
        self.notify_requester(
            &updated,
            "Purchase Requisition Submitted",
            templates::pr_submitted(&updated),
        )
        .await;
        self.emit(Event::PrSubmitted(updated.id)).await;
        Ok(updated)
    }

    /// SUBMITTED -> APPROVED, with the decision recorded in the audit
    /// trail inside the same transaction as the status change.
    #[instrument(skip(self, request))]
    pub async fn approve_pr(
        &self,
        pr_id: Uuid,
        approver_id: Uuid,
        request: ApprovalRequest,
    ) -> Result<purchase_requisition::Model, ServiceError> {
        let updated = self
            .decide(pr_id, approver_id, ApprovalAction::Approved, request.comments)
            .await?;
        self.notify_requester(
            &updated,
            "Purchase Requisition Approved",
            templates::pr_approved(&updated),
        )
        .await;
        self.emit(Event::PrApproved {
            pr_id: updated.id,
            approver_id,
        })
        .await;
        Ok(updated)
    }

    /// SUBMITTED -> REJECTED, same transactional audit discipline.
    #[instrument(skip(self, request))]
    pub async fn reject_pr(
        &self,
        pr_id: Uuid,
        approver_id: Uuid,
        request: ApprovalRequest,
    ) -> Result<purchase_requisition::Model, ServiceError> {
        let comments = request.comments.clone();
        let updated = self
            .decide(pr_id, approver_id, ApprovalAction::Rejected, request.comments)
            .await?;
        self.notify_requester(
            &updated,
            "Purchase Requisition Rejected",
            templates::pr_rejected(&updated, comments.as_deref()),
        )
        .await;
        self.emit(Event::PrRejected {
            pr_id: updated.id,
            approver_id,
        })
        .await;
        Ok(updated)
    }

    pub async fn get_pr(&self, pr_id: Uuid) -> Result<purchase_requisition::Model, ServiceError> {
        self.find_pr(pr_id).await
    }

    /// Lists PRs newest first, optionally filtered by status.
    pub async fn list_prs(
        &self,
        status: Option<PrStatus>,
        page: u64,
        per_page: u64,
    ) -> Result<PrListResponse, ServiceError> {
        let mut query = purchase_requisition::Entity::find()
            .order_by_desc(purchase_requisition::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(purchase_requisition::Column::Status.eq(status.to_string()));
        }

        let paginator = query.paginate(&*self.db_pool, per_page.max(1));
        let total = paginator.num_items().await?;
        let purchase_requisitions = paginator.fetch_page(page.max(1) - 1).await?;

        Ok(PrListResponse {
            purchase_requisitions,
            total,
            page,
            per_page,
        })
    }

    /// Full decision history for a PR, oldest first.
    pub async fn approval_history(
        &self,
        pr_id: Uuid,
    ) -> Result<Vec<approval_history::Model>, ServiceError> {
        self.find_pr(pr_id).await?;
        Ok(approval_history::Entity::find()
            .filter(approval_history::Column::PrId.eq(pr_id))
            .order_by_asc(approval_history::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?)
    }

    async fn decide(
        &self,
        pr_id: Uuid,
        approver_id: Uuid,
        action: ApprovalAction,
        comments: Option<String>,
    ) -> Result<purchase_requisition::Model, ServiceError> {
        let pr = self.find_pr(pr_id).await?;
        self.require_status(&pr, PrStatus::Submitted, "decided")?;
        if !self.directory.user_exists(approver_id).await? {
            return Err(ServiceError::NotFound(format!(
                "Approver {approver_id} not found"
            )));
        }

        let new_status = match action {
            ApprovalAction::Approved => PrStatus::Approved,
            ApprovalAction::Rejected => PrStatus::Rejected,
        };

        let version = pr.version;
        let mut active: purchase_requisition::ActiveModel = pr.into();
        active.status = Set(new_status.to_string());
        active.updated_at = Set(Some(Utc::now()));
        active.version = Set(version + 1);

        // Status change and audit row commit or roll back together.
        let txn = self.db_pool.begin().await?;
        let updated = purchase_requisition::Entity::update(active)
            .filter(purchase_requisition::Column::Version.eq(version))
            .exec(&txn)
            .await
            .map_err(Self::map_guarded_err)?;

        approval_history::ActiveModel {
            id: Set(Uuid::new_v4()),
            pr_id: Set(updated.id),
            approver_id: Set(approver_id),
            action: Set(action.to_string()),
            comments: Set(comments),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(
            pr_id = %updated.id,
            approver_id = %approver_id,
            action = %action,
            "PR decision recorded"
        );
        Ok(updated)
    }

    async fn find_pr(&self, pr_id: Uuid) -> Result<purchase_requisition::Model, ServiceError> {
        purchase_requisition::Entity::find_by_id(pr_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase requisition {pr_id} not found"))
            })
    }

    fn require_status(
        &self,
        pr: &purchase_requisition::Model,
        expected: PrStatus,
        verb: &str,
    ) -> Result<(), ServiceError> {
        if pr.status != expected.to_string() {
            return Err(ServiceError::InvalidState(format!(
                "Purchase requisition {} is {} and cannot be {verb}; only {expected} allows it",
                pr.pr_number, pr.status
            )));
        }
        Ok(())
    }

    fn check_budget(&self, total: Decimal) -> Result<(), ServiceError> {
        if total > self.budget_limit {
            return Err(ServiceError::BudgetExceeded(format!(
                "Total {total} exceeds the budget limit {}",
                self.budget_limit
            )));
        }
        Ok(())
    }

    /// Version-guarded save. `DbErr::RecordNotUpdated` means the row
    /// moved under us, which the caller sees as a `Conflict`.
    async fn save_guarded(
        &self,
        active: purchase_requisition::ActiveModel,
        version: i32,
    ) -> Result<purchase_requisition::Model, ServiceError> {
        purchase_requisition::Entity::update(active)
            .filter(purchase_requisition::Column::Version.eq(version))
            .exec(&*self.db_pool)
            .await
            .map_err(Self::map_guarded_err)
    }

    fn map_guarded_err(err: DbErr) -> ServiceError {
        match err {
            DbErr::RecordNotUpdated => ServiceError::Conflict(
                "Purchase requisition was modified concurrently; reload and retry".into(),
            ),
            other => other.into(),
        }
    }

    async fn notify_requester(
        &self,
        pr: &purchase_requisition::Model,
        subject: &str,
        body: String,
    ) {
        match self.directory.user_email(pr.requester_id).await {
            Ok(Some(email)) => {
                self.emails
                    .send(None, email, format!("{subject}: {}", pr.pr_number), body);
            }
            Ok(None) => {
                warn!(pr_id = %pr.id, requester_id = %pr.requester_id, "requester has no email; notification skipped");
            }
            Err(e) => {
                warn!(pr_id = %pr.id, error = %e, "requester lookup failed; notification skipped");
            }
        }
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

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn line_item_total_is_sum_of_quantity_times_amount() {
        let total = validate_line_items(
            &strings(&["Paper", "Pen"]),
            &[10, 5],
            &[dec!(100), dec!(20)],
        )
        .unwrap();
        assert_eq!(total, dec!(1100));
    }

    #[test]
    fn empty_line_items_are_rejected() {
        let err = validate_line_items(&[], &[], &[]).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn mismatched_array_lengths_are_rejected() {
        let err = validate_line_items(&strings(&["Paper"]), &[10, 5], &[dec!(100)]).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("same length"));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let err = validate_line_items(&strings(&["Paper"]), &[0], &[dec!(100)]).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        let err = validate_line_items(&strings(&["Paper"]), &[-3], &[dec!(100)]).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn negative_unit_amount_is_rejected() {
        let err = validate_line_items(&strings(&["Paper"]), &[1], &[dec!(-1)]).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn quantity_sum_past_i32_max_is_rejected() {
        let err = validate_line_items(
            &strings(&["A", "B"]),
            &[1_500_000_000, 1_500_000_000],
            &[dec!(0), dec!(0)],
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("Total quantity"));
    }

    #[test]
    fn lost_version_race_maps_to_conflict() {
        let err = PrService::map_guarded_err(DbErr::RecordNotUpdated);
        assert_eq!(err.error_code(), "CONFLICT");
    }

    #[test]
    fn blank_item_name_is_rejected() {
        let err = validate_line_items(&strings(&["  "]), &[1], &[dec!(1)]).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
