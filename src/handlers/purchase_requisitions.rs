use super::common::{created_response, success_response};
use crate::{
    auth::AuthenticatedPrincipal,
    errors::ServiceError,
    handlers::AppState,
    models::{PrStatus, Role},
    services::purchase_requisitions::{ApprovalRequest, CreatePrRequest, UpdatePrRequest},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct PrListParams {
    /// Optional status filter (DRAFT / SUBMITTED / APPROVED / REJECTED).
    pub status: Option<PrStatus>,
    /// Page number, 1-based (default 1).
    pub page: Option<u64>,
    /// Items per page (default 20).
    pub limit: Option<u64>,
}

/// Create a purchase requisition (DRAFT)
#[utoipa::path(
    post,
    path = "/api/v1/purchase-requisitions",
    request_body = CreatePrRequest,
    responses(
        (status = 201, description = "Purchase requisition created"),
        (status = 400, description = "Invalid line items", body = crate::errors::ErrorResponse),
        (status = 422, description = "Budget exceeded or vendor inactive", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-requisitions"
)]
pub async fn create_pr(
    State(state): State<Arc<AppState>>,
    principal: AuthenticatedPrincipal,
    Json(payload): Json<CreatePrRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require_any_role(&[Role::Procurement])?;
    let pr = state.services.purchase_requisitions.create_pr(payload).await?;
    Ok(created_response(pr))
}

/// List purchase requisitions
#[utoipa::path(
    get,
    path = "/api/v1/purchase-requisitions",
    params(PrListParams),
    responses((status = 200, description = "Purchase requisitions")),
    tag = "purchase-requisitions"
)]
pub async fn list_prs(
    State(state): State<Arc<AppState>>,
    _principal: AuthenticatedPrincipal,
    Query(params): Query<PrListParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let prs = state
        .services
        .purchase_requisitions
        .list_prs(
            params.status,
            params.page.unwrap_or(1),
            params.limit.unwrap_or(20),
        )
        .await?;
    Ok(success_response(prs))
}

/// Get a purchase requisition by id
#[utoipa::path(
    get,
    path = "/api/v1/purchase-requisitions/{id}",
    params(("id" = Uuid, Path, description = "Purchase requisition id")),
    responses(
        (status = 200, description = "Purchase requisition"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-requisitions"
)]
pub async fn get_pr(
    State(state): State<Arc<AppState>>,
    _principal: AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let pr = state.services.purchase_requisitions.get_pr(id).await?;
    Ok(success_response(pr))
}

/// Replace the line items of a DRAFT purchase requisition
#[utoipa::path(
    put,
    path = "/api/v1/purchase-requisitions/{id}",
    params(("id" = Uuid, Path, description = "Purchase requisition id")),
    request_body = UpdatePrRequest,
    responses(
        (status = 200, description = "Purchase requisition updated"),
        (status = 409, description = "Not editable in its current state", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-requisitions"
)]
pub async fn update_pr(
    State(state): State<Arc<AppState>>,
    principal: AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePrRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require_any_role(&[Role::Procurement])?;
    let pr = state
        .services
        .purchase_requisitions
        .update_pr(id, payload)
        .await?;
    Ok(success_response(pr))
}

/// Submit a DRAFT purchase requisition for approval
#[utoipa::path(
    post,
    path = "/api/v1/purchase-requisitions/{id}/submit",
    params(("id" = Uuid, Path, description = "Purchase requisition id")),
    responses(
        (status = 200, description = "Purchase requisition submitted"),
        (status = 409, description = "Not in DRAFT", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-requisitions"
)]
pub async fn submit_pr(
    State(state): State<Arc<AppState>>,
    principal: AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require_any_role(&[Role::Procurement])?;
    let pr = state.services.purchase_requisitions.submit_pr(id).await?;
    Ok(success_response(pr))
}

/// Approve a SUBMITTED purchase requisition
#[utoipa::path(
    post,
    path = "/api/v1/purchase-requisitions/{id}/approve",
    params(("id" = Uuid, Path, description = "Purchase requisition id")),
    request_body = ApprovalRequest,
    responses(
        (status = 200, description = "Purchase requisition approved"),
        (status = 409, description = "Not in SUBMITTED", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-requisitions"
)]
pub async fn approve_pr(
    State(state): State<Arc<AppState>>,
    principal: AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApprovalRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require_any_role(&[Role::Approver])?;
    let pr = state
        .services
        .purchase_requisitions
        .approve_pr(id, principal.user_id, payload)
        .await?;
    Ok(success_response(pr))
}

/// Reject a SUBMITTED purchase requisition
#[utoipa::path(
    post,
    path = "/api/v1/purchase-requisitions/{id}/reject",
    params(("id" = Uuid, Path, description = "Purchase requisition id")),
    request_body = ApprovalRequest,
    responses(
        (status = 200, description = "Purchase requisition rejected"),
        (status = 409, description = "Not in SUBMITTED", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-requisitions"
)]
pub async fn reject_pr(
    State(state): State<Arc<AppState>>,
    principal: AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApprovalRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require_any_role(&[Role::Approver])?;
    let pr = state
        .services
        .purchase_requisitions
        .reject_pr(id, principal.user_id, payload)
        .await?;
    Ok(success_response(pr))
}

/// Approval history for a purchase requisition, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/purchase-requisitions/{id}/history",
    params(("id" = Uuid, Path, description = "Purchase requisition id")),
    responses(
        (status = 200, description = "Approval history"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-requisitions"
)]
pub async fn approval_history(
    State(state): State<Arc<AppState>>,
    _principal: AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let history = state
        .services
        .purchase_requisitions
        .approval_history(id)
        .await?;
    Ok(success_response(history))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_pr).get(list_prs))
        .route("/:id", get(get_pr).put(update_pr))
        .route("/:id/submit", post(submit_pr))
        .route("/:id/approve", post(approve_pr))
        .route("/:id/reject", post(reject_pr))
        .route("/:id/history", get(approval_history))
}
