use super::common::{created_response, download_response, success_response};
use crate::{
    auth::AuthenticatedPrincipal,
    errors::ServiceError,
    handlers::AppState,
    models::{PoStatus, Role},
    services::purchase_orders::{CreatePoRequest, DeliveryRequest, PoResponse},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct PoListParams {
    /// Optional status filter (CREATED / PARTIAL_DELIVERED / DELIVERED / CLOSED).
    pub status: Option<PoStatus>,
    /// Page number, 1-based (default 1).
    pub page: Option<u64>,
    /// Items per page (default 20).
    pub limit: Option<u64>,
}

/// Raise a purchase order from an APPROVED purchase requisition
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders",
    request_body = CreatePoRequest,
    responses(
        (status = 201, description = "Purchase order created", body = PoResponse),
        (status = 409, description = "PR not APPROVED or PO already exists", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn create_po(
    State(state): State<Arc<AppState>>,
    principal: AuthenticatedPrincipal,
    Json(payload): Json<CreatePoRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require_any_role(&[Role::Procurement])?;
    let po = state.services.purchase_orders.create_po(payload).await?;
    Ok(created_response(PoResponse::from(po)))
}

/// List purchase orders
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders",
    params(PoListParams),
    responses((status = 200, description = "Purchase orders")),
    tag = "purchase-orders"
)]
pub async fn list_pos(
    State(state): State<Arc<AppState>>,
    _principal: AuthenticatedPrincipal,
    Query(params): Query<PoListParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let pos = state
        .services
        .purchase_orders
        .list_pos(
            params.status,
            params.page.unwrap_or(1),
            params.limit.unwrap_or(20),
        )
        .await?;
    Ok(success_response(pos))
}

/// Get a purchase order by id
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    responses(
        (status = 200, description = "Purchase order", body = PoResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn get_po(
    State(state): State<Arc<AppState>>,
    _principal: AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let po = state.services.purchase_orders.get_po(id).await?;
    Ok(success_response(PoResponse::from(po)))
}

/// Get the purchase order raised from a given requisition
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/by-pr/{pr_id}",
    params(("pr_id" = Uuid, Path, description = "Purchase requisition id")),
    responses(
        (status = 200, description = "Purchase order", body = PoResponse),
        (status = 404, description = "No purchase order for this requisition", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn get_po_by_pr(
    State(state): State<Arc<AppState>>,
    _principal: AuthenticatedPrincipal,
    Path(pr_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let po = state
        .services
        .purchase_orders
        .find_by_pr(pr_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("No purchase order for requisition {pr_id}"))
        })?;
    Ok(success_response(PoResponse::from(po)))
}

/// Download the invoice for a purchase order
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}/invoice",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    responses(
        (status = 200, description = "Invoice download", content_type = "text/csv"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn invoice(
    State(state): State<Arc<AppState>>,
    principal: AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require_any_role(&[Role::Finance, Role::Procurement])?;
    let report = state.services.reports.export_po_invoice(id).await?;
    Ok(download_response(report))
}

/// Record a delivery against a purchase order
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/deliver",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    request_body = DeliveryRequest,
    responses(
        (status = 200, description = "Delivery recorded", body = PoResponse),
        (status = 400, description = "Over-delivery or non-positive quantity", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order is CLOSED", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn deliver(
    State(state): State<Arc<AppState>>,
    principal: AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
    Json(payload): Json<DeliveryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require_any_role(&[Role::Vendor])?;
    let po = state
        .services
        .purchase_orders
        .update_delivery(id, payload)
        .await?;
    Ok(success_response(PoResponse::from(po)))
}

/// Close a fully DELIVERED purchase order
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/close",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    responses(
        (status = 200, description = "Purchase order closed", body = PoResponse),
        (status = 409, description = "Not fully delivered", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn close_po(
    State(state): State<Arc<AppState>>,
    principal: AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require_any_role(&[Role::Procurement])?;
    let po = state.services.purchase_orders.close_po(id).await?;
    Ok(success_response(PoResponse::from(po)))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_po).get(list_pos))
        .route("/:id", get(get_po))
        .route("/:id/invoice", get(invoice))
        .route("/by-pr/:pr_id", get(get_po_by_pr))
        .route("/:id/deliver", post(deliver))
        .route("/:id/close", post(close_po))
}
