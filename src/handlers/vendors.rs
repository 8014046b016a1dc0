use super::common::{created_response, success_response};
use crate::{
    auth::AuthenticatedPrincipal, errors::ServiceError, handlers::AppState, models::Role,
    services::directory::CreateVendorRequest,
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct VendorActiveRequest {
    pub active: bool,
}

/// Register a vendor
#[utoipa::path(
    post,
    path = "/api/v1/vendors",
    request_body = CreateVendorRequest,
    responses(
        (status = 201, description = "Vendor created"),
        (status = 400, description = "Invalid vendor details", body = crate::errors::ErrorResponse)
    ),
    tag = "vendors"
)]
pub async fn create_vendor(
    State(state): State<Arc<AppState>>,
    principal: AuthenticatedPrincipal,
    Json(payload): Json<CreateVendorRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require_any_role(&[Role::Procurement])?;
    let vendor = state.services.directory.create_vendor(payload).await?;
    Ok(created_response(vendor))
}

/// List vendors
#[utoipa::path(
    get,
    path = "/api/v1/vendors",
    responses((status = 200, description = "Vendors")),
    tag = "vendors"
)]
pub async fn list_vendors(
    State(state): State<Arc<AppState>>,
    _principal: AuthenticatedPrincipal,
) -> Result<impl IntoResponse, ServiceError> {
    let vendors = state.services.directory.list_vendors().await?;
    Ok(success_response(vendors))
}

/// Get a vendor by id
#[utoipa::path(
    get,
    path = "/api/v1/vendors/{id}",
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses(
        (status = 200, description = "Vendor"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "vendors"
)]
pub async fn get_vendor(
    State(state): State<Arc<AppState>>,
    _principal: AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let vendor = state.services.directory.find_vendor(id).await?;
    Ok(success_response(vendor))
}

/// Activate or deactivate a vendor
#[utoipa::path(
    patch,
    path = "/api/v1/vendors/{id}/active",
    params(("id" = Uuid, Path, description = "Vendor id")),
    request_body = VendorActiveRequest,
    responses(
        (status = 200, description = "Vendor active flag updated"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "vendors"
)]
pub async fn set_vendor_active(
    State(state): State<Arc<AppState>>,
    principal: AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
    Json(payload): Json<VendorActiveRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require_any_role(&[Role::Procurement])?;
    let vendor = state
        .services
        .directory
        .set_vendor_active(id, payload.active)
        .await?;
    Ok(success_response(vendor))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_vendor).get(list_vendors))
        .route("/:id", get(get_vendor))
        .route("/:id/active", patch(set_vendor_active))
}
