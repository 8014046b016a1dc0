use super::common::{download_response, success_response};
use crate::{
    auth::AuthenticatedPrincipal,
    errors::ServiceError,
    handlers::AppState,
    models::{ReportType, Role},
};
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateReportRequest {
    pub report_type: ReportType,
}

/// Trigger an out-of-schedule report generation and email
#[utoipa::path(
    post,
    path = "/api/v1/reports/generate",
    request_body = GenerateReportRequest,
    responses(
        (status = 200, description = "Report generation attempted; outcome recorded in the log"),
        (status = 403, description = "Caller not eligible", body = crate::errors::ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn generate_report(
    State(state): State<Arc<AppState>>,
    principal: AuthenticatedPrincipal,
    Json(payload): Json<GenerateReportRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require_any_role(&[Role::Finance])?;
    let log = state
        .services
        .reports
        .generate_and_send(payload.report_type)
        .await?;
    Ok(success_response(log))
}

/// Download the purchase requisition export
#[utoipa::path(
    get,
    path = "/api/v1/reports/purchase-requisitions",
    responses((status = 200, description = "CSV export", content_type = "text/csv")),
    tag = "reports"
)]
pub async fn export_prs(
    State(state): State<Arc<AppState>>,
    principal: AuthenticatedPrincipal,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require_any_role(&[Role::Finance, Role::Procurement])?;
    let report = state.services.reports.export_pr_report().await?;
    Ok(download_response(report))
}

/// Download the vendor export
#[utoipa::path(
    get,
    path = "/api/v1/reports/vendors",
    responses((status = 200, description = "CSV export", content_type = "text/csv")),
    tag = "reports"
)]
pub async fn export_vendors(
    State(state): State<Arc<AppState>>,
    principal: AuthenticatedPrincipal,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require_any_role(&[Role::Finance, Role::Procurement])?;
    let report = state.services.reports.export_vendor_report().await?;
    Ok(download_response(report))
}

/// Download the purchase order export
#[utoipa::path(
    get,
    path = "/api/v1/reports/purchase-orders",
    responses((status = 200, description = "CSV export", content_type = "text/csv")),
    tag = "reports"
)]
pub async fn export_pos(
    State(state): State<Arc<AppState>>,
    principal: AuthenticatedPrincipal,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require_any_role(&[Role::Finance, Role::Procurement])?;
    let report = state.services.reports.export_po_report().await?;
    Ok(download_response(report))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(generate_report))
        .route("/purchase-requisitions", get(export_prs))
        .route("/vendors", get(export_vendors))
        .route("/purchase-orders", get(export_pos))
}
