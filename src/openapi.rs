use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Procurement API",
        version = "1.0.0",
        description = r#"
# Procurement Workflow API

Purchase requisition and purchase order lifecycle management with GST
tax splitting, an append-only approval audit trail, email notifications
with bounded retry, and scheduled aggregate reports.

## Authentication

Authentication happens upstream. Requests must carry the
already-authenticated principal in headers:

- `x-principal-id`: the caller's user id (UUID)
- `x-principal-roles`: comma-separated role list (e.g. `PROCUREMENT,FINANCE`)

## Error Handling

Failed requests return a consistent payload with a stable machine
readable `code`:

```json
{
  "error": "Conflict",
  "code": "INVALID_STATE",
  "message": "Only SUBMITTED purchase requisitions can be approved",
  "timestamp": "2026-01-09T10:30:00.000Z"
}
```
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    paths(
        crate::handlers::purchase_requisitions::create_pr,
        crate::handlers::purchase_requisitions::list_prs,
        crate::handlers::purchase_requisitions::get_pr,
        crate::handlers::purchase_requisitions::update_pr,
        crate::handlers::purchase_requisitions::submit_pr,
        crate::handlers::purchase_requisitions::approve_pr,
        crate::handlers::purchase_requisitions::reject_pr,
        crate::handlers::purchase_requisitions::approval_history,
        crate::handlers::purchase_orders::create_po,
        crate::handlers::purchase_orders::list_pos,
        crate::handlers::purchase_orders::get_po,
        crate::handlers::purchase_orders::get_po_by_pr,
        crate::handlers::purchase_orders::invoice,
        crate::handlers::purchase_orders::deliver,
        crate::handlers::purchase_orders::close_po,
        crate::handlers::vendors::create_vendor,
        crate::handlers::vendors::list_vendors,
        crate::handlers::vendors::get_vendor,
        crate::handlers::vendors::set_vendor_active,
        crate::handlers::reports::generate_report,
        crate::handlers::reports::export_prs,
        crate::handlers::reports::export_vendors,
        crate::handlers::reports::export_pos,
        crate::handlers::health::health,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::services::purchase_requisitions::CreatePrRequest,
        crate::services::purchase_requisitions::UpdatePrRequest,
        crate::services::purchase_requisitions::ApprovalRequest,
        crate::services::purchase_orders::CreatePoRequest,
        crate::services::purchase_orders::DeliveryRequest,
        crate::services::purchase_orders::PoResponse,
        crate::services::directory::CreateVendorRequest,
        crate::handlers::vendors::VendorActiveRequest,
        crate::handlers::reports::GenerateReportRequest,
    )),
    tags(
        (name = "purchase-requisitions", description = "Purchase requisition workflow"),
        (name = "purchase-orders", description = "Purchase order lifecycle and delivery tracking"),
        (name = "vendors", description = "Vendor directory"),
        (name = "reports", description = "Scheduled and on-demand reports"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
