//! Procurement workflow service: purchase requisitions, purchase orders
//! with GST splitting, approval audit trail, email notifications with
//! bounded retry, and scheduled reports.

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod ids;
pub mod jobs;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod services;

use axum::Router;
use std::sync::Arc;

/// Shared state handed to every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<db::DbPool>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

/// All `/api/v1` routes, grouped per resource.
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest(
            "/purchase-requisitions",
            handlers::purchase_requisitions::routes(),
        )
        .nest("/purchase-orders", handlers::purchase_orders::routes())
        .nest("/vendors", handlers::vendors::routes())
        .nest("/reports", handlers::reports::routes())
}
