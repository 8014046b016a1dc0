pub mod common;
pub mod health;
pub mod purchase_orders;
pub mod purchase_requisitions;
pub mod reports;
pub mod vendors;

use crate::{
    config::AppConfig,
    db::DbPool,
    events::EventSender,
    services::{
        directory::DirectoryService,
        emails::{EmailService, MailTransport},
        purchase_orders::PoService,
        purchase_requisitions::PrService,
        reports::{CsvRenderer, ReportService},
    },
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub directory: DirectoryService,
    pub emails: Arc<EmailService>,
    pub purchase_requisitions: PrService,
    pub purchase_orders: PoService,
    pub reports: Arc<ReportService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: EventSender,
        transport: Arc<dyn MailTransport>,
        config: &AppConfig,
    ) -> Self {
        let directory = DirectoryService::new(db_pool.clone());
        let emails = Arc::new(EmailService::new(
            db_pool.clone(),
            transport,
            config.mail.from.clone(),
            config.mail.retry_limit,
            config.mail.stale_pending_secs,
        ));
        let purchase_requisitions = PrService::new(
            db_pool.clone(),
            directory.clone(),
            emails.clone(),
            event_sender.clone(),
            config.budget_limit(),
        );
        let purchase_orders = PoService::new(db_pool.clone(), event_sender);
        let reports = Arc::new(ReportService::new(
            db_pool,
            emails.clone(),
            Arc::new(CsvRenderer),
            config.reports.email.clone(),
            config.reports.retry_limit,
        ));

        Self {
            directory,
            emails,
            purchase_requisitions,
            purchase_orders,
            reports,
        }
    }
}
