//! Shared fixtures: an in-memory database with the full schema applied,
//! seeded directory rows, and a recording mail transport whose failure
//! behavior can be toggled per test.

use async_trait::async_trait;
use chrono::Utc;
use procurement_api::{
    db::{self, DbPool},
    entities::{user, vendor},
    errors::ServiceError,
    events::EventSender,
    models::Role,
    services::{
        directory::DirectoryService,
        emails::{EmailAttachment, EmailService, MailTransport},
        purchase_orders::PoService,
        purchase_requisitions::PrService,
        reports::{CsvRenderer, ReportService},
    },
};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use tokio::sync::mpsc;
use uuid::Uuid;

pub const REPORTS_EMAIL: &str = "ops@example.test";
pub const RETRY_LIMIT: i32 = 3;

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub attachment_names: Vec<String>,
}

/// Transport double: records every accepted send and fails on demand.
#[derive(Default)]
pub struct RecordingMailer {
    fail: AtomicBool,
    sent: Mutex<Vec<SentEmail>>,
}

impl RecordingMailer {
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send_email(
        &self,
        _from: &str,
        to: &str,
        subject: &str,
        _html: &str,
        attachments: &[EmailAttachment],
    ) -> Result<String, ServiceError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ServiceError::ExternalFailure("simulated outage".into()));
        }
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            attachment_names: attachments.iter().map(|a| a.filename.clone()).collect(),
        });
        Ok(format!("msg-{}", Uuid::new_v4()))
    }
}

pub struct TestContext {
    pub db: Arc<DbPool>,
    pub mailer: Arc<RecordingMailer>,
    pub directory: DirectoryService,
    pub emails: Arc<EmailService>,
    pub prs: PrService,
    pub pos: PoService,
    pub reports: Arc<ReportService>,
    // keeps event emission from failing mid-test
    _event_rx: mpsc::Receiver<procurement_api::events::Event>,
}

pub async fn setup() -> TestContext {
    let db = Arc::new(
        db::establish_connection("sqlite::memory:")
            .await
            .expect("connect in-memory db"),
    );
    db::run_migrations(&db).await.expect("run migrations");

    let mailer = Arc::new(RecordingMailer::default());
    let (event_tx, event_rx) = mpsc::channel(256);
    let event_sender = EventSender::new(event_tx);

    let directory = DirectoryService::new(db.clone());
    let emails = Arc::new(EmailService::new(
        db.clone(),
        mailer.clone(),
        "noreply@example.test".into(),
        RETRY_LIMIT,
        1800,
    ));
    let prs = PrService::new(
        db.clone(),
        directory.clone(),
        emails.clone(),
        event_sender.clone(),
        dec!(500000),
    );
    let pos = PoService::new(db.clone(), event_sender);
    let reports = Arc::new(ReportService::new(
        db.clone(),
        emails.clone(),
        Arc::new(CsvRenderer),
        REPORTS_EMAIL.into(),
        RETRY_LIMIT,
    ));

    TestContext {
        db,
        mailer,
        directory,
        emails,
        prs,
        pos,
        reports,
        _event_rx: event_rx,
    }
}

pub async fn seed_vendor(db: &DbPool, active: bool) -> vendor::Model {
    vendor::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Vendor {}", Uuid::new_v4())),
        contact_email: Set("vendor@example.test".into()),
        is_active: Set(active),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("seed vendor")
}

pub async fn seed_user(db: &DbPool, role: Role) -> user::Model {
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Test User".into()),
        email: Set(format!("user-{}@example.test", Uuid::new_v4())),
        role: Set(role.to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("seed user")
}
