use crate::{
    db::DbPool,
    entities::{purchase_order, purchase_requisition, report_log, vendor},
    errors::ServiceError,
    models::{AttemptStatus, ReportType},
    services::emails::{EmailAttachment, EmailService},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Already-fetched row data handed to the renderer.
#[derive(Debug, Clone)]
pub struct TabularReport {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Rendering boundary: receives row data, returns an opaque byte
/// payload. PDF or spreadsheet renderers plug in behind the same trait;
/// the in-tree implementation is CSV.
pub trait ReportRenderer: Send + Sync {
    fn content_type(&self) -> &'static str;
    fn file_extension(&self) -> &'static str;
    fn render_table(&self, report: &TabularReport) -> Result<Vec<u8>, ServiceError>;
}

pub struct CsvRenderer;

impl ReportRenderer for CsvRenderer {
    fn content_type(&self) -> &'static str {
        "text/csv"
    }

    fn file_extension(&self) -> &'static str {
        "csv"
    }

    fn render_table(&self, report: &TabularReport) -> Result<Vec<u8>, ServiceError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&report.columns)
            .map_err(|e| ServiceError::ExternalFailure(format!("report renderer: {e}")))?;
        for row in &report.rows {
            writer
                .write_record(row)
                .map_err(|e| ServiceError::ExternalFailure(format!("report renderer: {e}")))?;
        }
        writer
            .into_inner()
            .map_err(|e| ServiceError::ExternalFailure(format!("report renderer: {e}")))
    }
}

/// A rendered export ready to attach or return over HTTP.
#[derive(Debug)]
pub struct RenderedReport {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Report scheduler: periodic aggregate exports mailed to a fixed
/// operations mailbox, with the same bounded-retry discipline as the
/// notification dispatcher but reusing the same log row across retries.
#[derive(Clone)]
pub struct ReportService {
    db_pool: Arc<DbPool>,
    emails: Arc<EmailService>,
    renderer: Arc<dyn ReportRenderer>,
    reports_email: String,
    retry_limit: i32,
}

impl ReportService {
    pub fn new(
        db_pool: Arc<DbPool>,
        emails: Arc<EmailService>,
        renderer: Arc<dyn ReportRenderer>,
        reports_email: String,
        retry_limit: i32,
    ) -> Self {
        Self {
            db_pool,
            emails,
            renderer,
            reports_email,
            retry_limit,
        }
    }

    /// Scheduled entry point: creates a fresh PENDING log and runs one
    /// generation attempt against it. Generation or send failures are
    /// captured into the row, never propagated to the timer loop.
    #[instrument(skip(self))]
    pub async fn generate_and_send(
        &self,
        report_type: ReportType,
    ) -> Result<report_log::Model, ServiceError> {
        let log = report_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            report_type: Set(report_type.to_string()),
            status: Set(AttemptStatus::Pending.to_string()),
            generated_at: Set(Utc::now()),
            retry_count: Set(0),
            error_message: Set(None),
        }
        .insert(&*self.db_pool)
        .await?;

        self.process(log, report_type).await
    }

    /// Periodic retry sweep: every FAILED log below the retry ceiling
    /// gets its count incremented and generation re-run against the
    /// same row (the row is reused, not replaced).
    #[instrument(skip(self))]
    pub async fn retry_failed(&self) -> Result<usize, ServiceError> {
        let failed = report_log::Entity::find()
            .filter(report_log::Column::Status.eq(AttemptStatus::Failed.to_string()))
            .filter(report_log::Column::RetryCount.lt(self.retry_limit))
            .order_by_asc(report_log::Column::GeneratedAt)
            .all(&*self.db_pool)
            .await?;

        let mut retried = 0;
        for log in failed {
            // a row with an unparseable type must not block the sweep
            let report_type: ReportType = match log.report_type.parse() {
                Ok(t) => t,
                Err(_) => {
                    warn!(
                        log_id = %log.id,
                        report_type = %log.report_type,
                        "report log has unknown report type; skipping"
                    );
                    continue;
                }
            };

            let mut active: report_log::ActiveModel = log.into();
            active.retry_count = Set(active.retry_count.unwrap() + 1);
            let log = active.update(&*self.db_pool).await?;
            self.process(log, report_type).await?;
            retried += 1;
        }

        if retried > 0 {
            info!(retried, "report retry sweep finished");
        }
        Ok(retried)
    }

    /// One generation attempt against an existing log row: snapshot the
    /// ledger, render the PR and vendor tables, mail both as attachments
    /// and finalize the row. The row always ends SUCCESS or FAILED.
    async fn process(
        &self,
        log: report_log::Model,
        report_type: ReportType,
    ) -> Result<report_log::Model, ServiceError> {
        let mut active: report_log::ActiveModel = log.into();
        active.status = Set(AttemptStatus::Pending.to_string());
        active.generated_at = Set(Utc::now());
        let log = active.update(&*self.db_pool).await?;

        let outcome = self.build_and_send(report_type).await;

        let mut active: report_log::ActiveModel = log.into();
        match outcome {
            Ok(()) => {
                active.status = Set(AttemptStatus::Success.to_string());
                active.error_message = Set(None);
            }
            Err(e) => {
                warn!(error = %e, report_type = %report_type, "report generation failed");
                active.status = Set(AttemptStatus::Failed.to_string());
                active.error_message = Set(Some(e.to_string()));
            }
        }
        Ok(active.update(&*self.db_pool).await?)
    }

    async fn build_and_send(&self, report_type: ReportType) -> Result<(), ServiceError> {
        let pr_export = self.export_pr_report().await?;
        let vendor_export = self.export_vendor_report().await?;

        let attachments = vec![
            EmailAttachment {
                filename: pr_export.filename,
                content: pr_export.bytes,
            },
            EmailAttachment {
                filename: vendor_export.filename,
                content: vendor_export.bytes,
            },
        ];

        self.emails
            .send_with_attachments(
                self.reports_email.clone(),
                format!("{report_type} Procurement Reports"),
                "<p>Attached are the PR and Vendor reports.</p>".to_string(),
                attachments,
            )
            .await?;
        Ok(())
    }

    /// On-demand PR export, also used as the scheduled PR attachment.
    pub async fn export_pr_report(&self) -> Result<RenderedReport, ServiceError> {
        let prs = purchase_requisition::Entity::find()
            .order_by_asc(purchase_requisition::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;
        self.render("pr-report", pr_report(&prs))
    }

    /// On-demand vendor export, also used as the scheduled vendor attachment.
    pub async fn export_vendor_report(&self) -> Result<RenderedReport, ServiceError> {
        let vendors = vendor::Entity::find()
            .order_by_asc(vendor::Column::Name)
            .all(&*self.db_pool)
            .await?;
        self.render("vendor-report", vendor_report(&vendors))
    }

    /// On-demand PO export.
    pub async fn export_po_report(&self) -> Result<RenderedReport, ServiceError> {
        let pos = purchase_order::Entity::find()
            .order_by_asc(purchase_order::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;
        self.render("po-report", po_report(&pos))
    }

    /// Invoice download for a single PO, rendered as a field/value table.
    pub async fn export_po_invoice(&self, po_id: Uuid) -> Result<RenderedReport, ServiceError> {
        let po = purchase_order::Entity::find_by_id(po_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Purchase order {po_id} not found")))?;
        let name = format!("invoice-{}", po.po_number);
        self.render(&name, po_invoice(&po))
    }

    fn render(&self, name: &str, report: TabularReport) -> Result<RenderedReport, ServiceError> {
        let bytes = self.renderer.render_table(&report)?;
        Ok(RenderedReport {
            filename: format!("{name}.{}", self.renderer.file_extension()),
            content_type: self.renderer.content_type(),
            bytes,
        })
    }
}

fn pr_report(prs: &[purchase_requisition::Model]) -> TabularReport {
    TabularReport {
        name: "purchase_requisitions".into(),
        columns: vec![
            "pr_number".into(),
            "status".into(),
            "vendor_id".into(),
            "requester_id".into(),
            "total_amount".into(),
            "created_at".into(),
        ],
        rows: prs
            .iter()
            .map(|pr| {
                vec![
                    pr.pr_number.clone(),
                    pr.status.clone(),
                    pr.vendor_id.to_string(),
                    pr.requester_id.to_string(),
                    pr.total_amount.to_string(),
                    pr.created_at.to_rfc3339(),
                ]
            })
            .collect(),
    }
}

fn vendor_report(vendors: &[vendor::Model]) -> TabularReport {
    TabularReport {
        name: "vendors".into(),
        columns: vec![
            "name".into(),
            "contact_email".into(),
            "is_active".into(),
            "created_at".into(),
        ],
        rows: vendors
            .iter()
            .map(|v| {
                vec![
                    v.name.clone(),
                    v.contact_email.clone(),
                    v.is_active.to_string(),
                    v.created_at.to_rfc3339(),
                ]
            })
            .collect(),
    }
}

fn po_report(pos: &[purchase_order::Model]) -> TabularReport {
    TabularReport {
        name: "purchase_orders".into(),
        columns: vec![
            "po_number".into(),
            "pr_id".into(),
            "status".into(),
            "base_amount".into(),
            "total_gst_amount".into(),
            "total_amount".into(),
            "delivered_quantity".into(),
            "total_quantity".into(),
        ],
        rows: pos
            .iter()
            .map(|po| {
                vec![
                    po.po_number.clone(),
                    po.pr_id.to_string(),
                    po.status.clone(),
                    po.base_amount.to_string(),
                    po.total_gst_amount.to_string(),
                    po.total_amount.to_string(),
                    po.delivered_quantity.to_string(),
                    po.total_quantity.to_string(),
                ]
            })
            .collect(),
    }
}

fn po_invoice(po: &purchase_order::Model) -> TabularReport {
    TabularReport {
        name: "po_invoice".into(),
        columns: vec!["field".into(), "value".into()],
        rows: vec![
            vec!["po_number".into(), po.po_number.clone()],
            vec!["status".into(), po.status.clone()],
            vec!["base_amount".into(), po.base_amount.to_string()],
            vec!["cgst_amount".into(), po.cgst_amount.to_string()],
            vec!["sgst_amount".into(), po.sgst_amount.to_string()],
            vec!["igst_amount".into(), po.igst_amount.to_string()],
            vec!["total_gst_amount".into(), po.total_gst_amount.to_string()],
            vec!["total_amount".into(), po.total_amount.to_string()],
            vec!["total_quantity".into(), po.total_quantity.to_string()],
            vec!["delivered_quantity".into(), po.delivered_quantity.to_string()],
            vec!["created_at".into(), po.created_at.to_rfc3339()],
        ],
    }
}
