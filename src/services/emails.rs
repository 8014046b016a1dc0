use crate::{db::DbPool, entities::email_log, errors::ServiceError, models::AttemptStatus};
use async_trait::async_trait;
use base64::Engine;
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// A named binary attachment for an outbound email.
#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Outbound mail boundary. Implementations must return the provider's
/// message id on success.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send_email(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        html: &str,
        attachments: &[EmailAttachment],
    ) -> Result<String, ServiceError>;
}

/// Mail transport over the Resend HTTP API.
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl ResendMailer {
    const DEFAULT_ENDPOINT: &'static str = "https://api.resend.com/emails";

    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(api_key: String, endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint,
        }
    }
}

#[async_trait]
impl MailTransport for ResendMailer {
    async fn send_email(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        html: &str,
        attachments: &[EmailAttachment],
    ) -> Result<String, ServiceError> {
        let mut payload = serde_json::json!({
            "from": from,
            "to": [to],
            "subject": subject,
            "html": html,
        });
        if !attachments.is_empty() {
            let encoded: Vec<serde_json::Value> = attachments
                .iter()
                .map(|a| {
                    serde_json::json!({
                        "filename": a.filename,
                        "content": base64::engine::general_purpose::STANDARD.encode(&a.content),
                    })
                })
                .collect();
            payload["attachments"] = serde_json::Value::Array(encoded);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalFailure(format!("mail transport: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::ExternalFailure(format!(
                "mail transport returned {status}: {body}"
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ServiceError::ExternalFailure(format!("mail transport: {e}")))?;
        body.get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                ServiceError::ExternalFailure("mail transport returned no message id".into())
            })
    }
}

/// Transport used when no API key is configured: logs and reports
/// success so development environments work without credentials.
pub struct LoggingMailer;

#[async_trait]
impl MailTransport for LoggingMailer {
    async fn send_email(
        &self,
        _from: &str,
        to: &str,
        subject: &str,
        _html: &str,
        attachments: &[EmailAttachment],
    ) -> Result<String, ServiceError> {
        info!(
            to = %to,
            subject = %subject,
            attachments = attachments.len(),
            "mail transport not configured; dropping email"
        );
        Ok(format!("logged-{}", Uuid::new_v4()))
    }
}

/// Notification dispatcher: every send is recorded as an `email_logs`
/// row that starts PENDING and is finalized to SUCCESS or FAILED.
/// Failures on the fire-and-forget path never reach the caller; the
/// bounded retry sweep picks them up later.
#[derive(Clone)]
pub struct EmailService {
    db_pool: Arc<DbPool>,
    transport: Arc<dyn MailTransport>,
    default_from: String,
    retry_limit: i32,
    stale_pending_secs: i64,
}

impl EmailService {
    pub fn new(
        db_pool: Arc<DbPool>,
        transport: Arc<dyn MailTransport>,
        default_from: String,
        retry_limit: i32,
        stale_pending_secs: i64,
    ) -> Self {
        Self {
            db_pool,
            transport,
            default_from,
            retry_limit,
            stale_pending_secs,
        }
    }

    /// Fire-and-forget send: runs on a detached task so the triggering
    /// workflow call never waits on the mail transport. Only database
    /// errors are possible from the task, and those are logged.
    pub fn send(&self, from: Option<String>, to: String, subject: String, html: String) {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.deliver(from, to, subject, html).await {
                error!(error = %e, "background email delivery failed to record its log");
            }
        });
    }

    /// Creates the PENDING log row and performs one delivery attempt.
    /// Transport failures are captured in the row, not returned.
    #[instrument(skip(self, html), fields(to = %to, subject = %subject))]
    pub async fn deliver(
        &self,
        from: Option<String>,
        to: String,
        subject: String,
        html: String,
    ) -> Result<email_log::Model, ServiceError> {
        let log = self.create_log(&to, &subject, &html, 0).await?;
        self.attempt(log, from.as_deref(), &[]).await
    }

    /// Synchronous send used by the report scheduler. The log row is
    /// created with `retry_count` already at the ceiling so the email
    /// retry sweep skips it: the scheduler owns the retry decision for
    /// these sends and double-retrying would duplicate reports. Unlike
    /// the fire-and-forget path, a transport failure is re-thrown after
    /// being logged.
    #[instrument(skip(self, html, attachments), fields(to = %to, subject = %subject))]
    pub async fn send_with_attachments(
        &self,
        to: String,
        subject: String,
        html: String,
        attachments: Vec<EmailAttachment>,
    ) -> Result<email_log::Model, ServiceError> {
        let log = self
            .create_log(&to, &subject, &html, self.retry_limit)
            .await?;
        let finalized = self.attempt(log, None, &attachments).await?;

        if finalized.status == AttemptStatus::Failed.to_string() {
            let reason = finalized
                .error_message
                .clone()
                .unwrap_or_else(|| "mail transport failed".into());
            return Err(ServiceError::ExternalFailure(reason));
        }
        Ok(finalized)
    }

    /// Re-attempts delivery for an existing log row (retry sweep path).
    pub async fn retry(&self, log: email_log::Model) -> Result<email_log::Model, ServiceError> {
        self.attempt(log, None, &[]).await
    }

    /// Periodic retry sweep.
    ///
    /// First reconciles stale rows: anything PENDING longer than the
    /// staleness threshold is a crashed attempt and becomes FAILED so it
    /// re-enters the normal bounded retry. Then every FAILED row below
    /// the retry ceiling gets its count incremented, is reset to PENDING
    /// and re-attempted. Rows at the ceiling are left FAILED permanently.
    #[instrument(skip(self))]
    pub async fn retry_failed(&self) -> Result<usize, ServiceError> {
        self.reconcile_stale_pending().await?;

        let failed = email_log::Entity::find()
            .filter(email_log::Column::Status.eq(AttemptStatus::Failed.to_string()))
            .filter(email_log::Column::RetryCount.lt(self.retry_limit))
            .order_by_asc(email_log::Column::LastAttempt)
            .limit(50)
            .all(&*self.db_pool)
            .await?;

        let count = failed.len();
        for log in failed {
            let mut active: email_log::ActiveModel = log.into();
            active.retry_count = Set(active.retry_count.unwrap() + 1);
            active.status = Set(AttemptStatus::Pending.to_string());
            let pending = active.update(&*self.db_pool).await?;
            self.retry(pending).await?;
        }

        if count > 0 {
            info!(retried = count, "email retry sweep finished");
        }
        Ok(count)
    }

    /// Flips PENDING rows older than the staleness threshold to FAILED.
    pub async fn reconcile_stale_pending(&self) -> Result<u64, ServiceError> {
        let cutoff = Utc::now() - Duration::seconds(self.stale_pending_secs);
        let result = email_log::Entity::update_many()
            .col_expr(
                email_log::Column::Status,
                sea_orm::sea_query::Expr::value(AttemptStatus::Failed.to_string()),
            )
            .col_expr(
                email_log::Column::ErrorMessage,
                sea_orm::sea_query::Expr::value("attempt abandoned (stale pending)"),
            )
            .filter(email_log::Column::Status.eq(AttemptStatus::Pending.to_string()))
            .filter(email_log::Column::LastAttempt.lt(cutoff))
            .exec(&*self.db_pool)
            .await?;

        if result.rows_affected > 0 {
            warn!(
                reconciled = result.rows_affected,
                "stale PENDING email logs marked FAILED"
            );
        }
        Ok(result.rows_affected)
    }

    async fn create_log(
        &self,
        to: &str,
        subject: &str,
        html: &str,
        retry_count: i32,
    ) -> Result<email_log::Model, ServiceError> {
        let log = email_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            recipient: Set(to.to_string()),
            subject: Set(subject.to_string()),
            body: Set(html.to_string()),
            status: Set(AttemptStatus::Pending.to_string()),
            retry_count: Set(retry_count),
            last_attempt: Set(Utc::now()),
            error_message: Set(None),
        }
        .insert(&*self.db_pool)
        .await?;
        Ok(log)
    }

    /// One delivery attempt: calls the transport and finalizes the row
    /// to SUCCESS or FAILED. Never leaves the row PENDING.
    async fn attempt(
        &self,
        log: email_log::Model,
        from: Option<&str>,
        attachments: &[EmailAttachment],
    ) -> Result<email_log::Model, ServiceError> {
        let from = from.unwrap_or(&self.default_from);
        let outcome = self
            .transport
            .send_email(from, &log.recipient, &log.subject, &log.body, attachments)
            .await;

        let mut active: email_log::ActiveModel = log.into();
        match outcome {
            Ok(message_id) => {
                info!(message_id = %message_id, "email delivered");
                active.status = Set(AttemptStatus::Success.to_string());
                active.error_message = Set(None);
            }
            Err(e) => {
                warn!(error = %e, "email delivery failed");
                active.status = Set(AttemptStatus::Failed.to_string());
                active.error_message = Set(Some(e.to_string()));
            }
        }
        active.last_attempt = Set(Utc::now());
        Ok(active.update(&*self.db_pool).await?)
    }
}
