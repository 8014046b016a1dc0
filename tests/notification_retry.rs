mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use common::{setup, RETRY_LIMIT};
use procurement_api::{
    entities::email_log,
    errors::ServiceError,
    models::AttemptStatus,
    services::emails::EmailAttachment,
};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

#[tokio::test]
async fn successful_delivery_finalizes_the_log_to_success() {
    let ctx = setup().await;

    let log = ctx
        .emails
        .deliver(
            None,
            "alice@example.test".into(),
            "Hello".into(),
            "<p>hi</p>".into(),
        )
        .await
        .unwrap();

    assert_eq!(log.status, AttemptStatus::Success.to_string());
    assert_eq!(log.retry_count, 0);
    assert!(log.error_message.is_none());

    let sent = ctx.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "alice@example.test");
    assert_eq!(sent[0].subject, "Hello");
}

#[tokio::test]
async fn transport_failure_is_captured_not_propagated() {
    let ctx = setup().await;
    ctx.mailer.set_failing(true);

    let log = ctx
        .emails
        .deliver(
            None,
            "alice@example.test".into(),
            "Hello".into(),
            "<p>hi</p>".into(),
        )
        .await
        .unwrap();

    assert_eq!(log.status, AttemptStatus::Failed.to_string());
    assert_eq!(log.retry_count, 0);
    assert!(log.error_message.as_deref().unwrap().contains("outage"));
}

#[tokio::test]
async fn sweep_retries_failed_logs_and_increments_the_count() {
    let ctx = setup().await;
    ctx.mailer.set_failing(true);
    let log = ctx
        .emails
        .deliver(None, "a@example.test".into(), "S".into(), "B".into())
        .await
        .unwrap();

    ctx.mailer.set_failing(false);
    let retried = ctx.emails.retry_failed().await.unwrap();
    assert_eq!(retried, 1);

    let log = email_log::Entity::find_by_id(log.id)
        .one(&*ctx.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(log.status, AttemptStatus::Success.to_string());
    assert_eq!(log.retry_count, 1);
    assert_eq!(ctx.mailer.sent().len(), 1);
}

#[tokio::test]
async fn sweep_stops_at_the_retry_ceiling() {
    let ctx = setup().await;
    ctx.mailer.set_failing(true);
    let log = ctx
        .emails
        .deliver(None, "a@example.test".into(), "S".into(), "B".into())
        .await
        .unwrap();

    for expected_count in 1..=RETRY_LIMIT {
        assert_eq!(ctx.emails.retry_failed().await.unwrap(), 1);
        let row = email_log::Entity::find_by_id(log.id)
            .one(&*ctx.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.retry_count, expected_count);
        assert_eq!(row.status, AttemptStatus::Failed.to_string());
    }

    // at the ceiling the row is left FAILED permanently
    assert_eq!(ctx.emails.retry_failed().await.unwrap(), 0);
}

#[tokio::test]
async fn a_log_one_below_the_ceiling_gets_exactly_one_more_attempt() {
    let ctx = setup().await;
    let log = email_log::ActiveModel {
        id: Set(Uuid::new_v4()),
        recipient: Set("a@example.test".into()),
        subject: Set("S".into()),
        body: Set("B".into()),
        status: Set(AttemptStatus::Failed.to_string()),
        retry_count: Set(RETRY_LIMIT - 1),
        last_attempt: Set(Utc::now()),
        error_message: Set(Some("earlier failure".into())),
    }
    .insert(&*ctx.db)
    .await
    .unwrap();

    assert_eq!(ctx.emails.retry_failed().await.unwrap(), 1);
    let row = email_log::Entity::find_by_id(log.id)
        .one(&*ctx.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.retry_count, RETRY_LIMIT);
    assert_eq!(row.status, AttemptStatus::Success.to_string());

    assert_eq!(ctx.emails.retry_failed().await.unwrap(), 0);
}

#[tokio::test]
async fn attachment_sends_fail_loudly_and_are_not_swept() {
    let ctx = setup().await;
    ctx.mailer.set_failing(true);

    let err = ctx
        .emails
        .send_with_attachments(
            "ops@example.test".into(),
            "Reports".into(),
            "<p>attached</p>".into(),
            vec![EmailAttachment {
                filename: "r.csv".into(),
                content: b"a,b\n".to_vec(),
            }],
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ExternalFailure(_));

    let logs = email_log::Entity::find().all(&*ctx.db).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, AttemptStatus::Failed.to_string());
    assert_eq!(logs[0].retry_count, RETRY_LIMIT);

    // the email sweep must not duplicate scheduler-owned sends
    assert_eq!(ctx.emails.retry_failed().await.unwrap(), 0);
}

#[tokio::test]
async fn stale_pending_rows_are_reconciled_to_failed() {
    let ctx = setup().await;
    let log = email_log::ActiveModel {
        id: Set(Uuid::new_v4()),
        recipient: Set("a@example.test".into()),
        subject: Set("S".into()),
        body: Set("B".into()),
        status: Set(AttemptStatus::Pending.to_string()),
        retry_count: Set(0),
        last_attempt: Set(Utc::now() - Duration::hours(2)),
        error_message: Set(None),
    }
    .insert(&*ctx.db)
    .await
    .unwrap();

    let reconciled = ctx.emails.reconcile_stale_pending().await.unwrap();
    assert_eq!(reconciled, 1);

    let row = email_log::Entity::find_by_id(log.id)
        .one(&*ctx.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, AttemptStatus::Failed.to_string());
    assert!(row.error_message.as_deref().unwrap().contains("stale"));
}

#[tokio::test]
async fn fresh_pending_rows_are_left_alone() {
    let ctx = setup().await;
    email_log::ActiveModel {
        id: Set(Uuid::new_v4()),
        recipient: Set("a@example.test".into()),
        subject: Set("S".into()),
        body: Set("B".into()),
        status: Set(AttemptStatus::Pending.to_string()),
        retry_count: Set(0),
        last_attempt: Set(Utc::now()),
        error_message: Set(None),
    }
    .insert(&*ctx.db)
    .await
    .unwrap();

    assert_eq!(ctx.emails.reconcile_stale_pending().await.unwrap(), 0);
}
