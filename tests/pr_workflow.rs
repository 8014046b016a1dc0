mod common;

use common::{seed_user, seed_vendor, setup};
use procurement_api::{
    models::{PrStatus, Role},
    services::purchase_requisitions::{ApprovalRequest, CreatePrRequest, UpdatePrRequest},
};
use rust_decimal_macros::dec;

fn request(
    vendor_id: uuid::Uuid,
    requester_id: uuid::Uuid,
) -> CreatePrRequest {
    CreatePrRequest {
        vendor_id,
        requester_id,
        items: vec!["Paper".into(), "Pen".into()],
        quantities: vec![10, 5],
        unit_amounts: vec![dec!(100), dec!(20)],
    }
}

#[tokio::test]
async fn create_pr_starts_in_draft_with_computed_total() {
    let ctx = setup().await;
    let vendor = seed_vendor(&ctx.db, true).await;
    let requester = seed_user(&ctx.db, Role::Procurement).await;

    let pr = ctx.prs.create_pr(request(vendor.id, requester.id)).await.unwrap();

    assert_eq!(pr.status, PrStatus::Draft.to_string());
    assert_eq!(pr.total_amount, dec!(1100));
    assert_eq!(pr.version, 1);
    assert!(pr.pr_number.starts_with("PR-"));
    assert!(pr.updated_at.is_none());
}

#[tokio::test]
async fn inactive_vendor_is_rejected() {
    let ctx = setup().await;
    let vendor = seed_vendor(&ctx.db, false).await;
    let requester = seed_user(&ctx.db, Role::Procurement).await;

    let err = ctx.prs.create_pr(request(vendor.id, requester.id)).await.unwrap_err();
    assert_eq!(err.error_code(), "VENDOR_INACTIVE");
}

#[tokio::test]
async fn unknown_requester_is_rejected() {
    let ctx = setup().await;
    let vendor = seed_vendor(&ctx.db, true).await;

    let err = ctx
        .prs
        .create_pr(request(vendor.id, uuid::Uuid::new_v4()))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
}

#[tokio::test]
async fn totals_above_the_budget_ceiling_are_rejected() {
    let ctx = setup().await;
    let vendor = seed_vendor(&ctx.db, true).await;
    let requester = seed_user(&ctx.db, Role::Procurement).await;

    let mut req = request(vendor.id, requester.id);
    req.items = vec!["Server rack".into()];
    req.quantities = vec![2];
    req.unit_amounts = vec![dec!(250000.01)];

    let err = ctx.prs.create_pr(req).await.unwrap_err();
    assert_eq!(err.error_code(), "BUDGET_EXCEEDED");
}

#[tokio::test]
async fn a_total_exactly_at_the_ceiling_is_allowed() {
    let ctx = setup().await;
    let vendor = seed_vendor(&ctx.db, true).await;
    let requester = seed_user(&ctx.db, Role::Procurement).await;

    let mut req = request(vendor.id, requester.id);
    req.items = vec!["Bulk order".into()];
    req.quantities = vec![1];
    req.unit_amounts = vec![dec!(500000)];

    let pr = ctx.prs.create_pr(req).await.unwrap();
    assert_eq!(pr.total_amount, dec!(500000));
}

#[tokio::test]
async fn draft_edits_recompute_the_total_and_bump_the_version() {
    let ctx = setup().await;
    let vendor = seed_vendor(&ctx.db, true).await;
    let requester = seed_user(&ctx.db, Role::Procurement).await;
    let pr = ctx.prs.create_pr(request(vendor.id, requester.id)).await.unwrap();

    let updated = ctx
        .prs
        .update_pr(
            pr.id,
            UpdatePrRequest {
                items: vec!["Paper".into()],
                quantities: vec![20],
                unit_amounts: vec![dec!(90)],
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.total_amount, dec!(1800));
    assert_eq!(updated.version, 2);
    assert!(updated.updated_at.is_some());
}

#[tokio::test]
async fn submitted_prs_cannot_be_edited() {
    let ctx = setup().await;
    let vendor = seed_vendor(&ctx.db, true).await;
    let requester = seed_user(&ctx.db, Role::Procurement).await;
    let pr = ctx.prs.create_pr(request(vendor.id, requester.id)).await.unwrap();
    ctx.prs.submit_pr(pr.id).await.unwrap();

    let err = ctx
        .prs
        .update_pr(
            pr.id,
            UpdatePrRequest {
                items: vec!["Paper".into()],
                quantities: vec![1],
                unit_amounts: vec![dec!(1)],
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_STATE");
}

#[tokio::test]
async fn submit_moves_draft_to_submitted_exactly_once() {
    let ctx = setup().await;
    let vendor = seed_vendor(&ctx.db, true).await;
    let requester = seed_user(&ctx.db, Role::Procurement).await;
    let pr = ctx.prs.create_pr(request(vendor.id, requester.id)).await.unwrap();

    let submitted = ctx.prs.submit_pr(pr.id).await.unwrap();
    assert_eq!(submitted.status, PrStatus::Submitted.to_string());

    let err = ctx.prs.submit_pr(pr.id).await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_STATE");
}

#[tokio::test]
async fn approval_records_the_decision_in_the_audit_trail() {
    let ctx = setup().await;
    let vendor = seed_vendor(&ctx.db, true).await;
    let requester = seed_user(&ctx.db, Role::Procurement).await;
    let approver = seed_user(&ctx.db, Role::Approver).await;
    let pr = ctx.prs.create_pr(request(vendor.id, requester.id)).await.unwrap();
    ctx.prs.submit_pr(pr.id).await.unwrap();

    let approved = ctx
        .prs
        .approve_pr(
            pr.id,
            approver.id,
            ApprovalRequest {
                comments: Some("within budget".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(approved.status, PrStatus::Approved.to_string());

    let history = ctx.prs.approval_history(pr.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, "APPROVED");
    assert_eq!(history[0].approver_id, approver.id);
    assert_eq!(history[0].comments.as_deref(), Some("within budget"));
}

#[tokio::test]
async fn rejection_is_terminal() {
    let ctx = setup().await;
    let vendor = seed_vendor(&ctx.db, true).await;
    let requester = seed_user(&ctx.db, Role::Procurement).await;
    let approver = seed_user(&ctx.db, Role::Approver).await;
    let pr = ctx.prs.create_pr(request(vendor.id, requester.id)).await.unwrap();
    ctx.prs.submit_pr(pr.id).await.unwrap();

    let rejected = ctx
        .prs
        .reject_pr(pr.id, approver.id, ApprovalRequest::default())
        .await
        .unwrap();
    assert_eq!(rejected.status, PrStatus::Rejected.to_string());

    let err = ctx
        .prs
        .approve_pr(pr.id, approver.id, ApprovalRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_STATE");
}

#[tokio::test]
async fn draft_prs_cannot_be_decided() {
    let ctx = setup().await;
    let vendor = seed_vendor(&ctx.db, true).await;
    let requester = seed_user(&ctx.db, Role::Procurement).await;
    let approver = seed_user(&ctx.db, Role::Approver).await;
    let pr = ctx.prs.create_pr(request(vendor.id, requester.id)).await.unwrap();

    let err = ctx
        .prs
        .approve_pr(pr.id, approver.id, ApprovalRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_STATE");
}

#[tokio::test]
async fn list_filters_by_status() {
    let ctx = setup().await;
    let vendor = seed_vendor(&ctx.db, true).await;
    let requester = seed_user(&ctx.db, Role::Procurement).await;

    let draft = ctx.prs.create_pr(request(vendor.id, requester.id)).await.unwrap();
    let submitted = ctx.prs.create_pr(request(vendor.id, requester.id)).await.unwrap();
    ctx.prs.submit_pr(submitted.id).await.unwrap();

    let drafts = ctx.prs.list_prs(Some(PrStatus::Draft), 1, 20).await.unwrap();
    assert_eq!(drafts.total, 1);
    assert_eq!(drafts.purchase_requisitions[0].id, draft.id);

    let all = ctx.prs.list_prs(None, 1, 20).await.unwrap();
    assert_eq!(all.total, 2);
    assert_eq!(all.purchase_requisitions.len(), 2);

    let first_page = ctx.prs.list_prs(None, 1, 1).await.unwrap();
    assert_eq!(first_page.total, 2);
    assert_eq!(first_page.purchase_requisitions.len(), 1);
}
