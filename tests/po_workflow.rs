mod common;

use common::{seed_user, seed_vendor, setup, TestContext};
use procurement_api::{
    entities::purchase_requisition,
    models::{PoStatus, Role},
    services::{
        purchase_orders::{CreatePoRequest, DeliveryRequest, PoResponse},
        purchase_requisitions::{ApprovalRequest, CreatePrRequest},
    },
};
use rust_decimal_macros::dec;

async fn approved_pr(ctx: &TestContext) -> purchase_requisition::Model {
    let vendor = seed_vendor(&ctx.db, true).await;
    let requester = seed_user(&ctx.db, Role::Procurement).await;
    let approver = seed_user(&ctx.db, Role::Approver).await;

    let pr = ctx
        .prs
        .create_pr(CreatePrRequest {
            vendor_id: vendor.id,
            requester_id: requester.id,
            items: vec!["Paper".into(), "Pen".into()],
            quantities: vec![10, 5],
            unit_amounts: vec![dec!(100), dec!(20)],
        })
        .await
        .unwrap();
    ctx.prs.submit_pr(pr.id).await.unwrap();
    ctx.prs
        .approve_pr(pr.id, approver.id, ApprovalRequest::default())
        .await
        .unwrap()
}

fn gst_request(pr_id: uuid::Uuid) -> CreatePoRequest {
    CreatePoRequest {
        pr_id,
        cgst_percent: dec!(9),
        sgst_percent: dec!(9),
        igst_percent: dec!(0),
    }
}

#[tokio::test]
async fn po_creation_splits_gst_and_sums_quantities() {
    let ctx = setup().await;
    let pr = approved_pr(&ctx).await;

    let po = ctx.pos.create_po(gst_request(pr.id)).await.unwrap();

    assert!(po.po_number.starts_with("PO-"));
    assert_eq!(po.status, PoStatus::Created.to_string());
    assert_eq!(po.base_amount, dec!(1100));
    assert_eq!(po.cgst_amount, dec!(99.00));
    assert_eq!(po.sgst_amount, dec!(99.00));
    assert_eq!(po.igst_amount, dec!(0.00));
    assert_eq!(po.total_gst_amount, dec!(198.00));
    assert_eq!(po.total_amount, dec!(1298.00));
    assert_eq!(po.total_quantity, 15);
    assert_eq!(po.delivered_quantity, 0);
}

#[tokio::test]
async fn po_requires_an_approved_pr() {
    let ctx = setup().await;
    let vendor = seed_vendor(&ctx.db, true).await;
    let requester = seed_user(&ctx.db, Role::Procurement).await;
    let pr = ctx
        .prs
        .create_pr(CreatePrRequest {
            vendor_id: vendor.id,
            requester_id: requester.id,
            items: vec!["Paper".into()],
            quantities: vec![1],
            unit_amounts: vec![dec!(10)],
        })
        .await
        .unwrap();

    let err = ctx.pos.create_po(gst_request(pr.id)).await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_STATE");
}

#[tokio::test]
async fn only_one_po_per_pr() {
    let ctx = setup().await;
    let pr = approved_pr(&ctx).await;
    ctx.pos.create_po(gst_request(pr.id)).await.unwrap();

    let err = ctx.pos.create_po(gst_request(pr.id)).await.unwrap_err();
    assert_eq!(err.error_code(), "CONFLICT");
}

#[tokio::test]
async fn negative_gst_percent_is_rejected() {
    let ctx = setup().await;
    let pr = approved_pr(&ctx).await;

    let mut req = gst_request(pr.id);
    req.igst_percent = dec!(-1);
    let err = ctx.pos.create_po(req).await.unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn delivery_counters_drive_the_status() {
    let ctx = setup().await;
    let pr = approved_pr(&ctx).await;
    let po = ctx.pos.create_po(gst_request(pr.id)).await.unwrap();

    let po = ctx
        .pos
        .update_delivery(po.id, DeliveryRequest { quantity: 5 })
        .await
        .unwrap();
    assert_eq!(po.status, PoStatus::PartialDelivered.to_string());
    assert_eq!(po.delivered_quantity, 5);

    let response = PoResponse::from(po.clone());
    assert_eq!(response.remaining_quantity, 10);
    // 1298 / 15 per unit, 10 units remaining
    assert_eq!(response.balance_amount, dec!(865.33));

    let po = ctx
        .pos
        .update_delivery(po.id, DeliveryRequest { quantity: 10 })
        .await
        .unwrap();
    assert_eq!(po.status, PoStatus::Delivered.to_string());
    assert_eq!(po.delivered_quantity, 15);

    let response = PoResponse::from(po);
    assert_eq!(response.remaining_quantity, 0);
    assert_eq!(response.balance_amount, dec!(0.00));
}

#[tokio::test]
async fn over_delivery_is_rejected() {
    let ctx = setup().await;
    let pr = approved_pr(&ctx).await;
    let po = ctx.pos.create_po(gst_request(pr.id)).await.unwrap();
    ctx.pos
        .update_delivery(po.id, DeliveryRequest { quantity: 10 })
        .await
        .unwrap();

    let err = ctx
        .pos
        .update_delivery(po.id, DeliveryRequest { quantity: 6 })
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");

    // the counter is unchanged after the rejected delivery
    let po = ctx.pos.get_po(po.id).await.unwrap();
    assert_eq!(po.delivered_quantity, 10);
}

#[tokio::test]
async fn non_positive_delivery_quantity_is_rejected() {
    let ctx = setup().await;
    let pr = approved_pr(&ctx).await;
    let po = ctx.pos.create_po(gst_request(pr.id)).await.unwrap();

    let err = ctx
        .pos
        .update_delivery(po.id, DeliveryRequest { quantity: 0 })
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn overflowing_quantity_sum_is_rejected_at_pr_creation() {
    let ctx = setup().await;
    let vendor = seed_vendor(&ctx.db, true).await;
    let requester = seed_user(&ctx.db, Role::Procurement).await;

    // zero amounts keep the total under the budget ceiling
    let err = ctx
        .prs
        .create_pr(CreatePrRequest {
            vendor_id: vendor.id,
            requester_id: requester.id,
            items: vec!["A".into(), "B".into()],
            quantities: vec![1_500_000_000, 1_500_000_000],
            unit_amounts: vec![dec!(0), dec!(0)],
        })
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn delivery_counter_overflow_is_rejected_not_wrapped() {
    let ctx = setup().await;
    let vendor = seed_vendor(&ctx.db, true).await;
    let requester = seed_user(&ctx.db, Role::Procurement).await;
    let approver = seed_user(&ctx.db, Role::Approver).await;

    let pr = ctx
        .prs
        .create_pr(CreatePrRequest {
            vendor_id: vendor.id,
            requester_id: requester.id,
            items: vec!["Bulk".into()],
            quantities: vec![2_000_000_000],
            unit_amounts: vec![dec!(0)],
        })
        .await
        .unwrap();
    ctx.prs.submit_pr(pr.id).await.unwrap();
    ctx.prs
        .approve_pr(pr.id, approver.id, ApprovalRequest::default())
        .await
        .unwrap();
    let po = ctx.pos.create_po(gst_request(pr.id)).await.unwrap();

    let po = ctx
        .pos
        .update_delivery(po.id, DeliveryRequest { quantity: 1_500_000_000 })
        .await
        .unwrap();
    assert_eq!(po.status, PoStatus::PartialDelivered.to_string());

    // 1_500_000_000 + 1_500_000_000 overflows i32; must fail cleanly
    let err = ctx
        .pos
        .update_delivery(po.id, DeliveryRequest { quantity: 1_500_000_000 })
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");

    let po = ctx.pos.get_po(po.id).await.unwrap();
    assert_eq!(po.delivered_quantity, 1_500_000_000);
}

#[tokio::test]
async fn close_requires_full_delivery_and_is_terminal() {
    let ctx = setup().await;
    let pr = approved_pr(&ctx).await;
    let po = ctx.pos.create_po(gst_request(pr.id)).await.unwrap();

    let err = ctx.pos.close_po(po.id).await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_STATE");

    ctx.pos
        .update_delivery(po.id, DeliveryRequest { quantity: 15 })
        .await
        .unwrap();
    let closed = ctx.pos.close_po(po.id).await.unwrap();
    assert_eq!(closed.status, PoStatus::Closed.to_string());

    let err = ctx
        .pos
        .update_delivery(po.id, DeliveryRequest { quantity: 1 })
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_STATE");

    let err = ctx.pos.close_po(po.id).await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_STATE");
}

#[tokio::test]
async fn invoice_download_renders_the_order() {
    let ctx = setup().await;
    let pr = approved_pr(&ctx).await;
    let po = ctx.pos.create_po(gst_request(pr.id)).await.unwrap();

    let invoice = ctx.reports.export_po_invoice(po.id).await.unwrap();
    assert_eq!(invoice.filename, format!("invoice-{}.csv", po.po_number));
    assert_eq!(invoice.content_type, "text/csv");

    let text = String::from_utf8(invoice.bytes).unwrap();
    assert!(text.contains(&po.po_number));
    assert!(text.contains("total_amount,1298.00"));

    let err = ctx
        .reports
        .export_po_invoice(uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
}

#[tokio::test]
async fn find_by_pr_returns_the_raised_po() {
    let ctx = setup().await;
    let pr = approved_pr(&ctx).await;
    let po = ctx.pos.create_po(gst_request(pr.id)).await.unwrap();

    let found = ctx.pos.find_by_pr(pr.id).await.unwrap().unwrap();
    assert_eq!(found.id, po.id);

    assert!(ctx
        .pos
        .find_by_pr(uuid::Uuid::new_v4())
        .await
        .unwrap()
        .is_none());
}
