//! HTML bodies for transactional notifications.

use crate::entities::purchase_requisition;

pub fn pr_created(pr: &purchase_requisition::Model) -> String {
    format!(
        "<h3>Purchase Requisition Created</h3>\
         <p>PR <b>{}</b> has been created with a total of <b>{}</b>.</p>\
         <p>It is currently in DRAFT and can still be edited before submission.</p>",
        pr.pr_number, pr.total_amount
    )
}

pub fn pr_submitted(pr: &purchase_requisition::Model) -> String {
    format!(
        "<h3>Purchase Requisition Submitted</h3>\
         <p>PR <b>{}</b> (total <b>{}</b>) has been submitted and awaits approval.</p>",
        pr.pr_number, pr.total_amount
    )
}

pub fn pr_approved(pr: &purchase_requisition::Model) -> String {
    format!(
        "<h3>Purchase Requisition Approved</h3>\
         <p>PR <b>{}</b> (total <b>{}</b>) has been approved. A purchase order can now be raised.</p>",
        pr.pr_number, pr.total_amount
    )
}

pub fn pr_rejected(pr: &purchase_requisition::Model, comments: Option<&str>) -> String {
    let reason = comments
        .filter(|c| !c.is_empty())
        .map(|c| format!("<p>Reason: {c}</p>"))
        .unwrap_or_default();
    format!(
        "<h3>Purchase Requisition Rejected</h3>\
         <p>PR <b>{}</b> has been rejected.</p>{reason}",
        pr.pr_number
    )
}
