pub mod approval_history;
pub mod email_log;
pub mod purchase_order;
pub mod purchase_requisition;
pub mod report_log;
pub mod user;
pub mod vendor;
