pub mod directory;
pub mod emails;
pub mod purchase_orders;
pub mod purchase_requisitions;
pub mod reports;
pub mod templates;
