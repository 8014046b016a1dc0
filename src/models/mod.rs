//! Domain enums shared across entities, services and handlers.
//!
//! Statuses are persisted as their string forms; keeping them as typed
//! enums here prevents the stored status from drifting away from the
//! transition rules enforced in the services.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Purchase requisition lifecycle.
///
/// Transitions only move forward: DRAFT -> SUBMITTED -> APPROVED | REJECTED.
/// DRAFT is the only mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, Serialize, Deserialize, ToSchema)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl PrStatus {
    /// APPROVED and REJECTED admit no further PR transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PrStatus::Approved | PrStatus::Rejected)
    }
}

/// Purchase order lifecycle.
///
/// CREATED / PARTIAL_DELIVERED / DELIVERED are derived purely from the
/// quantity counters (see [`PoStatus::from_counters`]); CLOSED is an
/// explicit terminal transition gated on DELIVERED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, Serialize, Deserialize, ToSchema)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoStatus {
    Created,
    PartialDelivered,
    Delivered,
    Closed,
}

impl PoStatus {
    /// Derives the quantity-driven status from the delivery counters.
    ///
    /// The stored status column is only ever written from this function
    /// (or set to CLOSED by the explicit close transition), so the
    /// counters and the status can never disagree.
    pub fn from_counters(delivered: i32, total: i32) -> PoStatus {
        if delivered == 0 {
            PoStatus::Created
        } else if delivered < total {
            PoStatus::PartialDelivered
        } else {
            PoStatus::Delivered
        }
    }
}

/// Action recorded in the append-only approval history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, Serialize, Deserialize, ToSchema)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalAction {
    Approved,
    Rejected,
}

/// Status of a single email send or report generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, Serialize, Deserialize, ToSchema)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptStatus {
    Pending,
    Success,
    Failed,
}

/// Cadence of a scheduled report run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, Serialize, Deserialize, ToSchema)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    Daily,
    Weekly,
}

/// Roles granted by the upstream identity provider.
///
/// Authentication happens before requests reach this service; handlers
/// only check that the already-authenticated principal carries a role
/// eligible for the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, Serialize, Deserialize, ToSchema)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Procurement,
    Finance,
    Approver,
    Vendor,
}
