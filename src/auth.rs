//! Principal extraction and role gating.
//!
//! Authentication happens upstream (gateway or identity proxy); requests
//! arrive with an already-authenticated principal id and role set in
//! headers. This module only enforces role-gated operation eligibility.

use crate::errors::ServiceError;
use crate::models::Role;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::str::FromStr;
use uuid::Uuid;

pub const PRINCIPAL_ID_HEADER: &str = "x-principal-id";
pub const PRINCIPAL_ROLES_HEADER: &str = "x-principal-roles";

/// The already-authenticated caller, as asserted by the upstream proxy.
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal {
    pub user_id: Uuid,
    pub roles: Vec<Role>,
}

impl AuthenticatedPrincipal {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Fails with `Forbidden` unless the principal carries one of the
    /// allowed roles. ADMIN is always eligible.
    pub fn require_any_role(&self, allowed: &[Role]) -> Result<(), ServiceError> {
        if self.has_role(Role::Admin) || allowed.iter().any(|r| self.has_role(*r)) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "operation requires one of roles {:?}",
                allowed
            )))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedPrincipal
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(PRINCIPAL_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ServiceError::Unauthorized("missing principal id".into()))?;
        let user_id = Uuid::parse_str(user_id)
            .map_err(|_| ServiceError::Unauthorized("malformed principal id".into()))?;

        let roles = parts
            .headers
            .get(PRINCIPAL_ROLES_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .split(',')
            .filter_map(|r| Role::from_str(r.trim()).ok())
            .collect();

        Ok(AuthenticatedPrincipal { user_id, roles })
    }
}
