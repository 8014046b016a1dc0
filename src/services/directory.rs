use crate::{
    db::DbPool,
    entities::{user, vendor},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateVendorRequest {
    #[validate(length(min = 1, max = 200, message = "Vendor name is required"))]
    pub name: String,
    #[validate(email(message = "Contact email must be a valid email address"))]
    pub contact_email: String,
}

/// Vendor/requester directory consumed by the workflow engine: vendor
/// identity and active flag, requester existence and contact email.
#[derive(Clone)]
pub struct DirectoryService {
    db_pool: Arc<DbPool>,
}

impl DirectoryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn find_vendor(&self, vendor_id: Uuid) -> Result<vendor::Model, ServiceError> {
        vendor::Entity::find_by_id(vendor_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Vendor {vendor_id} not found")))
    }

    /// Resolves a vendor and fails with `VendorInactive` if it has been
    /// deactivated. New purchase requisitions must pass this gate.
    pub async fn require_active_vendor(
        &self,
        vendor_id: Uuid,
    ) -> Result<vendor::Model, ServiceError> {
        let vendor = self.find_vendor(vendor_id).await?;
        if !vendor.is_active {
            return Err(ServiceError::VendorInactive(format!(
                "Vendor {vendor_id} is inactive"
            )));
        }
        Ok(vendor)
    }

    #[instrument(skip(self))]
    pub async fn user_exists(&self, user_id: Uuid) -> Result<bool, ServiceError> {
        Ok(user::Entity::find_by_id(user_id)
            .one(&*self.db_pool)
            .await?
            .is_some())
    }

    pub async fn user_email(&self, user_id: Uuid) -> Result<Option<String>, ServiceError> {
        Ok(user::Entity::find_by_id(user_id)
            .one(&*self.db_pool)
            .await?
            .map(|u| u.email))
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_vendor(
        &self,
        request: CreateVendorRequest,
    ) -> Result<vendor::Model, ServiceError> {
        request.validate()?;

        let model = vendor::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            contact_email: Set(request.contact_email),
            is_active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(vendor_id = %model.id, "Vendor created");
        Ok(model)
    }

    pub async fn list_vendors(&self) -> Result<Vec<vendor::Model>, ServiceError> {
        Ok(vendor::Entity::find()
            .order_by_asc(vendor::Column::Name)
            .all(&*self.db_pool)
            .await?)
    }

    /// Activates or deactivates a vendor. Deactivation does not touch
    /// existing PRs/POs; it only blocks new requisitions.
    #[instrument(skip(self))]
    pub async fn set_vendor_active(
        &self,
        vendor_id: Uuid,
        active: bool,
    ) -> Result<vendor::Model, ServiceError> {
        let vendor = self.find_vendor(vendor_id).await?;
        let mut active_model: vendor::ActiveModel = vendor.into();
        active_model.is_active = Set(active);
        let updated = active_model.update(&*self.db_pool).await?;
        info!(vendor_id = %vendor_id, active = active, "Vendor active flag updated");
        Ok(updated)
    }
}
