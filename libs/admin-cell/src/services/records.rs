// libs/admin-cell/src/services/records.rs
use anyhow::{anyhow, Result};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{return_representation, SupabaseClient};
use shared_models::domain::{UserRecord, UserRole, UserStatus};

use crate::models::{UserRecordView, UserViewFilter};

/// Account administration: the filtered record views plus activation,
/// deactivation and deletion.
pub struct AdminRecordsService {
    supabase: SupabaseClient,
}

impl AdminRecordsService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_users(
        &self,
        filter: UserViewFilter,
        auth_token: &str,
    ) -> Result<Vec<UserRecordView>> {
        debug!("Listing user records with filter {:?}", filter);

        let path = format!("/rest/v1/users?{}", Self::filter_query(filter));

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let users: Vec<UserRecord> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<UserRecord>, _>>()?;

        Ok(users.into_iter().map(UserRecordView::from).collect())
    }

    fn filter_query(filter: UserViewFilter) -> String {
        let gp = UserRole::Gp.code();
        let patient = UserRole::Patient.code();
        let pending = UserStatus::PendingActivation.code();
        let active = UserStatus::Activated.code();
        let deactivated = UserStatus::Deactivated.code();

        match filter {
            UserViewFilter::All => format!("role_id=neq.{}", UserRole::Admin.code()),
            UserViewFilter::PendingGps => format!("status_id=eq.{}&role_id=eq.{}", pending, gp),
            UserViewFilter::PendingPatients => {
                format!("status_id=eq.{}&role_id=eq.{}", pending, patient)
            }
            UserViewFilter::ActiveGps => format!("status_id=eq.{}&role_id=eq.{}", active, gp),
            UserViewFilter::ActivePatients => {
                format!("status_id=eq.{}&role_id=eq.{}", active, patient)
            }
            UserViewFilter::DeactivatedGps => {
                format!("status_id=eq.{}&role_id=eq.{}", deactivated, gp)
            }
            UserViewFilter::DeactivatedPatients => {
                format!("status_id=eq.{}&role_id=eq.{}", deactivated, patient)
            }
        }
    }

    pub async fn activate_user(&self, user_id: Uuid, auth_token: &str) -> Result<UserRecordView> {
        let user = self
            .set_user_status(user_id, UserStatus::Activated, auth_token)
            .await?;
        info!("User {} activated", user_id);
        Ok(user)
    }

    pub async fn deactivate_user(&self, user_id: Uuid, auth_token: &str) -> Result<UserRecordView> {
        let user = self
            .set_user_status(user_id, UserStatus::Deactivated, auth_token)
            .await?;
        info!("User {} deactivated", user_id);
        Ok(user)
    }

    pub async fn delete_user(&self, user_id: Uuid, auth_token: &str) -> Result<()> {
        debug!("Deleting user {}", user_id);

        let path = format!("/rest/v1/users?id=eq.{}", user_id);
        let _: Vec<Value> = self
            .supabase
            .request(Method::DELETE, &path, Some(auth_token), None)
            .await?;

        info!("User {} deleted", user_id);
        Ok(())
    }

    async fn set_user_status(
        &self,
        user_id: Uuid,
        status: UserStatus,
        auth_token: &str,
    ) -> Result<UserRecordView> {
        let path = format!("/rest/v1/users?id=eq.{}", user_id);
        let update_data = json!({
            "status_id": status.code(),
            "updated_at": chrono::Utc::now().to_rfc3339()
        });

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(update_data),
                Some(return_representation()),
            )
            .await?;

        if result.is_empty() {
            return Err(anyhow!("User not found: {}", user_id));
        }

        let user: UserRecord = serde_json::from_value(result[0].clone())?;
        Ok(UserRecordView::from(user))
    }
}
