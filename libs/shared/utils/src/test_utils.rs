use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::domain::{AppointmentStatus, AvailabilityStatus, UserRole, UserStatus};

use crate::jwt::issue_token;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            supabase_service_key: "test-service-key".to_string(),
        }
    }
}

impl TestConfig {
    /// A config pointed at a mock PostgREST server.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            supabase_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            bootstrap_admin_email: "admin@clinic.local".to_string(),
            bootstrap_admin_password: String::new(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "patient".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn gp(email: &str) -> Self {
        Self::new(email, "gp")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        issue_token(
            &user.id,
            &user.email,
            &user.role,
            secret,
            exp_hours.unwrap_or(24),
        )
        .expect("test token issuance")
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Builders for PostgREST rows matching this system's schema, used to stub
/// the mock server in cell tests.
pub struct MockClinicRows;

impl MockClinicRows {
    pub fn user_row(
        id: &str,
        email: &str,
        role: UserRole,
        status: UserStatus,
        password_hash: &str,
    ) -> Value {
        json!({
            "id": id,
            "email": email,
            "password_hash": password_hash,
            "first_name": "Test",
            "last_name": "User",
            "phone": "07123456789",
            "address": "1 Example Street",
            "location": "London",
            "status_id": status.code(),
            "role_id": role.code(),
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn active_gp_row(id: &str, email: &str) -> Value {
        Self::user_row(id, email, UserRole::Gp, UserStatus::Activated, "unused-hash")
    }

    pub fn active_patient_row(id: &str, email: &str) -> Value {
        Self::user_row(
            id,
            email,
            UserRole::Patient,
            UserStatus::Activated,
            "unused-hash",
        )
    }

    pub fn availability_row(
        id: &str,
        gp_id: &str,
        slot_time: DateTime<Utc>,
        status: AvailabilityStatus,
    ) -> Value {
        json!({
            "id": id,
            "gp_id": gp_id,
            "slot_time": slot_time.to_rfc3339(),
            "status_id": status.code(),
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn appointment_row(
        id: &str,
        availability_id: &str,
        patient_id: &str,
        status: AppointmentStatus,
    ) -> Value {
        json!({
            "id": id,
            "availability_id": availability_id,
            "patient_id": patient_id,
            "status_id": status.code(),
            "patient_summary": "Persistent cough",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn medical_record_row(
        id: &str,
        appointment_id: &str,
        prescription: Option<&str>,
    ) -> Value {
        json!({
            "id": id,
            "appointment_id": appointment_id,
            "prescription": prescription,
            "diagnosis": "Seasonal flu",
            "gp_comment": "Rest and fluids",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert!(!app_config.supabase_jwt_secret.is_empty());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::gp("gp@example.com");
        assert_eq!(user.email, "gp@example.com");
        assert_eq!(user.role, "gp");

        let user_model = user.to_user();
        assert_eq!(user_model.email, Some(user.email.clone()));
        assert_eq!(user_model.role, Some(user.role.clone()));
        assert_eq!(user_model.id, user.id);
    }

    #[test]
    fn test_jwt_token_creation() {
        let user = TestUser::default();
        let token = JwtTestUtils::create_test_token(&user, "test-secret", Some(1));

        assert!(token.contains('.'));
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_user_row_hides_nothing_it_needs() {
        let row = MockClinicRows::user_row(
            &Uuid::new_v4().to_string(),
            "p@example.com",
            UserRole::Patient,
            UserStatus::PendingActivation,
            "argon2-hash",
        );

        assert_eq!(row["status_id"], 0);
        assert_eq!(row["role_id"], 2);
        assert_eq!(row["password_hash"], "argon2-hash");
    }
}
