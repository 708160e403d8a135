// libs/auth-cell/src/services/accounts.rs
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use security_cell::services::password::PasswordSecurityService;
use security_cell::services::validation::RegistrationValidator;
use shared_config::AppConfig;
use shared_database::supabase::{return_representation, SupabaseClient};
use shared_models::domain::{UserRecord, UserRole, UserStatus};
use shared_utils::jwt::issue_token;

use crate::models::{
    AuthError, LoginRequest, LoginResponse, RegisterRequest, RegisteredUser,
};

const TOKEN_TTL_HOURS: i64 = 24;

/// Credential resolution against the users table. Reads need the password
/// hash, so this service always speaks to the store with the service key.
pub struct AccountService {
    supabase: SupabaseClient,
    jwt_secret: String,
    service_key: String,
}

impl AccountService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            jwt_secret: config.supabase_jwt_secret.clone(),
            service_key: config.supabase_service_key.clone(),
        }
    }

    /// Log a user in: resolve the email, verify the password hash, gate on
    /// account status, then issue the role-scoped token.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        debug!("Login attempt for {}", request.email);

        let user = match self.find_by_email(&request.email).await? {
            Some(user) => user,
            None => {
                debug!("Login failed: unknown email");
                return Err(AuthError::UnknownEmail);
            }
        };

        let password_ok =
            PasswordSecurityService::verify_password(&request.password, &user.password_hash)
                .map_err(|e| AuthError::DatabaseError(format!("Password check failed: {}", e)))?;

        if !password_ok {
            debug!("Login failed: incorrect password for {}", request.email);
            return Err(AuthError::IncorrectPassword);
        }

        // Credentials are good; the account status decides whether the user
        // may actually enter.
        match user.status {
            UserStatus::Deactivated => {
                warn!("Deactivated account attempted login: {}", request.email);
                return Err(AuthError::AccountDeactivated);
            }
            UserStatus::PendingActivation => {
                debug!("Pending account attempted login: {}", request.email);
                return Err(AuthError::AccountPending);
            }
            UserStatus::Activated => {}
        }

        let token = issue_token(
            &user.id.to_string(),
            &user.email,
            user.role.as_claim(),
            &self.jwt_secret,
            TOKEN_TTL_HOURS,
        )
        .map_err(AuthError::TokenIssuance)?;

        info!("User {} logged in as {}", user.id, user.role.as_claim());

        Ok(LoginResponse {
            token,
            user_id: user.id,
            email: user.email,
            role: user.role.as_claim().to_string(),
            first_name: user.first_name,
            last_name: user.last_name,
        })
    }

    /// Register a new GP or patient account, pending admin activation.
    pub async fn register(&self, request: RegisterRequest) -> Result<RegisteredUser, AuthError> {
        debug!("Registration attempt for {}", request.email);

        let report = RegistrationValidator::validate_registration(
            &request.email,
            &request.password,
            &request.phone,
        );
        if !report.valid {
            return Err(AuthError::InvalidFields(report.issues.join("; ")));
        }

        let role = match UserRole::from_claim(&request.role) {
            Some(UserRole::Gp) => UserRole::Gp,
            Some(UserRole::Patient) => UserRole::Patient,
            _ => return Err(AuthError::RoleNotPermitted(request.role.clone())),
        };

        if self.find_by_email(&request.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = PasswordSecurityService::hash_password(&request.password)
            .map_err(|e| AuthError::DatabaseError(format!("Password hashing failed: {}", e)))?;

        let now = Utc::now();
        let user_data = json!({
            "email": request.email,
            "password_hash": password_hash,
            "first_name": request.first_name,
            "last_name": request.last_name,
            "phone": request.phone,
            "address": request.address,
            "location": request.location,
            "status_id": UserStatus::PendingActivation.code(),
            "role_id": role.code(),
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/users",
                Some(&self.service_key),
                Some(user_data),
                Some(return_representation()),
            )
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(AuthError::DatabaseError(
                "Failed to create user".to_string(),
            ));
        }

        let user: UserRecord = serde_json::from_value(result[0].clone())
            .map_err(|e| AuthError::DatabaseError(format!("Failed to parse created user: {}", e)))?;

        info!(
            "Registered {} account {} pending activation",
            user.role.as_claim(),
            user.id
        );

        Ok(RegisteredUser {
            id: user.id,
            email: user.email,
            role: user.role.as_claim().to_string(),
            status: user.status.to_string(),
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        let path = format!("/rest/v1/users?email=eq.{}", email);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(&self.service_key), None)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Ok(None);
        }

        let user: UserRecord = serde_json::from_value(result[0].clone())
            .map_err(|e| AuthError::DatabaseError(format!("Failed to parse user: {}", e)))?;

        Ok(Some(user))
    }
}
