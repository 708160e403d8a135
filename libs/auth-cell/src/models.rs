// libs/auth-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login: the token's role claim is what routes the caller to
/// exactly one capability set.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub location: String,
    /// "gp" or "patient"; admin accounts are never self-registered.
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub status: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("Email does not exist")]
    UnknownEmail,

    #[error("Incorrect password")]
    IncorrectPassword,

    #[error("Your account has been deactivated")]
    AccountDeactivated,

    #[error("Your account is pending activation")]
    AccountPending,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("Invalid registration fields: {0}")]
    InvalidFields(String),

    #[error("Role not permitted for registration: {0}")]
    RoleNotPermitted(String),

    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
