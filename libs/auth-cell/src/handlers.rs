use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::HeaderMap,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::TokenResponse;
use shared_models::error::AppError;
use shared_utils::jwt::validate_token;

use crate::models::{AuthError, LoginRequest, RegisterRequest};
use crate::services::accounts::AccountService;

// Helper function to extract token
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    if !auth_value.starts_with("Bearer ") {
        return Err(AppError::Auth("Invalid authorization header format".to_string()));
    }

    Ok(auth_value[7..].to_string())
}

fn map_auth_error(err: AuthError) -> AppError {
    match err {
        AuthError::UnknownEmail | AuthError::IncorrectPassword => {
            AppError::Auth(err.to_string())
        }
        AuthError::AccountDeactivated | AuthError::AccountPending => {
            AppError::Forbidden(err.to_string())
        }
        AuthError::EmailTaken => AppError::Conflict(err.to_string()),
        AuthError::InvalidFields(_) | AuthError::RoleNotPermitted(_) => {
            AppError::ValidationError(err.to_string())
        }
        AuthError::TokenIssuance(msg) => AppError::Internal(msg),
        AuthError::DatabaseError(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AccountService::new(&config);

    let response = service.login(request).await.map_err(map_auth_error)?;

    Ok(Json(json!({
        "success": true,
        "login": response
    })))
}

#[axum::debug_handler]
pub async fn register(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AccountService::new(&config);

    let registered = service.register(request).await.map_err(map_auth_error)?;

    Ok(Json(json!({
        "success": true,
        "user": registered,
        "message": "Registration received; an administrator must activate the account"
    })))
}

pub async fn validate_token_handler(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let token = extract_bearer_token(&headers)?;

    match validate_token(&token, &config.supabase_jwt_secret) {
        Ok(user) => {
            let response = TokenResponse {
                valid: true,
                user_id: user.id,
                email: user.email,
                role: user.role,
            };

            Ok(Json(response))
        }
        Err(err) => Err(AppError::Auth(err)),
    }
}

pub async fn verify_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    debug!("Verifying token");

    let token = extract_bearer_token(&headers)?;

    match validate_token(&token, &config.supabase_jwt_secret) {
        Ok(_) => Ok(Json(json!({ "valid": true }))),
        Err(_) => Ok(Json(json!({ "valid": false }))),
    }
}
