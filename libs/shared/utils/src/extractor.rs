use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::domain::UserRole;
use shared_models::error::AppError;

use crate::jwt::validate_token;

/// Validates the bearer token and injects the authenticated `User` into
/// request extensions for downstream handlers and role guards.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    if !auth_value.starts_with("Bearer ") {
        return Err(AppError::Auth("Invalid authorization header format".to_string()));
    }

    let token = &auth_value[7..];

    let user = validate_token(token, &config.supabase_jwt_secret).map_err(AppError::Auth)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Role dispatch: each cell's router mounts exactly one of these behind
/// `auth_middleware`, so no cross-role operation is reachable.
pub async fn require_admin(request: Request<Body>, next: Next) -> Result<Response, AppError> {
    require_role(UserRole::Admin, request, next).await
}

pub async fn require_gp(request: Request<Body>, next: Next) -> Result<Response, AppError> {
    require_role(UserRole::Gp, request, next).await
}

pub async fn require_patient(request: Request<Body>, next: Next) -> Result<Response, AppError> {
    require_role(UserRole::Patient, request, next).await
}

async fn require_role(
    required: UserRole,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<User>()
        .ok_or_else(|| AppError::Auth("User not found in request extensions".to_string()))?;

    let role = user.role.as_deref().and_then(UserRole::from_claim);

    if role != Some(required) {
        return Err(AppError::Forbidden(format!(
            "{} credentials required",
            required.as_claim()
        )));
    }

    Ok(next.run(request).await)
}
