use std::sync::Arc;

use axum::{
    routing::post,
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn auth_routes(state: Arc<AppConfig>) -> Router {
    // Login and registration are necessarily unauthenticated; the
    // validation endpoints read the bearer header themselves.
    Router::new()
        .route("/login", post(handlers::login))
        .route("/register", post(handlers::register))
        .route("/validate", post(handlers::validate_token_handler))
        .route("/verify", post(handlers::verify_token))
        .with_state(state)
}
