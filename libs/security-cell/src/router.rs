use axum::{routing::post, Router};

use crate::handlers;

/// Public routes: the password check runs before an account exists.
pub fn security_routes() -> Router {
    Router::new().route("/password/check", post(handlers::check_password))
}
