// libs/admin-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::{auth_middleware, require_admin};

use crate::handlers;

pub fn admin_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/users", get(handlers::list_users))
        .route("/users/{user_id}/activate", post(handlers::activate_user))
        .route("/users/{user_id}/deactivate", post(handlers::deactivate_user))
        .route("/users/{user_id}", delete(handlers::delete_user))
        .route("/reminders", post(handlers::next_day_reminders))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
