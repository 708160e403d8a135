use std::sync::Arc;

use axum::{routing::get, Router};

use admin_cell::router::admin_routes;
use auth_cell::router::auth_routes;
use gp_cell::router::gp_routes;
use patient_cell::router::patient_routes;
use security_cell::router::security_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "GP Clinic API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/admin", admin_routes(state.clone()))
        .nest("/gp", gp_routes(state.clone()))
        .nest("/patients", patient_routes(state.clone()))
        .nest("/security", security_routes())
}
