// libs/patient-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::{auth_middleware, require_patient};

use crate::handlers;

pub fn patient_routes(state: Arc<AppConfig>) -> Router {
    // Everything here acts as the authenticated patient; queries never take
    // someone else's patient id.
    let protected_routes = Router::new()
        .route(
            "/appointments",
            get(handlers::list_appointments).post(handlers::book_appointment),
        )
        .route(
            "/appointments/{appointment_id}/cancel",
            post(handlers::cancel_appointment),
        )
        .route("/availability", get(handlers::search_open_slots))
        .route("/prescriptions", get(handlers::list_prescriptions))
        .layer(middleware::from_fn(require_patient))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
