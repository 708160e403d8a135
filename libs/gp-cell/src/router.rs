// libs/gp-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::{auth_middleware, require_gp};

use crate::handlers;

pub fn gp_routes(state: Arc<AppConfig>) -> Router {
    // Every route is scoped to the authenticated GP; the role guard keeps
    // admins and patients out entirely.
    let protected_routes = Router::new()
        .route(
            "/availability",
            get(handlers::list_availability)
                .post(handlers::add_availability)
                .delete(handlers::remove_availability),
        )
        .route("/appointments/pending", get(handlers::pending_appointments))
        .route("/appointments/confirmed", get(handlers::confirmed_appointments))
        .route("/appointments/{appointment_id}", get(handlers::appointment_detail))
        .route("/appointments/{appointment_id}/confirm", post(handlers::confirm_appointment))
        .route("/appointments/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route("/appointments/{appointment_id}/missed", post(handlers::mark_missed))
        .route(
            "/appointments/{appointment_id}/prescription",
            post(handlers::issue_prescription),
        )
        .route("/appointments/{appointment_id}/record", get(handlers::appointment_record))
        .route("/patients", get(handlers::search_patients))
        .route("/patients/{patient_id}", get(handlers::patient_personal_data))
        .route("/patients/{patient_id}/records", get(handlers::patient_medical_history))
        .layer(middleware::from_fn(require_gp))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
