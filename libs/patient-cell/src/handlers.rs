// libs/patient-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use appointment_cell::models::AppointmentError;
use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{AppointmentHistoryQuery, BookAppointmentRequest, SlotSearchQuery};
use crate::services::booking::PatientBookingService;
use crate::services::history::PatientHistoryService;

fn caller_patient_id(user: &User) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id)
        .map_err(|_| AppError::Auth("Caller identity is not a valid user id".to_string()))
}

fn map_appointment_error(err: AppointmentError) -> AppError {
    match err {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::AvailabilityNotFound => {
            AppError::NotFound("Availability slot not found".to_string())
        }
        AppointmentError::SlotNotAvailable => {
            AppError::Conflict("Availability slot is no longer open for booking".to_string())
        }
        AppointmentError::InvalidStatusTransition(status) => AppError::BadRequest(format!(
            "Appointment cannot be modified in current status: {}",
            status
        )),
        AppointmentError::PastAppointment => {
            AppError::BadRequest("Only upcoming appointments can be cancelled".to_string())
        }
        AppointmentError::RecordNotFound => {
            AppError::NotFound("Medical record not found".to_string())
        }
        AppointmentError::Unauthorized => {
            AppError::Forbidden("Appointment does not belong to this patient".to_string())
        }
        AppointmentError::DatabaseError(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<AppointmentHistoryQuery>,
) -> Result<Json<Value>, AppError> {
    let patient_id = caller_patient_id(&user)?;
    let service = PatientHistoryService::new(&state);

    let appointments = service
        .appointments(patient_id, query.view, Utc::now(), auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({ "appointments": appointments })))
}

#[axum::debug_handler]
pub async fn search_open_slots(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<SlotSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let service = PatientHistoryService::new(&state);

    let slots = service
        .open_slots(query, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({ "slots": slots })))
}

#[axum::debug_handler]
pub async fn list_prescriptions(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let patient_id = caller_patient_id(&user)?;
    let service = PatientHistoryService::new(&state);

    let prescriptions = service
        .prescriptions(patient_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({ "prescriptions": prescriptions })))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let patient_id = caller_patient_id(&user)?;
    let service = PatientBookingService::new(&state);

    let appointment = service
        .book(patient_id, request, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Booking request sent to the GP for confirmation"
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let patient_id = caller_patient_id(&user)?;
    let service = PatientBookingService::new(&state);

    let appointment = service
        .cancel(patient_id, appointment_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment cancelled and slot released"
    })))
}
