// libs/gp-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use appointment_cell::models::AppointmentError;
use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AddSlotRequest, AvailabilityDayQuery, ConfirmedDayQuery, IssuePrescriptionRequest,
    PatientSearchQuery, PendingQuery, RemoveSlotRequest,
};
use crate::services::appointments::GpAppointmentService;
use crate::services::availability::GpAvailabilityService;
use crate::services::patients::PatientDirectoryService;

fn caller_gp_id(user: &User) -> Result<Uuid, AppError> {
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
            AppError::Conflict("Availability slot is not open for booking".to_string())
        }
        AppointmentError::InvalidStatusTransition(status) => AppError::BadRequest(format!(
            "Appointment cannot be modified in current status: {}",
            status
        )),
        AppointmentError::PastAppointment => {
            AppError::BadRequest("Appointment slot time has already passed".to_string())
        }
        AppointmentError::RecordNotFound => {
            AppError::NotFound("Medical record not found".to_string())
        }
        AppointmentError::Unauthorized => {
            AppError::Forbidden("Appointment does not belong to this GP".to_string())
        }
        AppointmentError::DatabaseError(msg) => AppError::Database(msg),
    }
}

// ==============================================================================
// AVAILABILITY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_availability(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<AvailabilityDayQuery>,
) -> Result<Json<Value>, AppError> {
    let gp_id = caller_gp_id(&user)?;
    let service = GpAvailabilityService::new(&state);

    let slots = service
        .slots_for_day(gp_id, query.date, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({ "slots": slots })))
}

#[axum::debug_handler]
pub async fn add_availability(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<AddSlotRequest>,
) -> Result<Json<Value>, AppError> {
    let gp_id = caller_gp_id(&user)?;
    let service = GpAvailabilityService::new(&state);

    let (slot, created) = service
        .add_slot(gp_id, request.slot_time, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "slot": slot,
        "created": created
    })))
}

#[axum::debug_handler]
pub async fn remove_availability(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<RemoveSlotRequest>,
) -> Result<Json<Value>, AppError> {
    let gp_id = caller_gp_id(&user)?;
    let service = GpAvailabilityService::new(&state);

    service
        .remove_slot(gp_id, request.slot_time, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({ "success": true })))
}

// ==============================================================================
// APPOINTMENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn pending_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<PendingQuery>,
) -> Result<Json<Value>, AppError> {
    let gp_id = caller_gp_id(&user)?;
    let service = GpAppointmentService::new(&state);

    let appointments = service
        .pending_after(gp_id, query.after, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({ "appointments": appointments })))
}

#[axum::debug_handler]
pub async fn confirmed_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<ConfirmedDayQuery>,
) -> Result<Json<Value>, AppError> {
    let gp_id = caller_gp_id(&user)?;
    let service = GpAppointmentService::new(&state);

    let appointments = service
        .confirmed_on(gp_id, query.date, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({ "appointments": appointments })))
}

#[axum::debug_handler]
pub async fn appointment_detail(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let gp_id = caller_gp_id(&user)?;
    let service = GpAppointmentService::new(&state);

    let detail = service
        .detail(gp_id, appointment_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({ "appointment": detail })))
}

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let gp_id = caller_gp_id(&user)?;
    let service = GpAppointmentService::new(&state);

    let appointment = service
        .confirm(gp_id, appointment_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment confirmed"
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let gp_id = caller_gp_id(&user)?;
    let service = GpAppointmentService::new(&state);

    let appointment = service
        .cancel(gp_id, appointment_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment cancelled and slot reopened"
    })))
}

#[axum::debug_handler]
pub async fn mark_missed(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let gp_id = caller_gp_id(&user)?;
    let service = GpAppointmentService::new(&state);

    let appointment = service
        .mark_missed(gp_id, appointment_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment marked as missed"
    })))
}

#[axum::debug_handler]
pub async fn issue_prescription(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<IssuePrescriptionRequest>,
) -> Result<Json<Value>, AppError> {
    let gp_id = caller_gp_id(&user)?;
    let service = GpAppointmentService::new(&state);

    let (appointment, record) = service
        .issue_prescription(gp_id, appointment_id, request, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "record": record
    })))
}

#[axum::debug_handler]
pub async fn appointment_record(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let gp_id = caller_gp_id(&user)?;
    let service = GpAppointmentService::new(&state);

    let record = service
        .record_for_appointment(gp_id, appointment_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({ "record": record })))
}

// ==============================================================================
// PATIENT DIRECTORY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn search_patients(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<PatientSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let service = PatientDirectoryService::new(&state);

    let patients = if let Some(patient_id) = query.patient_id {
        service
            .search_by_id(patient_id, auth.token())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
    } else {
        service
            .search_by_name(query.name.as_deref().unwrap_or(""), auth.token())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
    };

    Ok(Json(json!({ "patients": patients })))
}

#[axum::debug_handler]
pub async fn patient_personal_data(
    State(state): State<Arc<AppConfig>>,
    Path(patient_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = PatientDirectoryService::new(&state);

    let patient = service
        .personal_data(patient_id, auth.token())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))?;

    Ok(Json(json!({ "patient": patient })))
}

#[axum::debug_handler]
pub async fn patient_medical_history(
    State(state): State<Arc<AppConfig>>,
    Path(patient_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = PatientDirectoryService::new(&state);

    let records = service
        .medical_history(patient_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({ "records": records })))
}
