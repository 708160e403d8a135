// libs/admin-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use appointment_cell::models::AppointmentError;
use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{RecordsQuery, ReminderRequest};
use crate::services::records::AdminRecordsService;
use crate::services::reminders::ReminderService;

fn map_appointment_error(err: AppointmentError) -> AppError {
    match err {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::DatabaseError(msg) => AppError::Database(msg),
        other => AppError::Internal(other.to_string()),
    }
}

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<RecordsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AdminRecordsService::new(&state);

    let users = service
        .list_users(query.view.unwrap_or_default(), auth.token())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({ "users": users })))
}

#[axum::debug_handler]
pub async fn activate_user(
    State(state): State<Arc<AppConfig>>,
    Path(user_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = AdminRecordsService::new(&state);

    let user = service
        .activate_user(user_id, auth.token())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "user": user,
        "message": "Account activated"
    })))
}

#[axum::debug_handler]
pub async fn deactivate_user(
    State(state): State<Arc<AppConfig>>,
    Path(user_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = AdminRecordsService::new(&state);

    let user = service
        .deactivate_user(user_id, auth.token())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "user": user,
        "message": "Account deactivated"
    })))
}

#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<Arc<AppConfig>>,
    Path(user_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = AdminRecordsService::new(&state);

    service
        .delete_user(user_id, auth.token())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Account deleted"
    })))
}

#[axum::debug_handler]
pub async fn next_day_reminders(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<ReminderRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ReminderService::new(&state);

    let notices = service
        .next_day_notices(request.kind, Utc::now(), auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "notices": notices
    })))
}
