// libs/gp-cell/src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::domain::AvailabilityStatus;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AddSlotRequest {
    pub slot_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoveSlotRequest {
    pub slot_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssuePrescriptionRequest {
    /// Empty or absent prescription text completes the appointment without
    /// a prescription.
    pub prescription: Option<String>,
    pub diagnosis: String,
    pub gp_comment: String,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityDayQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    /// Only appointments on slots strictly after this date are listed.
    pub after: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmedDayQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct PatientSearchQuery {
    pub name: Option<String>,
    pub patient_id: Option<Uuid>,
}

// ==============================================================================
// VIEW MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    pub availability_id: Uuid,
    pub slot_time: DateTime<Utc>,
    pub status: String,
}

impl SlotView {
    pub fn new(availability_id: Uuid, slot_time: DateTime<Utc>, status: AvailabilityStatus) -> Self {
        Self {
            availability_id,
            slot_time,
            status: status.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingAppointmentView {
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub patient_first_name: String,
    pub patient_last_name: String,
    pub slot_time: DateTime<Utc>,
    pub patient_summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmedAppointmentView {
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub patient_first_name: String,
    pub patient_last_name: String,
    pub slot_time: DateTime<Utc>,
    pub status: String,
    pub patient_summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentDetailView {
    pub appointment_id: Uuid,
    pub status: String,
    pub slot_time: DateTime<Utc>,
    pub patient_summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientView {
    pub patient_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientRecordView {
    pub appointment_id: Uuid,
    pub slot_time: DateTime<Utc>,
    pub diagnosis: String,
    pub prescription: Option<String>,
    pub gp_comment: String,
}
