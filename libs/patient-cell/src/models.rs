// libs/patient-cell/src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub availability_id: Uuid,
    /// A summary of what is wrong, shown to the GP with the booking request.
    pub patient_summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentViewFilter {
    Past,
    Upcoming,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentHistoryQuery {
    pub view: AppointmentViewFilter,
}

#[derive(Debug, Deserialize)]
pub struct SlotSearchQuery {
    pub date: NaiveDate,
    pub location: String,
}

// ==============================================================================
// VIEW MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PatientAppointmentView {
    pub appointment_id: Uuid,
    pub status: String,
    pub slot_time: DateTime<Utc>,
    pub gp_id: Uuid,
    pub gp_first_name: String,
    pub gp_last_name: String,
    pub gp_email: String,
    pub location: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenSlotView {
    pub availability_id: Uuid,
    pub gp_id: Uuid,
    pub slot_time: DateTime<Utc>,
    pub gp_first_name: String,
    pub gp_last_name: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrescriptionView {
    pub appointment_id: Uuid,
    pub slot_time: DateTime<Utc>,
    pub gp_id: Uuid,
    pub gp_first_name: String,
    pub gp_last_name: String,
    pub gp_email: String,
    pub diagnosis: String,
    pub prescription: Option<String>,
    pub gp_comment: String,
}
