// libs/appointment-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::domain::{AppointmentStatus, AvailabilityStatus};

// ==============================================================================
// CORE SCHEDULING RECORDS
// ==============================================================================

/// A bookable time unit offered by a GP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    pub id: Uuid,
    pub gp_id: Uuid,
    pub slot_time: DateTime<Utc>,
    #[serde(rename = "status_id")]
    pub status: AvailabilityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A booking request/confirmation linking a patient to a GP's slot.
/// References exactly one availability and one patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub availability_id: Uuid,
    pub patient_id: Uuid,
    #[serde(rename = "status_id")]
    pub status: AppointmentStatus,
    pub patient_summary: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The clinical outcome of an appointment. At most one per appointment;
/// prescription issuance inserts or updates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub prescription: Option<String>,
    pub diagnosis: String,
    pub gp_comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Availability slot not found")]
    AvailabilityNotFound,

    #[error("Availability slot is not open for booking")]
    SlotNotAvailable,

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("Appointment slot time has already passed")]
    PastAppointment,

    #[error("Medical record not found")]
    RecordNotFound,

    #[error("Unauthorized access to appointment")]
    Unauthorized,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
