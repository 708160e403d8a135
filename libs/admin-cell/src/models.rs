// libs/admin-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::domain::UserRecord;

// ==============================================================================
// RECORD VIEWS
// ==============================================================================

/// The record views an admin can ask for. `All` deliberately excludes
/// admin accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserViewFilter {
    All,
    PendingGps,
    PendingPatients,
    ActiveGps,
    ActivePatients,
    DeactivatedGps,
    DeactivatedPatients,
}

impl Default for UserViewFilter {
    fn default() -> Self {
        UserViewFilter::All
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    pub view: Option<UserViewFilter>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserRecordView {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub location: String,
    pub address: String,
    pub status: String,
    pub role: String,
}

impl From<UserRecord> for UserRecordView {
    fn from(user: UserRecord) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            location: user.location,
            address: user.address,
            status: user.status.to_string(),
            role: user.role.to_string(),
        }
    }
}

// ==============================================================================
// NEXT-DAY REMINDERS
// ==============================================================================

/// Which next-day notices to compute: `Pending` covers unconfirmed
/// requests (and cancels them as a side effect), `Booked` covers confirmed
/// and GP-cancelled appointments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    Pending,
    Booked,
}

#[derive(Debug, Deserialize)]
pub struct ReminderRequest {
    pub kind: ReminderKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReminderNotice {
    pub appointment_id: Uuid,
    pub patient_email: String,
    pub patient_first_name: String,
    pub slot_time: DateTime<Utc>,
    pub message: String,
}
