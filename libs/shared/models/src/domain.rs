// libs/shared/models/src/domain.rs
//
// Role and status enumerations shared by every cell. Each value carries the
// fixed numeric code stored in the corresponding lookup table, so the wire
// representation is the integer code rather than a string.
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

// ==============================================================================
// USER ROLES AND ACCOUNT STATUSES
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRole {
    Admin,
    Gp,
    Patient,
}

impl UserRole {
    pub fn code(&self) -> i16 {
        match self {
            UserRole::Admin => 0,
            UserRole::Gp => 1,
            UserRole::Patient => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(UserRole::Admin),
            1 => Some(UserRole::Gp),
            2 => Some(UserRole::Patient),
            _ => None,
        }
    }

    /// The string form carried in the JWT `role` claim.
    pub fn as_claim(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Gp => "gp",
            UserRole::Patient => "patient",
        }
    }

    pub fn from_claim(claim: &str) -> Option<Self> {
        match claim {
            "admin" => Some(UserRole::Admin),
            "gp" => Some(UserRole::Gp),
            "patient" => Some(UserRole::Patient),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "ADMIN"),
            UserRole::Gp => write!(f, "GP"),
            UserRole::Patient => write!(f, "PATIENT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserStatus {
    Deactivated,
    PendingActivation,
    Activated,
}

impl UserStatus {
    pub fn code(&self) -> i16 {
        match self {
            UserStatus::Deactivated => -1,
            UserStatus::PendingActivation => 0,
            UserStatus::Activated => 1,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -1 => Some(UserStatus::Deactivated),
            0 => Some(UserStatus::PendingActivation),
            1 => Some(UserStatus::Activated),
            _ => None,
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStatus::Deactivated => write!(f, "DEACTIVATED"),
            UserStatus::PendingActivation => write!(f, "PENDING ACTIVATION"),
            UserStatus::Activated => write!(f, "ACTIVATED"),
        }
    }
}

// ==============================================================================
// AVAILABILITY AND APPOINTMENT STATUSES
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvailabilityStatus {
    Available,
    Unavailable,
}

impl AvailabilityStatus {
    pub fn code(&self) -> i16 {
        match self {
            AvailabilityStatus::Available => 0,
            AvailabilityStatus::Unavailable => 1,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(AvailabilityStatus::Available),
            1 => Some(AvailabilityStatus::Unavailable),
            _ => None,
        }
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvailabilityStatus::Available => write!(f, "AVAILABLE"),
            AvailabilityStatus::Unavailable => write!(f, "UNAVAILABLE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    CancelledBySystem,
    MissedByPatient,
    CancelledByPatient,
    CancelledByGp,
    PendingConfirmation,
    Confirmed,
    CompletedWithoutPrescription,
    CompletedWithPrescription,
    GpActionRequired,
}

impl AppointmentStatus {
    pub fn code(&self) -> i16 {
        match self {
            AppointmentStatus::CancelledBySystem => -4,
            AppointmentStatus::MissedByPatient => -3,
            AppointmentStatus::CancelledByPatient => -2,
            AppointmentStatus::CancelledByGp => -1,
            AppointmentStatus::PendingConfirmation => 0,
            AppointmentStatus::Confirmed => 1,
            AppointmentStatus::CompletedWithoutPrescription => 2,
            AppointmentStatus::CompletedWithPrescription => 3,
            AppointmentStatus::GpActionRequired => 4,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -4 => Some(AppointmentStatus::CancelledBySystem),
            -3 => Some(AppointmentStatus::MissedByPatient),
            -2 => Some(AppointmentStatus::CancelledByPatient),
            -1 => Some(AppointmentStatus::CancelledByGp),
            0 => Some(AppointmentStatus::PendingConfirmation),
            1 => Some(AppointmentStatus::Confirmed),
            2 => Some(AppointmentStatus::CompletedWithoutPrescription),
            3 => Some(AppointmentStatus::CompletedWithPrescription),
            4 => Some(AppointmentStatus::GpActionRequired),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::CancelledBySystem
                | AppointmentStatus::CancelledByPatient
                | AppointmentStatus::CancelledByGp
        )
    }

    pub fn is_completed(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::CompletedWithoutPrescription
                | AppointmentStatus::CompletedWithPrescription
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::CancelledBySystem => write!(f, "CANCELLED BY SYSTEM"),
            AppointmentStatus::MissedByPatient => write!(f, "MISSED BY PATIENT"),
            AppointmentStatus::CancelledByPatient => write!(f, "CANCELLED BY PATIENT"),
            AppointmentStatus::CancelledByGp => write!(f, "CANCELLED BY GP"),
            AppointmentStatus::PendingConfirmation => write!(f, "PENDING CONFIRMATION"),
            AppointmentStatus::Confirmed => write!(f, "CONFIRMED"),
            AppointmentStatus::CompletedWithoutPrescription => {
                write!(f, "COMPLETED WITHOUT PRESCRIPTION")
            }
            AppointmentStatus::CompletedWithPrescription => {
                write!(f, "COMPLETED WITH PRESCRIPTION")
            }
            AppointmentStatus::GpActionRequired => write!(f, "GP ACTION REQUIRED"),
        }
    }
}

// Integer serde for the code-backed enums. Rows store the lookup code, so
// these (de)serialize as plain integers.

impl Serialize for UserRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i16(self.code())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i64::deserialize(deserializer)?;
        UserRole::from_code(code)
            .ok_or_else(|| D::Error::custom(format!("unknown user role code: {}", code)))
    }
}

impl Serialize for UserStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i16(self.code())
    }
}

impl<'de> Deserialize<'de> for UserStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i64::deserialize(deserializer)?;
        UserStatus::from_code(code)
            .ok_or_else(|| D::Error::custom(format!("unknown user status code: {}", code)))
    }
}

impl Serialize for AvailabilityStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i16(self.code())
    }
}

impl<'de> Deserialize<'de> for AvailabilityStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i64::deserialize(deserializer)?;
        AvailabilityStatus::from_code(code)
            .ok_or_else(|| D::Error::custom(format!("unknown availability status code: {}", code)))
    }
}

impl Serialize for AppointmentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i16(self.code())
    }
}

impl<'de> Deserialize<'de> for AppointmentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i64::deserialize(deserializer)?;
        AppointmentStatus::from_code(code)
            .ok_or_else(|| D::Error::custom(format!("unknown appointment status code: {}", code)))
    }
}

// ==============================================================================
// SHARED ROW MODELS
// ==============================================================================

/// A row of the `users` table. The password hash is readable for credential
/// checks but never serialized back out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub location: String,
    #[serde(rename = "status_id")]
    pub status: UserStatus,
    #[serde(rename = "role_id")]
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
