// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use shared_models::domain::AppointmentStatus;

use crate::models::AppointmentError;

/// Owns the appointment status transition table. Every status change in the
/// system, whichever role drives it, passes through here first.
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: &AppointmentStatus,
        new_status: &AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!(
            "Validating status transition from {:?} to {:?}",
            current_status, new_status
        );

        let valid_transitions = self.get_valid_transitions(current_status);

        if !valid_transitions.contains(new_status) {
            warn!(
                "Invalid status transition attempted: {:?} -> {:?}",
                current_status, new_status
            );
            return Err(AppointmentError::InvalidStatusTransition(*current_status));
        }

        Ok(())
    }

    /// Get all valid next statuses for a given current status
    pub fn get_valid_transitions(
        &self,
        current_status: &AppointmentStatus,
    ) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::PendingConfirmation => vec![
                AppointmentStatus::Confirmed,
                AppointmentStatus::CancelledByGp,
                AppointmentStatus::CancelledByPatient,
                AppointmentStatus::CancelledBySystem,
            ],
            AppointmentStatus::Confirmed => vec![
                AppointmentStatus::MissedByPatient,
                AppointmentStatus::CancelledByPatient,
                AppointmentStatus::GpActionRequired,
                AppointmentStatus::CompletedWithoutPrescription,
                AppointmentStatus::CompletedWithPrescription,
            ],
            // A missed or overrun appointment still ends in a completion
            // once the GP writes it up.
            AppointmentStatus::MissedByPatient | AppointmentStatus::GpActionRequired => vec![
                AppointmentStatus::CompletedWithoutPrescription,
                AppointmentStatus::CompletedWithPrescription,
            ],
            // Terminal states - no transitions allowed
            AppointmentStatus::CancelledBySystem
            | AppointmentStatus::CancelledByPatient
            | AppointmentStatus::CancelledByGp
            | AppointmentStatus::CompletedWithoutPrescription
            | AppointmentStatus::CompletedWithPrescription => vec![],
        }
    }

    /// Whether entering `new_status` hands the underlying slot back to the
    /// open pool. System cancellation does not: the slot time has already
    /// passed by the time the sweep fires.
    pub fn frees_slot(&self, new_status: &AppointmentStatus) -> bool {
        matches!(
            new_status,
            AppointmentStatus::CancelledByGp | AppointmentStatus::CancelledByPatient
        )
    }

    /// The completion status a prescription write-up lands in: with a
    /// prescription when any text was supplied, without otherwise.
    pub fn completion_for_prescription(&self, prescription: Option<&str>) -> AppointmentStatus {
        match prescription {
            Some(text) if !text.trim().is_empty() => {
                AppointmentStatus::CompletedWithPrescription
            }
            _ => AppointmentStatus::CompletedWithoutPrescription,
        }
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
