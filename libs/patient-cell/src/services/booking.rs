// libs/patient-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use appointment_cell::models::{Appointment, AppointmentError};
use appointment_cell::services::lifecycle::AppointmentLifecycleService;
use appointment_cell::services::store::AppointmentStore;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::domain::{AppointmentStatus, AvailabilityStatus};

use crate::models::BookAppointmentRequest;

/// Booking and cancellation from the patient's side. A slot can carry at
/// most one live booking: taking it flips it unavailable in the same
/// operation, and every patient-driven cancellation flips it back.
pub struct PatientBookingService {
    store: AppointmentStore,
    lifecycle: AppointmentLifecycleService,
}

impl PatientBookingService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        Self {
            store: AppointmentStore::new(supabase),
            lifecycle: AppointmentLifecycleService::new(),
        }
    }

    pub async fn book(
        &self,
        patient_id: Uuid,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!(
            "Patient {} requesting slot {}",
            patient_id, request.availability_id
        );

        let slot = self
            .store
            .get_availability(request.availability_id, auth_token)
            .await?;

        if slot.status != AvailabilityStatus::Available {
            return Err(AppointmentError::SlotNotAvailable);
        }

        let appointment = self
            .store
            .insert_appointment(slot.id, patient_id, &request.patient_summary, auth_token)
            .await?;

        self.store
            .set_availability_status(slot.id, AvailabilityStatus::Unavailable, auth_token)
            .await?;

        info!(
            "Patient {} booked appointment {} on slot {}",
            patient_id, appointment.id, slot.id
        );
        Ok(appointment)
    }

    pub async fn cancel(
        &self,
        patient_id: Uuid,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!(
            "Patient {} cancelling appointment {}",
            patient_id, appointment_id
        );

        let appointment = self.store.get_appointment(appointment_id, auth_token).await?;

        if appointment.patient_id != patient_id {
            return Err(AppointmentError::Unauthorized);
        }

        let slot = self
            .store
            .get_availability(appointment.availability_id, auth_token)
            .await?;

        // Only upcoming appointments can be cancelled; past ones belong to
        // the sweep and the GP's missed/write-up flow.
        if slot.slot_time <= Utc::now() {
            return Err(AppointmentError::PastAppointment);
        }

        self.lifecycle.validate_status_transition(
            &appointment.status,
            &AppointmentStatus::CancelledByPatient,
        )?;

        let updated = self
            .store
            .set_appointment_status(
                appointment_id,
                AppointmentStatus::CancelledByPatient,
                auth_token,
            )
            .await?;

        if self
            .lifecycle
            .frees_slot(&AppointmentStatus::CancelledByPatient)
        {
            self.store
                .set_availability_status(slot.id, AvailabilityStatus::Available, auth_token)
                .await?;
        }

        info!(
            "Patient {} cancelled appointment {}, slot {} reopened",
            patient_id, appointment_id, slot.id
        );
        Ok(updated)
    }
}
