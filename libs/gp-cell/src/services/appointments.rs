// libs/gp-cell/src/services/appointments.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, NaiveDate};
use tracing::{debug, info};
use uuid::Uuid;

use appointment_cell::models::{Appointment, AppointmentError, MedicalRecord};
use appointment_cell::services::lifecycle::AppointmentLifecycleService;
use appointment_cell::services::store::AppointmentStore;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::domain::{AppointmentStatus, AvailabilityStatus, UserRecord};

use crate::models::{
    AppointmentDetailView, ConfirmedAppointmentView, IssuePrescriptionRequest,
    PendingAppointmentView,
};
use crate::services::availability::{day_bounds, GpAvailabilityService};

/// Appointment handling from the GP's side of the desk: the pending and
/// confirmed day views, the status transitions a GP may drive, and
/// prescription write-ups.
pub struct GpAppointmentService {
    store: AppointmentStore,
    lifecycle: AppointmentLifecycleService,
}

impl GpAppointmentService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        Self {
            store: AppointmentStore::new(supabase),
            lifecycle: AppointmentLifecycleService::new(),
        }
    }

    /// Booking requests awaiting this GP's decision, on slots strictly
    /// after the given date, earliest first.
    pub async fn pending_after(
        &self,
        gp_id: Uuid,
        after: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<PendingAppointmentView>, AppointmentError> {
        debug!("Listing pending appointments for GP {} after {}", gp_id, after);

        let cutoff = after
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            + ChronoDuration::days(1);

        let slots = self
            .store
            .availabilities_for_gp_from(gp_id, cutoff, auth_token)
            .await?;
        let slot_ids: Vec<Uuid> = slots.iter().map(|slot| slot.id).collect();

        let appointments = self
            .store
            .appointments_for_availabilities(&slot_ids, auth_token)
            .await?;
        let pending: Vec<Appointment> = appointments
            .into_iter()
            .filter(|apt| apt.status == AppointmentStatus::PendingConfirmation)
            .collect();

        let patients = self.patients_by_id(&pending, auth_token).await?;
        let by_slot: HashMap<Uuid, &Appointment> = pending
            .iter()
            .map(|apt| (apt.availability_id, apt))
            .collect();

        // Slots come back ordered by time, so walking them keeps the view
        // in ascending slot order.
        let mut views = Vec::new();
        for slot in &slots {
            if let Some(apt) = by_slot.get(&slot.id) {
                if let Some(patient) = patients.get(&apt.patient_id) {
                    views.push(PendingAppointmentView {
                        appointment_id: apt.id,
                        patient_id: apt.patient_id,
                        patient_first_name: patient.first_name.clone(),
                        patient_last_name: patient.last_name.clone(),
                        slot_time: slot.slot_time,
                        patient_summary: apt.patient_summary.clone(),
                    });
                }
            }
        }

        Ok(views)
    }

    /// The GP's working view for a day: everything confirmed or beyond,
    /// plus missed appointments, in slot order.
    pub async fn confirmed_on(
        &self,
        gp_id: Uuid,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<ConfirmedAppointmentView>, AppointmentError> {
        debug!("Listing confirmed appointments for GP {} on {}", gp_id, date);

        let (start, end) = day_bounds(date);
        let slots = self
            .store
            .availabilities_for_gp_between(gp_id, start, end, auth_token)
            .await?;
        let slot_ids: Vec<Uuid> = slots.iter().map(|slot| slot.id).collect();

        let appointments = self
            .store
            .appointments_for_availabilities(&slot_ids, auth_token)
            .await?;
        let visible: Vec<Appointment> = appointments
            .into_iter()
            .filter(|apt| {
                apt.status.code() > 0 || apt.status == AppointmentStatus::MissedByPatient
            })
            .collect();

        let patients = self.patients_by_id(&visible, auth_token).await?;
        let by_slot: HashMap<Uuid, &Appointment> = visible
            .iter()
            .map(|apt| (apt.availability_id, apt))
            .collect();

        let mut views = Vec::new();
        for slot in &slots {
            if let Some(apt) = by_slot.get(&slot.id) {
                if let Some(patient) = patients.get(&apt.patient_id) {
                    views.push(ConfirmedAppointmentView {
                        appointment_id: apt.id,
                        patient_id: apt.patient_id,
                        patient_first_name: patient.first_name.clone(),
                        patient_last_name: patient.last_name.clone(),
                        slot_time: slot.slot_time,
                        status: apt.status.to_string(),
                        patient_summary: apt.patient_summary.clone(),
                    });
                }
            }
        }

        Ok(views)
    }

    /// Approve a booking request. The slot stays taken.
    pub async fn confirm(
        &self,
        gp_id: Uuid,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.owned_appointment(gp_id, appointment_id, auth_token).await?;

        self.lifecycle
            .validate_status_transition(&appointment.status, &AppointmentStatus::Confirmed)?;

        let updated = self
            .store
            .set_appointment_status(appointment_id, AppointmentStatus::Confirmed, auth_token)
            .await?;

        info!("GP {} confirmed appointment {}", gp_id, appointment_id);
        Ok(updated)
    }

    /// Decline a booking request and hand the slot back to the open pool.
    pub async fn cancel(
        &self,
        gp_id: Uuid,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.owned_appointment(gp_id, appointment_id, auth_token).await?;

        self.lifecycle
            .validate_status_transition(&appointment.status, &AppointmentStatus::CancelledByGp)?;

        let updated = self
            .store
            .set_appointment_status(appointment_id, AppointmentStatus::CancelledByGp, auth_token)
            .await?;

        if self.lifecycle.frees_slot(&AppointmentStatus::CancelledByGp) {
            self.store
                .set_availability_status(
                    appointment.availability_id,
                    AvailabilityStatus::Available,
                    auth_token,
                )
                .await?;
        }

        info!("GP {} cancelled appointment {}", gp_id, appointment_id);
        Ok(updated)
    }

    /// Record that the patient did not show up for a confirmed appointment.
    pub async fn mark_missed(
        &self,
        gp_id: Uuid,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.owned_appointment(gp_id, appointment_id, auth_token).await?;

        self.lifecycle
            .validate_status_transition(&appointment.status, &AppointmentStatus::MissedByPatient)?;

        let updated = self
            .store
            .set_appointment_status(appointment_id, AppointmentStatus::MissedByPatient, auth_token)
            .await?;

        info!("GP {} marked appointment {} as missed", gp_id, appointment_id);
        Ok(updated)
    }

    /// Write up an appointment. The completion status depends on whether a
    /// prescription was given, and the medical record is created or
    /// refreshed accordingly.
    pub async fn issue_prescription(
        &self,
        gp_id: Uuid,
        appointment_id: Uuid,
        request: IssuePrescriptionRequest,
        auth_token: &str,
    ) -> Result<(Appointment, MedicalRecord), AppointmentError> {
        let appointment = self.owned_appointment(gp_id, appointment_id, auth_token).await?;

        let prescription = request
            .prescription
            .as_deref()
            .filter(|text| !text.trim().is_empty());
        let target = self.lifecycle.completion_for_prescription(prescription);

        self.lifecycle
            .validate_status_transition(&appointment.status, &target)?;

        let updated = self
            .store
            .set_appointment_status(appointment_id, target, auth_token)
            .await?;

        let record = match self
            .store
            .medical_record_for(appointment_id, auth_token)
            .await?
        {
            Some(_) => {
                self.store
                    .update_medical_record(
                        appointment_id,
                        prescription,
                        &request.diagnosis,
                        &request.gp_comment,
                        auth_token,
                    )
                    .await?
            }
            None => {
                self.store
                    .insert_medical_record(
                        appointment_id,
                        prescription,
                        &request.diagnosis,
                        &request.gp_comment,
                        auth_token,
                    )
                    .await?
            }
        };

        info!(
            "GP {} completed appointment {} ({})",
            gp_id, appointment_id, target
        );
        Ok((updated, record))
    }

    pub async fn detail(
        &self,
        gp_id: Uuid,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<AppointmentDetailView, AppointmentError> {
        let appointment = self.owned_appointment(gp_id, appointment_id, auth_token).await?;
        let slot = self
            .store
            .get_availability(appointment.availability_id, auth_token)
            .await?;

        Ok(AppointmentDetailView {
            appointment_id: appointment.id,
            status: appointment.status.to_string(),
            slot_time: slot.slot_time,
            patient_summary: appointment.patient_summary,
        })
    }

    pub async fn record_for_appointment(
        &self,
        gp_id: Uuid,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<MedicalRecord, AppointmentError> {
        self.owned_appointment(gp_id, appointment_id, auth_token).await?;

        self.store
            .medical_record_for(appointment_id, auth_token)
            .await?
            .ok_or(AppointmentError::RecordNotFound)
    }

    async fn owned_appointment(
        &self,
        gp_id: Uuid,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.store.get_appointment(appointment_id, auth_token).await?;
        GpAvailabilityService::slot_owned_by(&self.store, &appointment, gp_id, auth_token).await?;
        Ok(appointment)
    }

    async fn patients_by_id(
        &self,
        appointments: &[Appointment],
        auth_token: &str,
    ) -> Result<HashMap<Uuid, UserRecord>, AppointmentError> {
        let patient_ids: Vec<Uuid> = appointments.iter().map(|apt| apt.patient_id).collect();
        let users = self.store.users_by_ids(&patient_ids, auth_token).await?;

        Ok(users.into_iter().map(|user| (user.id, user)).collect())
    }
}
