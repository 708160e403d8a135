// libs/admin-cell/src/services/reminders.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use appointment_cell::models::{Appointment, AppointmentError};
use appointment_cell::services::lifecycle::AppointmentLifecycleService;
use appointment_cell::services::store::AppointmentStore;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::domain::{AppointmentStatus, UserRecord};

use crate::models::{ReminderKind, ReminderNotice};

/// Next-day notice computation. Delivery is the caller's concern; this
/// service returns the notices and, for still-unconfirmed requests,
/// performs the system cancellation that accompanies the notice.
pub struct ReminderService {
    store: AppointmentStore,
    lifecycle: AppointmentLifecycleService,
}

impl ReminderService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        Self {
            store: AppointmentStore::new(supabase),
            lifecycle: AppointmentLifecycleService::new(),
        }
    }

    pub async fn next_day_notices(
        &self,
        kind: ReminderKind,
        now: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<Vec<ReminderNotice>, AppointmentError> {
        let statuses: &[AppointmentStatus] = match kind {
            ReminderKind::Pending => &[AppointmentStatus::PendingConfirmation],
            ReminderKind::Booked => &[
                AppointmentStatus::Confirmed,
                AppointmentStatus::CancelledByGp,
            ],
        };

        let tomorrow = (now + ChronoDuration::days(1)).date_naive();
        let window_start = tomorrow.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let window_end = tomorrow.and_hms_opt(23, 59, 59).unwrap().and_utc();

        let mut notices = Vec::new();

        for status in statuses {
            let appointments = self
                .store
                .appointments_with_status(*status, auth_token)
                .await?;
            if appointments.is_empty() {
                continue;
            }

            let availability_ids: Vec<Uuid> =
                appointments.iter().map(|apt| apt.availability_id).collect();
            let slots = self
                .store
                .availabilities_by_ids(&availability_ids, auth_token)
                .await?;
            let slot_times: HashMap<Uuid, DateTime<Utc>> = slots
                .into_iter()
                .map(|slot| (slot.id, slot.slot_time))
                .collect();

            let due: Vec<(&Appointment, DateTime<Utc>)> = appointments
                .iter()
                .filter_map(|apt| {
                    let slot_time = *slot_times.get(&apt.availability_id)?;
                    (slot_time >= window_start && slot_time <= window_end)
                        .then_some((apt, slot_time))
                })
                .collect();

            let patient_ids: Vec<Uuid> = due.iter().map(|(apt, _)| apt.patient_id).collect();
            let patients: HashMap<Uuid, UserRecord> = self
                .store
                .users_by_ids(&patient_ids, auth_token)
                .await?
                .into_iter()
                .map(|user| (user.id, user))
                .collect();

            for (appointment, slot_time) in due {
                let patient = match patients.get(&appointment.patient_id) {
                    Some(p) => p,
                    None => continue,
                };

                let message = match self.notice_message(*status, slot_time) {
                    Some(message) => message,
                    None => continue,
                };

                if *status == AppointmentStatus::PendingConfirmation {
                    // The notice doubles as the cancellation: nobody
                    // confirmed, so the system withdraws the request.
                    self.lifecycle.validate_status_transition(
                        &appointment.status,
                        &AppointmentStatus::CancelledBySystem,
                    )?;
                    self.store
                        .set_appointment_status(
                            appointment.id,
                            AppointmentStatus::CancelledBySystem,
                            auth_token,
                        )
                        .await?;
                    debug!(
                        "Unconfirmed appointment {} cancelled by system",
                        appointment.id
                    );
                }

                notices.push(ReminderNotice {
                    appointment_id: appointment.id,
                    patient_email: patient.email.clone(),
                    patient_first_name: patient.first_name.clone(),
                    slot_time,
                    message,
                });
            }
        }

        info!("Computed {} next-day notices ({:?})", notices.len(), kind);
        Ok(notices)
    }

    fn notice_message(&self, status: AppointmentStatus, slot_time: DateTime<Utc>) -> Option<String> {
        let time = slot_time.format("%H:%M");
        match status {
            AppointmentStatus::Confirmed => Some(format!(
                "Please don't forget you have an appointment tomorrow at {}.",
                time
            )),
            AppointmentStatus::PendingConfirmation => Some(format!(
                "Your appointment request for tomorrow at {} has been cancelled because it was not confirmed by the GP.",
                time
            )),
            AppointmentStatus::CancelledByGp => Some(format!(
                "Sorry, your appointment for tomorrow at {} has been cancelled by the GP.",
                time
            )),
            _ => None,
        }
    }
}
