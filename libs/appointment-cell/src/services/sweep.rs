// libs/appointment-cell/src/services/sweep.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;
use shared_models::domain::AppointmentStatus;

use crate::models::AppointmentError;
use crate::services::store::AppointmentStore;

/// Past-due promotion run once at startup, before the server accepts
/// traffic: confirmed appointments whose slot time has passed need GP
/// attention, pending ones nobody confirmed are cancelled by the system.
pub struct StartupSweepService {
    store: AppointmentStore,
}

#[derive(Debug, Default, Serialize)]
pub struct SweepReport {
    pub promoted_to_action_required: usize,
    pub cancelled_by_system: usize,
}

impl StartupSweepService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self {
            store: AppointmentStore::new(supabase),
        }
    }

    pub async fn run(
        &self,
        now: DateTime<Utc>,
        service_token: &str,
    ) -> Result<SweepReport, AppointmentError> {
        let promoted = self
            .promote_past_due(
                AppointmentStatus::Confirmed,
                AppointmentStatus::GpActionRequired,
                now,
                service_token,
            )
            .await?;

        let cancelled = self
            .promote_past_due(
                AppointmentStatus::PendingConfirmation,
                AppointmentStatus::CancelledBySystem,
                now,
                service_token,
            )
            .await?;

        let report = SweepReport {
            promoted_to_action_required: promoted,
            cancelled_by_system: cancelled,
        };

        info!(
            "Startup sweep complete: {} promoted to GP action required, {} cancelled by system",
            report.promoted_to_action_required, report.cancelled_by_system
        );

        Ok(report)
    }

    async fn promote_past_due(
        &self,
        from: AppointmentStatus,
        to: AppointmentStatus,
        now: DateTime<Utc>,
        service_token: &str,
    ) -> Result<usize, AppointmentError> {
        let appointments = self.store.appointments_with_status(from, service_token).await?;
        if appointments.is_empty() {
            return Ok(0);
        }

        let availability_ids: Vec<Uuid> =
            appointments.iter().map(|apt| apt.availability_id).collect();
        let availabilities = self
            .store
            .availabilities_by_ids(&availability_ids, service_token)
            .await?;

        let slot_times: HashMap<Uuid, DateTime<Utc>> = availabilities
            .into_iter()
            .map(|slot| (slot.id, slot.slot_time))
            .collect();

        let mut updated = 0;
        for appointment in appointments {
            let slot_time = match slot_times.get(&appointment.availability_id) {
                Some(t) => *t,
                None => {
                    // Orphaned booking; leave it for manual cleanup.
                    warn!(
                        "Appointment {} references missing availability {}",
                        appointment.id, appointment.availability_id
                    );
                    continue;
                }
            };

            if slot_time < now {
                self.store
                    .set_appointment_status(appointment.id, to, service_token)
                    .await?;
                updated += 1;
            }
        }

        Ok(updated)
    }
}
