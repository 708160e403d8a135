// libs/gp-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use appointment_cell::models::{Appointment, AppointmentError, Availability};
use appointment_cell::services::store::AppointmentStore;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::SlotView;

/// The GP's own slot calendar: list a day, offer a slot, withdraw one.
pub struct GpAvailabilityService {
    store: AppointmentStore,
}

pub(crate) fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
    let end = date.and_hms_opt(23, 59, 59).unwrap().and_utc();
    (start, end)
}

impl GpAvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        Self {
            store: AppointmentStore::new(supabase),
        }
    }

    pub async fn slots_for_day(
        &self,
        gp_id: Uuid,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<SlotView>, AppointmentError> {
        debug!("Listing availability for GP {} on {}", gp_id, date);

        let (start, end) = day_bounds(date);
        let slots = self
            .store
            .availabilities_for_gp_between(gp_id, start, end, auth_token)
            .await?;

        Ok(slots
            .into_iter()
            .map(|slot| SlotView::new(slot.id, slot.slot_time, slot.status))
            .collect())
    }

    /// Offer a slot. Adding the same timestamp twice is a no-op returning
    /// the existing slot, so double-submission cannot duplicate offers.
    pub async fn add_slot(
        &self,
        gp_id: Uuid,
        slot_time: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<(Availability, bool), AppointmentError> {
        if let Some(existing) = self.store.find_gp_slot(gp_id, slot_time, auth_token).await? {
            debug!("Slot already offered by GP {} at {}", gp_id, slot_time);
            return Ok((existing, false));
        }

        let created = self
            .store
            .insert_availability(gp_id, slot_time, auth_token)
            .await?;

        info!("GP {} offered slot {} at {}", gp_id, created.id, slot_time);
        Ok((created, true))
    }

    pub async fn remove_slot(
        &self,
        gp_id: Uuid,
        slot_time: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        debug!("GP {} withdrawing slot at {}", gp_id, slot_time);

        self.store.delete_gp_slot(gp_id, slot_time, auth_token).await
    }

    /// Ownership gate shared by the appointment operations: the slot behind
    /// an appointment must belong to the calling GP.
    pub(crate) async fn slot_owned_by(
        store: &AppointmentStore,
        appointment: &Appointment,
        gp_id: Uuid,
        auth_token: &str,
    ) -> Result<Availability, AppointmentError> {
        let slot = store
            .get_availability(appointment.availability_id, auth_token)
            .await?;

        if slot.gp_id != gp_id {
            return Err(AppointmentError::Unauthorized);
        }

        Ok(slot)
    }
}
