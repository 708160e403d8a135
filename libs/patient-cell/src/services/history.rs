// libs/patient-cell/src/services/history.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use appointment_cell::models::{Appointment, AppointmentError, Availability};
use appointment_cell::services::store::AppointmentStore;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::domain::{UserRecord, UserRole};

use crate::models::{
    AppointmentViewFilter, OpenSlotView, PatientAppointmentView, PrescriptionView, SlotSearchQuery,
};

/// The patient's read side: their own appointment history, the open-slot
/// search, and their prescription history.
pub struct PatientHistoryService {
    supabase: Arc<SupabaseClient>,
    store: AppointmentStore,
}

impl PatientHistoryService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        let store = AppointmentStore::new(Arc::clone(&supabase));
        Self { supabase, store }
    }

    /// Past appointments newest first, or upcoming ones soonest first,
    /// each joined with the GP's identity and practice details.
    pub async fn appointments(
        &self,
        patient_id: Uuid,
        view: AppointmentViewFilter,
        now: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<Vec<PatientAppointmentView>, AppointmentError> {
        debug!("Listing {:?} appointments for patient {}", view, patient_id);

        let appointments = self
            .store
            .appointments_for_patient(patient_id, auth_token)
            .await?;

        let availability_ids: Vec<Uuid> =
            appointments.iter().map(|apt| apt.availability_id).collect();
        let slots = self
            .store
            .availabilities_by_ids(&availability_ids, auth_token)
            .await?;
        let slots_by_id: HashMap<Uuid, &Availability> =
            slots.iter().map(|slot| (slot.id, slot)).collect();

        let gp_ids: Vec<Uuid> = slots.iter().map(|slot| slot.gp_id).collect();
        let gps: HashMap<Uuid, UserRecord> = self
            .store
            .users_by_ids(&gp_ids, auth_token)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        let mut views: Vec<PatientAppointmentView> = appointments
            .iter()
            .filter_map(|apt| {
                let slot = slots_by_id.get(&apt.availability_id)?;
                let keep = match view {
                    AppointmentViewFilter::Past => slot.slot_time < now,
                    AppointmentViewFilter::Upcoming => slot.slot_time > now,
                };
                if !keep {
                    return None;
                }
                let gp = gps.get(&slot.gp_id)?;
                Some(Self::to_view(apt, slot, gp))
            })
            .collect();

        match view {
            AppointmentViewFilter::Past => {
                views.sort_by(|a, b| b.slot_time.cmp(&a.slot_time));
            }
            AppointmentViewFilter::Upcoming => {
                views.sort_by(|a, b| a.slot_time.cmp(&b.slot_time));
            }
        }

        Ok(views)
    }

    /// Open slots offered by GPs at a practice location on a date.
    pub async fn open_slots(
        &self,
        query: SlotSearchQuery,
        auth_token: &str,
    ) -> Result<Vec<OpenSlotView>, AppointmentError> {
        debug!(
            "Searching open slots on {} around {}",
            query.date, query.location
        );

        let gps = self.gps_at_location(&query.location, auth_token).await?;
        let gp_ids: Vec<Uuid> = gps.keys().copied().collect();

        let (start, end) = day_bounds(query.date);
        let slots = self
            .store
            .open_slots_for_gps(&gp_ids, start, end, auth_token)
            .await?;

        Ok(slots
            .into_iter()
            .filter_map(|slot| {
                let gp = gps.get(&slot.gp_id)?;
                Some(OpenSlotView {
                    availability_id: slot.id,
                    gp_id: slot.gp_id,
                    slot_time: slot.slot_time,
                    gp_first_name: gp.first_name.clone(),
                    gp_last_name: gp.last_name.clone(),
                    address: gp.address.clone(),
                })
            })
            .collect())
    }

    /// Everything prescribed to the patient across completed appointments,
    /// newest first.
    pub async fn prescriptions(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<PrescriptionView>, AppointmentError> {
        debug!("Listing prescriptions for patient {}", patient_id);

        let appointments: Vec<Appointment> = self
            .store
            .appointments_for_patient(patient_id, auth_token)
            .await?
            .into_iter()
            .filter(|apt| apt.status.is_completed())
            .collect();

        let appointment_ids: Vec<Uuid> = appointments.iter().map(|apt| apt.id).collect();
        let records = self
            .store
            .medical_records_for(&appointment_ids, auth_token)
            .await?;

        let availability_ids: Vec<Uuid> =
            appointments.iter().map(|apt| apt.availability_id).collect();
        let slots = self
            .store
            .availabilities_by_ids(&availability_ids, auth_token)
            .await?;
        let slots_by_id: HashMap<Uuid, &Availability> =
            slots.iter().map(|slot| (slot.id, slot)).collect();
        let appointments_by_id: HashMap<Uuid, &Appointment> =
            appointments.iter().map(|apt| (apt.id, apt)).collect();

        let gp_ids: Vec<Uuid> = slots.iter().map(|slot| slot.gp_id).collect();
        let gps: HashMap<Uuid, UserRecord> = self
            .store
            .users_by_ids(&gp_ids, auth_token)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        let mut views: Vec<PrescriptionView> = records
            .into_iter()
            .filter_map(|record| {
                let apt = appointments_by_id.get(&record.appointment_id)?;
                let slot = slots_by_id.get(&apt.availability_id)?;
                let gp = gps.get(&slot.gp_id)?;
                Some(PrescriptionView {
                    appointment_id: record.appointment_id,
                    slot_time: slot.slot_time,
                    gp_id: gp.id,
                    gp_first_name: gp.first_name.clone(),
                    gp_last_name: gp.last_name.clone(),
                    gp_email: gp.email.clone(),
                    diagnosis: record.diagnosis,
                    prescription: record.prescription,
                    gp_comment: record.gp_comment,
                })
            })
            .collect();

        views.sort_by(|a, b| b.slot_time.cmp(&a.slot_time));

        Ok(views)
    }

    fn to_view(
        appointment: &Appointment,
        slot: &Availability,
        gp: &UserRecord,
    ) -> PatientAppointmentView {
        PatientAppointmentView {
            appointment_id: appointment.id,
            status: appointment.status.to_string(),
            slot_time: slot.slot_time,
            gp_id: gp.id,
            gp_first_name: gp.first_name.clone(),
            gp_last_name: gp.last_name.clone(),
            gp_email: gp.email.clone(),
            location: gp.location.clone(),
            address: gp.address.clone(),
        }
    }

    async fn gps_at_location(
        &self,
        location: &str,
        auth_token: &str,
    ) -> Result<HashMap<Uuid, UserRecord>, AppointmentError> {
        let path = format!(
            "/rest/v1/users?role_id=eq.{}&location=eq.{}",
            UserRole::Gp.code(),
            urlencoding::encode(location)
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let gps: Vec<UserRecord> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<UserRecord>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse users: {}", e)))?;

        Ok(gps.into_iter().map(|gp| (gp.id, gp)).collect())
    }
}

fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
    let end = date.and_hms_opt(23, 59, 59).unwrap().and_utc();
    (start, end)
}
