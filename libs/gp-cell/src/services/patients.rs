// libs/gp-cell/src/services/patients.rs
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use appointment_cell::models::AppointmentError;
use appointment_cell::services::store::AppointmentStore;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::domain::{UserRecord, UserRole, UserStatus};

use crate::models::{PatientRecordView, PatientView};

/// Patient lookups available to a GP: the activated-patient directory and a
/// patient's medical history.
pub struct PatientDirectoryService {
    supabase: Arc<SupabaseClient>,
    store: AppointmentStore,
}

fn to_patient_view(user: UserRecord) -> PatientView {
    PatientView {
        patient_id: user.id,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        phone: user.phone,
        address: user.address,
        location: user.location,
    }
}

impl PatientDirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        let store = AppointmentStore::new(Arc::clone(&supabase));
        Self { supabase, store }
    }

    /// Substring search over activated patients' names. An empty search
    /// lists the whole directory.
    pub async fn search_by_name(
        &self,
        name: &str,
        auth_token: &str,
    ) -> Result<Vec<PatientView>> {
        debug!("Searching patients by name: {:?}", name);

        let base = format!(
            "/rest/v1/users?role_id=eq.{}&status_id=eq.{}",
            UserRole::Patient.code(),
            UserStatus::Activated.code()
        );

        let path = if name.is_empty() {
            base
        } else {
            format!(
                "{}&or=(first_name.ilike.*{}*,last_name.ilike.*{}*)",
                base, name, name
            )
        };

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let users: Vec<UserRecord> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<UserRecord>, _>>()?;

        Ok(users.into_iter().map(to_patient_view).collect())
    }

    /// Exact-id search, constrained to activated patients like the name
    /// search.
    pub async fn search_by_id(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<PatientView>> {
        debug!("Searching patients by id: {}", patient_id);

        let path = format!(
            "/rest/v1/users?id=eq.{}&role_id=eq.{}&status_id=eq.{}",
            patient_id,
            UserRole::Patient.code(),
            UserStatus::Activated.code()
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let users: Vec<UserRecord> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<UserRecord>, _>>()?;

        Ok(users.into_iter().map(to_patient_view).collect())
    }

    pub async fn personal_data(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Option<PatientView>> {
        let path = format!(
            "/rest/v1/users?id=eq.{}&role_id=eq.{}",
            patient_id,
            UserRole::Patient.code()
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let user = match result.into_iter().next() {
            Some(row) => serde_json::from_value::<UserRecord>(row)?,
            None => return Ok(None),
        };

        Ok(Some(to_patient_view(user)))
    }

    /// A patient's medical history: every record of theirs joined with its
    /// slot time, oldest first.
    pub async fn medical_history(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<PatientRecordView>, AppointmentError> {
        debug!("Fetching medical history for patient {}", patient_id);

        let appointments = self
            .store
            .appointments_for_patient(patient_id, auth_token)
            .await?;
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

        let slot_times: HashMap<Uuid, chrono::DateTime<chrono::Utc>> = slots
            .into_iter()
            .map(|slot| (slot.id, slot.slot_time))
            .collect();
        let slot_of_appointment: HashMap<Uuid, Uuid> = appointments
            .iter()
            .map(|apt| (apt.id, apt.availability_id))
            .collect();

        let mut views: Vec<PatientRecordView> = records
            .into_iter()
            .filter_map(|record| {
                let availability_id = slot_of_appointment.get(&record.appointment_id)?;
                let slot_time = slot_times.get(availability_id)?;
                Some(PatientRecordView {
                    appointment_id: record.appointment_id,
                    slot_time: *slot_time,
                    diagnosis: record.diagnosis,
                    prescription: record.prescription,
                    gp_comment: record.gp_comment,
                })
            })
            .collect();

        views.sort_by_key(|view| view.slot_time);

        Ok(views)
    }
}
