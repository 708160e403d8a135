// libs/appointment-cell/src/services/store.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_database::supabase::{return_representation, SupabaseClient};
use shared_models::domain::{AppointmentStatus, AvailabilityStatus, UserRecord};

use crate::models::{Appointment, AppointmentError, Availability, MedicalRecord};

/// Typed reads and writes for the scheduling tables. Role cells compose
/// this with the lifecycle service instead of talking PostgREST directly.
pub struct AppointmentStore {
    supabase: Arc<SupabaseClient>,
}

fn encode_ts(ts: DateTime<Utc>) -> String {
    urlencoding::encode(&ts.to_rfc3339()).into_owned()
}

fn join_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, AppointmentError> {
    rows.into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse rows: {}", e)))
}

impl AppointmentStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    async fn fetch(&self, path: &str, auth_token: &str) -> Result<Vec<Value>, AppointmentError> {
        self.supabase
            .request(Method::GET, path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }

    async fn write(
        &self,
        method: Method,
        path: &str,
        body: Value,
        auth_token: &str,
    ) -> Result<Vec<Value>, AppointmentError> {
        self.supabase
            .request_with_headers(
                method,
                path,
                Some(auth_token),
                Some(body),
                Some(return_representation()),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }

    // ==========================================================================
    // AVAILABILITY SLOTS
    // ==========================================================================

    pub async fn get_availability(
        &self,
        availability_id: Uuid,
        auth_token: &str,
    ) -> Result<Availability, AppointmentError> {
        let path = format!("/rest/v1/availabilities?id=eq.{}", availability_id);
        let result = self.fetch(&path, auth_token).await?;

        if result.is_empty() {
            return Err(AppointmentError::AvailabilityNotFound);
        }

        parse_rows::<Availability>(result)?
            .into_iter()
            .next()
            .ok_or(AppointmentError::AvailabilityNotFound)
    }

    pub async fn find_gp_slot(
        &self,
        gp_id: Uuid,
        slot_time: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<Option<Availability>, AppointmentError> {
        let path = format!(
            "/rest/v1/availabilities?gp_id=eq.{}&slot_time=eq.{}",
            gp_id,
            encode_ts(slot_time)
        );
        let result = self.fetch(&path, auth_token).await?;

        Ok(parse_rows::<Availability>(result)?.into_iter().next())
    }

    pub async fn insert_availability(
        &self,
        gp_id: Uuid,
        slot_time: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<Availability, AppointmentError> {
        let now = Utc::now();
        let slot_data = json!({
            "gp_id": gp_id,
            "slot_time": slot_time.to_rfc3339(),
            "status_id": AvailabilityStatus::Available.code(),
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let result = self
            .write(Method::POST, "/rest/v1/availabilities", slot_data, auth_token)
            .await?;

        if result.is_empty() {
            return Err(AppointmentError::DatabaseError(
                "Failed to create availability".to_string(),
            ));
        }

        let slot = parse_rows::<Availability>(result)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                AppointmentError::DatabaseError("Failed to create availability".to_string())
            })?;

        debug!("Availability created with ID: {}", slot.id);
        Ok(slot)
    }

    pub async fn delete_gp_slot(
        &self,
        gp_id: Uuid,
        slot_time: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        let path = format!(
            "/rest/v1/availabilities?gp_id=eq.{}&slot_time=eq.{}",
            gp_id,
            encode_ts(slot_time)
        );

        let _: Vec<Value> = self
            .supabase
            .request(Method::DELETE, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    pub async fn availabilities_for_gp_between(
        &self,
        gp_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<Vec<Availability>, AppointmentError> {
        let path = format!(
            "/rest/v1/availabilities?gp_id=eq.{}&slot_time=gte.{}&slot_time=lte.{}&order=slot_time.asc",
            gp_id,
            encode_ts(from),
            encode_ts(to)
        );
        let result = self.fetch(&path, auth_token).await?;

        parse_rows(result)
    }

    pub async fn availabilities_for_gp_from(
        &self,
        gp_id: Uuid,
        from: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<Vec<Availability>, AppointmentError> {
        let path = format!(
            "/rest/v1/availabilities?gp_id=eq.{}&slot_time=gte.{}&order=slot_time.asc",
            gp_id,
            encode_ts(from)
        );
        let result = self.fetch(&path, auth_token).await?;

        parse_rows(result)
    }

    pub async fn availabilities_by_ids(
        &self,
        ids: &[Uuid],
        auth_token: &str,
    ) -> Result<Vec<Availability>, AppointmentError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let path = format!("/rest/v1/availabilities?id=in.({})", join_ids(ids));
        let result = self.fetch(&path, auth_token).await?;

        parse_rows(result)
    }

    /// Open slots offered by any of the given GPs inside a time window,
    /// earliest first.
    pub async fn open_slots_for_gps(
        &self,
        gp_ids: &[Uuid],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<Vec<Availability>, AppointmentError> {
        if gp_ids.is_empty() {
            return Ok(vec![]);
        }

        let path = format!(
            "/rest/v1/availabilities?gp_id=in.({})&status_id=eq.{}&slot_time=gte.{}&slot_time=lte.{}&order=slot_time.asc",
            join_ids(gp_ids),
            AvailabilityStatus::Available.code(),
            encode_ts(from),
            encode_ts(to)
        );
        let result = self.fetch(&path, auth_token).await?;

        parse_rows(result)
    }

    pub async fn set_availability_status(
        &self,
        availability_id: Uuid,
        status: AvailabilityStatus,
        auth_token: &str,
    ) -> Result<Availability, AppointmentError> {
        let path = format!("/rest/v1/availabilities?id=eq.{}", availability_id);
        let update_data = json!({
            "status_id": status.code(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result = self.write(Method::PATCH, &path, update_data, auth_token).await?;

        if result.is_empty() {
            return Err(AppointmentError::AvailabilityNotFound);
        }

        parse_rows::<Availability>(result)?
            .into_iter()
            .next()
            .ok_or(AppointmentError::AvailabilityNotFound)
    }

    // ==========================================================================
    // APPOINTMENTS
    // ==========================================================================

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result = self.fetch(&path, auth_token).await?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        parse_rows::<Appointment>(result)?
            .into_iter()
            .next()
            .ok_or(AppointmentError::NotFound)
    }

    pub async fn insert_appointment(
        &self,
        availability_id: Uuid,
        patient_id: Uuid,
        patient_summary: &str,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let now = Utc::now();
        let appointment_data = json!({
            "availability_id": availability_id,
            "patient_id": patient_id,
            "status_id": AppointmentStatus::PendingConfirmation.code(),
            "patient_summary": patient_summary,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let result = self
            .write(Method::POST, "/rest/v1/appointments", appointment_data, auth_token)
            .await?;

        if result.is_empty() {
            return Err(AppointmentError::DatabaseError(
                "Failed to create appointment".to_string(),
            ));
        }

        parse_rows::<Appointment>(result)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                AppointmentError::DatabaseError("Failed to create appointment".to_string())
            })
    }

    pub async fn set_appointment_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let update_data = json!({
            "status_id": status.code(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result = self.write(Method::PATCH, &path, update_data, auth_token).await?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        parse_rows::<Appointment>(result)?
            .into_iter()
            .next()
            .ok_or(AppointmentError::NotFound)
    }

    pub async fn appointments_with_status(
        &self,
        status: AppointmentStatus,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?status_id=eq.{}",
            status.code()
        );
        let result = self.fetch(&path, auth_token).await?;

        parse_rows(result)
    }

    pub async fn appointments_for_patient(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!("/rest/v1/appointments?patient_id=eq.{}", patient_id);
        let result = self.fetch(&path, auth_token).await?;

        parse_rows(result)
    }

    pub async fn appointments_for_availabilities(
        &self,
        availability_ids: &[Uuid],
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        if availability_ids.is_empty() {
            return Ok(vec![]);
        }

        let path = format!(
            "/rest/v1/appointments?availability_id=in.({})",
            join_ids(availability_ids)
        );
        let result = self.fetch(&path, auth_token).await?;

        parse_rows(result)
    }

    // ==========================================================================
    // MEDICAL RECORDS
    // ==========================================================================

    pub async fn medical_record_for(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Option<MedicalRecord>, AppointmentError> {
        let path = format!(
            "/rest/v1/medical_records?appointment_id=eq.{}",
            appointment_id
        );
        let result = self.fetch(&path, auth_token).await?;

        Ok(parse_rows::<MedicalRecord>(result)?.into_iter().next())
    }

    pub async fn medical_records_for(
        &self,
        appointment_ids: &[Uuid],
        auth_token: &str,
    ) -> Result<Vec<MedicalRecord>, AppointmentError> {
        if appointment_ids.is_empty() {
            return Ok(vec![]);
        }

        let path = format!(
            "/rest/v1/medical_records?appointment_id=in.({})",
            join_ids(appointment_ids)
        );
        let result = self.fetch(&path, auth_token).await?;

        parse_rows(result)
    }

    pub async fn insert_medical_record(
        &self,
        appointment_id: Uuid,
        prescription: Option<&str>,
        diagnosis: &str,
        gp_comment: &str,
        auth_token: &str,
    ) -> Result<MedicalRecord, AppointmentError> {
        let now = Utc::now();
        let record_data = json!({
            "appointment_id": appointment_id,
            "prescription": prescription,
            "diagnosis": diagnosis,
            "gp_comment": gp_comment,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let result = self
            .write(Method::POST, "/rest/v1/medical_records", record_data, auth_token)
            .await?;

        if result.is_empty() {
            return Err(AppointmentError::DatabaseError(
                "Failed to create medical record".to_string(),
            ));
        }

        parse_rows::<MedicalRecord>(result)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                AppointmentError::DatabaseError("Failed to create medical record".to_string())
            })
    }

    pub async fn update_medical_record(
        &self,
        appointment_id: Uuid,
        prescription: Option<&str>,
        diagnosis: &str,
        gp_comment: &str,
        auth_token: &str,
    ) -> Result<MedicalRecord, AppointmentError> {
        let path = format!(
            "/rest/v1/medical_records?appointment_id=eq.{}",
            appointment_id
        );
        let update_data = json!({
            "prescription": prescription,
            "diagnosis": diagnosis,
            "gp_comment": gp_comment,
            "updated_at": Utc::now().to_rfc3339()
        });

        let result = self.write(Method::PATCH, &path, update_data, auth_token).await?;

        if result.is_empty() {
            return Err(AppointmentError::RecordNotFound);
        }

        parse_rows::<MedicalRecord>(result)?
            .into_iter()
            .next()
            .ok_or(AppointmentError::RecordNotFound)
    }

    // ==========================================================================
    // USER LOOKUPS FOR VIEW JOINS
    // ==========================================================================

    pub async fn users_by_ids(
        &self,
        ids: &[Uuid],
        auth_token: &str,
    ) -> Result<Vec<UserRecord>, AppointmentError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let path = format!("/rest/v1/users?id=in.({})", join_ids(ids));
        let result = self.fetch(&path, auth_token).await?;

        parse_rows(result)
    }
}
