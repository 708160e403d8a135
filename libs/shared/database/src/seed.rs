// libs/shared/database/src/seed.rs
//
// Idempotent seeding of the status/role lookup tables. Every status code
// used anywhere in the system exists in one of these tables, and the codes
// are fixed, so seeding runs on every startup and duplicates are ignored.
use anyhow::Result;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::info;

use shared_models::domain::{AppointmentStatus, AvailabilityStatus, UserRole, UserStatus};

use crate::supabase::{ignore_duplicates, SupabaseClient};

const USER_STATUSES: &[UserStatus] = &[
    UserStatus::Deactivated,
    UserStatus::PendingActivation,
    UserStatus::Activated,
];

const USER_ROLES: &[UserRole] = &[UserRole::Admin, UserRole::Gp, UserRole::Patient];

const AVAILABILITY_STATUSES: &[AvailabilityStatus] = &[
    AvailabilityStatus::Available,
    AvailabilityStatus::Unavailable,
];

const APPOINTMENT_STATUSES: &[AppointmentStatus] = &[
    AppointmentStatus::CancelledBySystem,
    AppointmentStatus::MissedByPatient,
    AppointmentStatus::CancelledByPatient,
    AppointmentStatus::CancelledByGp,
    AppointmentStatus::PendingConfirmation,
    AppointmentStatus::Confirmed,
    AppointmentStatus::CompletedWithoutPrescription,
    AppointmentStatus::CompletedWithPrescription,
    AppointmentStatus::GpActionRequired,
];

pub async fn seed_lookup_tables(client: &SupabaseClient, service_token: &str) -> Result<()> {
    let user_statuses: Vec<Value> = USER_STATUSES
        .iter()
        .map(|s| json!({ "id": s.code(), "name": s.to_string() }))
        .collect();
    seed_table(client, "/rest/v1/user_statuses", user_statuses, service_token).await?;

    let user_roles: Vec<Value> = USER_ROLES
        .iter()
        .map(|r| json!({ "id": r.code(), "name": r.to_string() }))
        .collect();
    seed_table(client, "/rest/v1/user_roles", user_roles, service_token).await?;

    let availability_statuses: Vec<Value> = AVAILABILITY_STATUSES
        .iter()
        .map(|s| json!({ "id": s.code(), "name": s.to_string() }))
        .collect();
    seed_table(
        client,
        "/rest/v1/availability_statuses",
        availability_statuses,
        service_token,
    )
    .await?;

    let appointment_statuses: Vec<Value> = APPOINTMENT_STATUSES
        .iter()
        .map(|s| json!({ "id": s.code(), "name": s.to_string() }))
        .collect();
    seed_table(
        client,
        "/rest/v1/appointment_statuses",
        appointment_statuses,
        service_token,
    )
    .await?;

    info!("Lookup tables seeded");
    Ok(())
}

async fn seed_table(
    client: &SupabaseClient,
    path: &str,
    rows: Vec<Value>,
    service_token: &str,
) -> Result<()> {
    let _: Value = client
        .request_with_headers(
            Method::POST,
            path,
            Some(service_token),
            Some(Value::Array(rows)),
            Some(ignore_duplicates()),
        )
        .await?;

    Ok(())
}
