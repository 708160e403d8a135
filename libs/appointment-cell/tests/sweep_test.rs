use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::services::sweep::StartupSweepService;
use shared_database::supabase::SupabaseClient;
use shared_models::domain::{AppointmentStatus, AvailabilityStatus};
use shared_utils::test_utils::{MockClinicRows, TestConfig};

const SERVICE_KEY: &str = "test-service-key";

#[tokio::test]
async fn sweep_promotes_past_due_and_leaves_future_bookings_alone() {
    let mock_server = MockServer::start().await;

    let past_confirmed = Uuid::new_v4().to_string();
    let future_confirmed = Uuid::new_v4().to_string();
    let past_pending = Uuid::new_v4().to_string();

    let past_slot = Uuid::new_v4().to_string();
    let future_slot = Uuid::new_v4().to_string();
    let past_pending_slot = Uuid::new_v4().to_string();

    let patient = Uuid::new_v4().to_string();

    let yesterday = Utc::now() - Duration::days(1);
    let tomorrow = Utc::now() + Duration::days(1);

    // Confirmed pass: one past-due, one still in the future.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("status_id", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::appointment_row(
                &past_confirmed,
                &past_slot,
                &patient,
                AppointmentStatus::Confirmed
            ),
            MockClinicRows::appointment_row(
                &future_confirmed,
                &future_slot,
                &patient,
                AppointmentStatus::Confirmed
            ),
        ])))
        .mount(&mock_server)
        .await;

    // Pending pass: one past-due request nobody confirmed.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("status_id", "eq.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::appointment_row(
                &past_pending,
                &past_pending_slot,
                &patient,
                AppointmentStatus::PendingConfirmation
            ),
        ])))
        .mount(&mock_server)
        .await;

    // Slot times for both passes.
    Mock::given(method("GET"))
        .and(path("/rest/v1/availabilities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::availability_row(
                &past_slot,
                &Uuid::new_v4().to_string(),
                yesterday,
                AvailabilityStatus::Unavailable
            ),
            MockClinicRows::availability_row(
                &future_slot,
                &Uuid::new_v4().to_string(),
                tomorrow,
                AvailabilityStatus::Unavailable
            ),
            MockClinicRows::availability_row(
                &past_pending_slot,
                &Uuid::new_v4().to_string(),
                yesterday,
                AvailabilityStatus::Unavailable
            ),
        ])))
        .mount(&mock_server)
        .await;

    // Exactly one promotion to GP action required...
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", past_confirmed)))
        .and(body_partial_json(json!({ "status_id": 4 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::appointment_row(
                &past_confirmed,
                &past_slot,
                &patient,
                AppointmentStatus::GpActionRequired
            ),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    // ...and exactly one system cancellation.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", past_pending)))
        .and(body_partial_json(json!({ "status_id": -4 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::appointment_row(
                &past_pending,
                &past_pending_slot,
                &patient,
                AppointmentStatus::CancelledBySystem
            ),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    let sweep = StartupSweepService::new(Arc::new(SupabaseClient::new(&config)));

    let report = sweep.run(Utc::now(), SERVICE_KEY).await.unwrap();

    assert_eq!(report.promoted_to_action_required, 1);
    assert_eq!(report.cancelled_by_system, 1);
}

#[tokio::test]
async fn sweep_is_a_no_op_when_nothing_is_due() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    let sweep = StartupSweepService::new(Arc::new(SupabaseClient::new(&config)));

    let report = sweep.run(Utc::now(), SERVICE_KEY).await.unwrap();

    assert_eq!(report.promoted_to_action_required, 0);
    assert_eq!(report.cancelled_by_system, 0);
}
