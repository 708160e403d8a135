use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use patient_cell::router::patient_routes;
use shared_config::AppConfig;
use shared_models::domain::{AppointmentStatus, AvailabilityStatus};
use shared_utils::test_utils::{JwtTestUtils, MockClinicRows, TestConfig, TestUser};

fn create_test_app(config: AppConfig) -> Router {
    patient_routes(Arc::new(config))
}

async fn send(
    app: Router,
    method_str: &str,
    uri: &str,
    token: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method_str)
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token));

    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

struct Scenario {
    mock_server: MockServer,
    config: TestConfig,
    patient: TestUser,
    token: String,
}

async fn scenario() -> Scenario {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri());
    let patient = TestUser::patient("pat@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.jwt_secret, Some(24));
    Scenario {
        mock_server,
        config,
        patient,
        token,
    }
}

#[tokio::test]
async fn booking_takes_the_slot_out_of_the_open_pool() {
    let s = scenario().await;

    let availability_id = Uuid::new_v4().to_string();
    let appointment_id = Uuid::new_v4().to_string();
    let gp_id = Uuid::new_v4().to_string();
    let slot_time = Utc::now() + Duration::days(3);

    Mock::given(method("GET"))
        .and(path("/rest/v1/availabilities"))
        .and(query_param("id", format!("eq.{}", availability_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::availability_row(
                &availability_id,
                &gp_id,
                slot_time,
                AvailabilityStatus::Available
            )
        ])))
        .mount(&s.mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({ "status_id": 0 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockClinicRows::appointment_row(
                &appointment_id,
                &availability_id,
                &s.patient.id,
                AppointmentStatus::PendingConfirmation
            )
        ])))
        .expect(1)
        .mount(&s.mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/availabilities"))
        .and(body_partial_json(json!({ "status_id": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::availability_row(
                &availability_id,
                &gp_id,
                slot_time,
                AvailabilityStatus::Unavailable
            )
        ])))
        .expect(1)
        .mount(&s.mock_server)
        .await;

    let app = create_test_app(s.config.to_app_config());
    let (status, body) = send(
        app,
        "POST",
        "/appointments",
        &s.token,
        Some(json!({
            "availability_id": availability_id,
            "patient_summary": "Persistent cough"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["appointment"]["status_id"], 0);
}

#[tokio::test]
async fn a_taken_slot_cannot_be_booked_again() {
    let s = scenario().await;

    let availability_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/availabilities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::availability_row(
                &availability_id,
                &Uuid::new_v4().to_string(),
                Utc::now() + Duration::days(3),
                AvailabilityStatus::Unavailable
            )
        ])))
        .mount(&s.mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&s.mock_server)
        .await;

    let app = create_test_app(s.config.to_app_config());
    let (status, _) = send(
        app,
        "POST",
        "/appointments",
        &s.token,
        Some(json!({
            "availability_id": availability_id,
            "patient_summary": "Persistent cough"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn cancelling_an_upcoming_booking_releases_the_slot() {
    let s = scenario().await;

    let appointment_id = Uuid::new_v4().to_string();
    let availability_id = Uuid::new_v4().to_string();
    let gp_id = Uuid::new_v4().to_string();
    let slot_time = Utc::now() + Duration::days(2);

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::appointment_row(
                &appointment_id,
                &availability_id,
                &s.patient.id,
                AppointmentStatus::Confirmed
            )
        ])))
        .mount(&s.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/availabilities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::availability_row(
                &availability_id,
                &gp_id,
                slot_time,
                AvailabilityStatus::Unavailable
            )
        ])))
        .mount(&s.mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({ "status_id": -2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::appointment_row(
                &appointment_id,
                &availability_id,
                &s.patient.id,
                AppointmentStatus::CancelledByPatient
            )
        ])))
        .expect(1)
        .mount(&s.mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/availabilities"))
        .and(body_partial_json(json!({ "status_id": 0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::availability_row(
                &availability_id,
                &gp_id,
                slot_time,
                AvailabilityStatus::Available
            )
        ])))
        .expect(1)
        .mount(&s.mock_server)
        .await;

    let app = create_test_app(s.config.to_app_config());
    let (status, body) = send(
        app,
        "POST",
        &format!("/appointments/{}/cancel", appointment_id),
        &s.token,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment"]["status_id"], -2);
}

#[tokio::test]
async fn someone_elses_appointment_cannot_be_cancelled() {
    let s = scenario().await;

    let appointment_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::appointment_row(
                &appointment_id,
                &Uuid::new_v4().to_string(),
                &Uuid::new_v4().to_string(),
                AppointmentStatus::PendingConfirmation
            )
        ])))
        .mount(&s.mock_server)
        .await;

    let app = create_test_app(s.config.to_app_config());
    let (status, _) = send(
        app,
        "POST",
        &format!("/appointments/{}/cancel", appointment_id),
        &s.token,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn past_appointments_cannot_be_cancelled() {
    let s = scenario().await;

    let appointment_id = Uuid::new_v4().to_string();
    let availability_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::appointment_row(
                &appointment_id,
                &availability_id,
                &s.patient.id,
                AppointmentStatus::Confirmed
            )
        ])))
        .mount(&s.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/availabilities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::availability_row(
                &availability_id,
                &Uuid::new_v4().to_string(),
                Utc::now() - Duration::hours(2),
                AvailabilityStatus::Unavailable
            )
        ])))
        .mount(&s.mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&s.mock_server)
        .await;

    let app = create_test_app(s.config.to_app_config());
    let (status, _) = send(
        app,
        "POST",
        &format!("/appointments/{}/cancel", appointment_id),
        &s.token,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upcoming_view_joins_gp_details() {
    let s = scenario().await;

    let appointment_id = Uuid::new_v4().to_string();
    let availability_id = Uuid::new_v4().to_string();
    let gp_id = Uuid::new_v4().to_string();
    let slot_time = Utc::now() + Duration::days(4);

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("patient_id", format!("eq.{}", s.patient.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::appointment_row(
                &appointment_id,
                &availability_id,
                &s.patient.id,
                AppointmentStatus::Confirmed
            )
        ])))
        .mount(&s.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/availabilities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::availability_row(
                &availability_id,
                &gp_id,
                slot_time,
                AvailabilityStatus::Unavailable
            )
        ])))
        .mount(&s.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::active_gp_row(&gp_id, "gp@example.com")
        ])))
        .mount(&s.mock_server)
        .await;

    let app = create_test_app(s.config.to_app_config());
    let (status, body) = send(app, "GET", "/appointments?view=upcoming", &s.token, None).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body["appointments"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], "CONFIRMED");
    assert_eq!(rows[0]["gp_email"], "gp@example.com");
    assert_eq!(rows[0]["location"], "London");
}

#[tokio::test]
async fn prescription_history_returns_only_completed_outcomes() {
    let s = scenario().await;

    let completed_id = Uuid::new_v4().to_string();
    let pending_id = Uuid::new_v4().to_string();
    let availability_id = Uuid::new_v4().to_string();
    let other_slot_id = Uuid::new_v4().to_string();
    let gp_id = Uuid::new_v4().to_string();
    let record_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::appointment_row(
                &completed_id,
                &availability_id,
                &s.patient.id,
                AppointmentStatus::CompletedWithPrescription
            ),
            MockClinicRows::appointment_row(
                &pending_id,
                &other_slot_id,
                &s.patient.id,
                AppointmentStatus::PendingConfirmation
            ),
        ])))
        .mount(&s.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/medical_records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::medical_record_row(&record_id, &completed_id, Some("ibuprofen 200mg"))
        ])))
        .mount(&s.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/availabilities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::availability_row(
                &availability_id,
                &gp_id,
                Utc::now() - Duration::days(10),
                AvailabilityStatus::Unavailable
            )
        ])))
        .mount(&s.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::active_gp_row(&gp_id, "gp@example.com")
        ])))
        .mount(&s.mock_server)
        .await;

    let app = create_test_app(s.config.to_app_config());
    let (status, body) = send(app, "GET", "/prescriptions", &s.token, None).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body["prescriptions"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["appointment_id"], completed_id);
    assert_eq!(rows[0]["prescription"], "ibuprofen 200mg");
}

#[tokio::test]
async fn gp_tokens_are_rejected_by_the_role_guard() {
    let s = scenario().await;

    let gp = TestUser::gp("gp@example.com");
    let gp_token = JwtTestUtils::create_test_token(&gp, &s.config.jwt_secret, Some(24));

    let app = create_test_app(s.config.to_app_config());
    let (status, _) = send(app, "GET", "/prescriptions", &gp_token, None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}
