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

use admin_cell::router::admin_routes;
use shared_config::AppConfig;
use shared_models::domain::{AppointmentStatus, AvailabilityStatus, UserRole, UserStatus};
use shared_utils::test_utils::{JwtTestUtils, MockClinicRows, TestConfig, TestUser};

fn create_test_app(config: AppConfig) -> Router {
    admin_routes(Arc::new(config))
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
    token: String,
}

async fn scenario() -> Scenario {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri());
    let admin = TestUser::admin("admin@example.com");
    let token = JwtTestUtils::create_test_token(&admin, &config.jwt_secret, Some(24));
    Scenario {
        mock_server,
        config,
        token,
    }
}

#[tokio::test]
async fn the_all_view_excludes_admin_accounts() {
    let s = scenario().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("role_id", "neq.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::active_gp_row(&Uuid::new_v4().to_string(), "gp@example.com"),
            MockClinicRows::active_patient_row(&Uuid::new_v4().to_string(), "pat@example.com"),
        ])))
        .expect(1)
        .mount(&s.mock_server)
        .await;

    let app = create_test_app(s.config.to_app_config());
    let (status, body) = send(app, "GET", "/users", &s.token, None).await;

    assert_eq!(status, StatusCode::OK);
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["role"], "GP");
    assert_eq!(users[1]["role"], "PATIENT");
}

#[tokio::test]
async fn pending_gp_view_filters_on_both_status_and_role() {
    let s = scenario().await;

    let gp_id = Uuid::new_v4().to_string();
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("status_id", "eq.0"))
        .and(query_param("role_id", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::user_row(
                &gp_id,
                "new.gp@example.com",
                UserRole::Gp,
                UserStatus::PendingActivation,
                "hash"
            )
        ])))
        .expect(1)
        .mount(&s.mock_server)
        .await;

    let app = create_test_app(s.config.to_app_config());
    let (status, body) = send(app, "GET", "/users?view=pending_gps", &s.token, None).await;

    assert_eq!(status, StatusCode::OK);
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["status"], "PENDING ACTIVATION");
    assert_eq!(users[0]["email"], "new.gp@example.com");
}

#[tokio::test]
async fn activation_flips_the_account_status() {
    let s = scenario().await;

    let user_id = Uuid::new_v4().to_string();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", user_id)))
        .and(body_partial_json(json!({ "status_id": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::user_row(
                &user_id,
                "new.gp@example.com",
                UserRole::Gp,
                UserStatus::Activated,
                "hash"
            )
        ])))
        .expect(1)
        .mount(&s.mock_server)
        .await;

    let app = create_test_app(s.config.to_app_config());
    let (status, body) = send(
        app,
        "POST",
        &format!("/users/{}/activate", user_id),
        &s.token,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["status"], "ACTIVATED");
}

#[tokio::test]
async fn deactivation_flips_the_account_status() {
    let s = scenario().await;

    let user_id = Uuid::new_v4().to_string();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .and(body_partial_json(json!({ "status_id": -1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::user_row(
                &user_id,
                "gp@example.com",
                UserRole::Gp,
                UserStatus::Deactivated,
                "hash"
            )
        ])))
        .expect(1)
        .mount(&s.mock_server)
        .await;

    let app = create_test_app(s.config.to_app_config());
    let (status, body) = send(
        app,
        "POST",
        &format!("/users/{}/deactivate", user_id),
        &s.token,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["status"], "DEACTIVATED");
}

#[tokio::test]
async fn pending_reminders_cancel_unconfirmed_next_day_requests() {
    let s = scenario().await;

    let appointment_id = Uuid::new_v4().to_string();
    let availability_id = Uuid::new_v4().to_string();
    let patient_id = Uuid::new_v4().to_string();
    let tomorrow = Utc::now() + Duration::days(1);

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("status_id", "eq.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::appointment_row(
                &appointment_id,
                &availability_id,
                &patient_id,
                AppointmentStatus::PendingConfirmation
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
                tomorrow,
                AvailabilityStatus::Unavailable
            )
        ])))
        .mount(&s.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::active_patient_row(&patient_id, "pat@example.com")
        ])))
        .mount(&s.mock_server)
        .await;

    // The unconfirmed request is withdrawn by the system.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({ "status_id": -4 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::appointment_row(
                &appointment_id,
                &availability_id,
                &patient_id,
                AppointmentStatus::CancelledBySystem
            )
        ])))
        .expect(1)
        .mount(&s.mock_server)
        .await;

    let app = create_test_app(s.config.to_app_config());
    let (status, body) = send(
        app,
        "POST",
        "/reminders",
        &s.token,
        Some(json!({ "kind": "pending" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let notices = body["notices"].as_array().unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["patient_email"], "pat@example.com");
    assert!(notices[0]["message"]
        .as_str()
        .unwrap()
        .contains("not confirmed by the GP"));
}

#[tokio::test]
async fn booked_reminders_do_not_touch_appointment_state() {
    let s = scenario().await;

    let appointment_id = Uuid::new_v4().to_string();
    let availability_id = Uuid::new_v4().to_string();
    let patient_id = Uuid::new_v4().to_string();
    let tomorrow = Utc::now() + Duration::days(1);

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("status_id", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::appointment_row(
                &appointment_id,
                &availability_id,
                &patient_id,
                AppointmentStatus::Confirmed
            )
        ])))
        .mount(&s.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("status_id", "eq.-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&s.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/availabilities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::availability_row(
                &availability_id,
                &Uuid::new_v4().to_string(),
                tomorrow,
                AvailabilityStatus::Unavailable
            )
        ])))
        .mount(&s.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::active_patient_row(&patient_id, "pat@example.com")
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
    let (status, body) = send(
        app,
        "POST",
        "/reminders",
        &s.token,
        Some(json!({ "kind": "booked" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let notices = body["notices"].as_array().unwrap();
    assert_eq!(notices.len(), 1);
    assert!(notices[0]["message"]
        .as_str()
        .unwrap()
        .contains("don't forget"));
}

#[tokio::test]
async fn non_admin_tokens_are_rejected() {
    let s = scenario().await;

    let gp = TestUser::gp("gp@example.com");
    let gp_token = JwtTestUtils::create_test_token(&gp, &s.config.jwt_secret, Some(24));

    let app = create_test_app(s.config.to_app_config());
    let (status, _) = send(app, "GET", "/users", &gp_token, None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}
