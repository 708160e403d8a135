use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::router::auth_routes;
use security_cell::services::password::PasswordSecurityService;
use shared_config::AppConfig;
use shared_models::domain::{UserRole, UserStatus};
use shared_utils::test_utils::{MockClinicRows, TestConfig};

fn create_test_app(config: AppConfig) -> Router {
    auth_routes(Arc::new(config))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn mount_user_row(mock_server: &MockServer, email: &str, row: Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", format!("eq.{}", email)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn login_succeeds_and_issues_a_role_scoped_token() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_base_url(&mock_server.uri());

    let gp_id = Uuid::new_v4().to_string();
    let hash = PasswordSecurityService::hash_password("Gp_pass9").unwrap();
    mount_user_row(
        &mock_server,
        "gp@example.com",
        MockClinicRows::user_row(
            &gp_id,
            "gp@example.com",
            UserRole::Gp,
            UserStatus::Activated,
            &hash,
        ),
    )
    .await;

    let app = create_test_app(test_config.to_app_config());
    let (status, body) = post_json(
        app,
        "/login",
        json!({ "email": "gp@example.com", "password": "Gp_pass9" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["login"]["role"], "gp");
    assert_eq!(body["login"]["user_id"], gp_id);

    // The issued token must validate against the same secret and carry the
    // role claim used for dispatch.
    let token = body["login"]["token"].as_str().unwrap();
    let user = shared_utils::jwt::validate_token(token, &test_config.jwt_secret).unwrap();
    assert_eq!(user.role.as_deref(), Some("gp"));
    assert_eq!(user.id, gp_id);
}

#[tokio::test]
async fn login_distinguishes_unknown_email_from_bad_password() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_base_url(&mock_server.uri());

    // Unknown email: the users query comes back empty.
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.nobody@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let patient_id = Uuid::new_v4().to_string();
    let hash = PasswordSecurityService::hash_password("right_1").unwrap();
    mount_user_row(
        &mock_server,
        "patient@example.com",
        MockClinicRows::user_row(
            &patient_id,
            "patient@example.com",
            UserRole::Patient,
            UserStatus::Activated,
            &hash,
        ),
    )
    .await;

    let app = create_test_app(test_config.to_app_config());
    let (status, body) = post_json(
        app.clone(),
        "/login",
        json!({ "email": "nobody@example.com", "password": "whatever1" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Email does not exist");

    let (status, body) = post_json(
        app,
        "/login",
        json!({ "email": "patient@example.com", "password": "wrong_1" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Incorrect password");
}

#[tokio::test]
async fn login_gates_on_account_status() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_base_url(&mock_server.uri());

    let hash = PasswordSecurityService::hash_password("pass_w1").unwrap();

    mount_user_row(
        &mock_server,
        "pending@example.com",
        MockClinicRows::user_row(
            &Uuid::new_v4().to_string(),
            "pending@example.com",
            UserRole::Patient,
            UserStatus::PendingActivation,
            &hash,
        ),
    )
    .await;

    mount_user_row(
        &mock_server,
        "gone@example.com",
        MockClinicRows::user_row(
            &Uuid::new_v4().to_string(),
            "gone@example.com",
            UserRole::Gp,
            UserStatus::Deactivated,
            &hash,
        ),
    )
    .await;

    let app = create_test_app(test_config.to_app_config());

    let (status, body) = post_json(
        app.clone(),
        "/login",
        json!({ "email": "pending@example.com", "password": "pass_w1" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Your account is pending activation");

    let (status, body) = post_json(
        app,
        "/login",
        json!({ "email": "gone@example.com", "password": "pass_w1" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Your account has been deactivated");
}

#[tokio::test]
async fn registration_rejects_invalid_fields_before_touching_the_store() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_base_url(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = create_test_app(test_config.to_app_config());
    let (status, body) = post_json(
        app,
        "/register",
        json!({
            "email": "not-an-email",
            "password": "x",
            "first_name": "Pat",
            "last_name": "Smith",
            "phone": "12345",
            "address": "1 Example Street",
            "location": "London",
            "role": "patient"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("Email address is not valid"));
    assert!(message.contains("Password must be"));
    assert!(message.contains("Phone number must be"));
}

#[tokio::test]
async fn registration_refuses_admin_accounts_and_taken_emails() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_base_url(&mock_server.uri());

    mount_user_row(
        &mock_server,
        "taken@example.com",
        MockClinicRows::user_row(
            &Uuid::new_v4().to_string(),
            "taken@example.com",
            UserRole::Patient,
            UserStatus::Activated,
            "hash",
        ),
    )
    .await;

    let app = create_test_app(test_config.to_app_config());

    let admin_attempt = json!({
        "email": "new@example.com",
        "password": "pass_w1",
        "first_name": "Pat",
        "last_name": "Smith",
        "phone": "07911123456",
        "address": "1 Example Street",
        "location": "London",
        "role": "admin"
    });
    let (status, _) = post_json(app.clone(), "/register", admin_attempt).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let taken = json!({
        "email": "taken@example.com",
        "password": "pass_w1",
        "first_name": "Pat",
        "last_name": "Smith",
        "phone": "07911123456",
        "address": "1 Example Street",
        "location": "London",
        "role": "patient"
    });
    let (status, _) = post_json(app, "/register", taken).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn registration_creates_a_pending_account() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_base_url(&mock_server.uri());

    let new_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.new.gp@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockClinicRows::user_row(
                &new_id,
                "new.gp@example.com",
                UserRole::Gp,
                UserStatus::PendingActivation,
                "stored-hash"
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(test_config.to_app_config());
    let (status, body) = post_json(
        app,
        "/register",
        json!({
            "email": "new.gp@example.com",
            "password": "gp_pass1",
            "first_name": "Greta",
            "last_name": "Practice",
            "phone": "07911123456",
            "address": "2 Surgery Lane",
            "location": "London",
            "role": "gp"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["id"], new_id);
    assert_eq!(body["user"]["role"], "gp");
    assert_eq!(body["user"]["status"], "PENDING ACTIVATION");
}
