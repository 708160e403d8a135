use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use dotenv::dotenv;
use reqwest::Method;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{error, info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::services::sweep::StartupSweepService;
use security_cell::services::password::PasswordSecurityService;
use shared_config::AppConfig;
use shared_database::seed::seed_lookup_tables;
use shared_database::supabase::{return_representation, SupabaseClient};
use shared_models::domain::{UserRole, UserStatus};

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting GP Clinic API server");

    // Load configuration
    let config = AppConfig::from_env();

    // Seeding and the past-due sweep run before the server accepts
    // traffic, matching the original application's startup order.
    if config.has_service_credentials() {
        run_startup_tasks(&config).await;
    } else {
        warn!("Service credentials missing; skipping seeding and startup sweep");
    }

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Create shared state
    let state = Arc::new(config);

    // Build the application router
    let app = router::create_router(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn run_startup_tasks(config: &AppConfig) {
    let client = Arc::new(SupabaseClient::new(config));
    let service_key = config.supabase_service_key.clone();

    if let Err(e) = seed_lookup_tables(&client, &service_key).await {
        error!("Lookup table seeding failed: {}", e);
    }

    if let Err(e) = ensure_bootstrap_admin(&client, config).await {
        error!("Bootstrap admin check failed: {}", e);
    }

    let sweep = StartupSweepService::new(Arc::clone(&client));
    match sweep.run(Utc::now(), &service_key).await {
        Ok(report) => info!(
            "Past-due sweep: {} now need GP action, {} cancelled by system",
            report.promoted_to_action_required, report.cancelled_by_system
        ),
        Err(e) => error!("Startup sweep failed: {}", e),
    }
}

/// The system is only administrable with at least one admin account, so
/// one is created on first run from the bootstrap credentials.
async fn ensure_bootstrap_admin(
    client: &SupabaseClient,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let path = format!("/rest/v1/users?email=eq.{}", config.bootstrap_admin_email);
    let existing: Vec<Value> = client
        .request(Method::GET, &path, Some(&config.supabase_service_key), None)
        .await?;

    if !existing.is_empty() {
        return Ok(());
    }

    if config.bootstrap_admin_password.is_empty() {
        warn!("No bootstrap admin exists and BOOTSTRAP_ADMIN_PASSWORD is unset");
        return Ok(());
    }

    let password_hash = PasswordSecurityService::hash_password(&config.bootstrap_admin_password)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?;

    let now = Utc::now();
    let admin_data = json!({
        "email": config.bootstrap_admin_email,
        "password_hash": password_hash,
        "first_name": "Clinic",
        "last_name": "Administrator",
        "phone": "07000000000",
        "address": "Clinic front desk",
        "location": "London",
        "status_id": UserStatus::Activated.code(),
        "role_id": UserRole::Admin.code(),
        "created_at": now.to_rfc3339(),
        "updated_at": now.to_rfc3339()
    });

    let _: Vec<Value> = client
        .request_with_headers(
            Method::POST,
            "/rest/v1/users",
            Some(&config.supabase_service_key),
            Some(admin_data),
            Some(return_representation()),
        )
        .await?;

    info!("Bootstrap admin account created: {}", config.bootstrap_admin_email);
    Ok(())
}
