use axum::Json;
use serde_json::{json, Value};
use tracing::debug;

use shared_models::error::AppError;

use crate::models::PasswordCheckRequest;
use crate::services::validation::RegistrationValidator;

/// Pre-registration password check, so clients can surface rule failures
/// before submitting the full registration form.
pub async fn check_password(
    Json(request): Json<PasswordCheckRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Checking candidate password against registration rules");

    let report = RegistrationValidator::validate_password(&request.password);

    Ok(Json(json!({
        "valid": report.valid,
        "issues": report.issues
    })))
}
