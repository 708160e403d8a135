// =====================================================================================
// SECURITY CELL - CREDENTIAL HASHING & REGISTRATION RULES
// =====================================================================================

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{FieldValidationReport, PasswordCheckRequest};
pub use services::{PasswordSecurityService, RegistrationValidator};
pub use router::security_routes;
