// =====================================================================================
// REGISTRATION VALIDATION - FIELD RULES FOR NEW ACCOUNTS
// =====================================================================================

use std::sync::OnceLock;

use regex::Regex;

use crate::models::FieldValidationReport;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9_.]+@[a-zA-Z0-9]+(\.[a-zA-Z0-9]+)+$").unwrap()
    })
}

fn password_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Word characters only, 5 to 10 of them.
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]{5,10}$").unwrap())
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // UK mobile: leading 07, eleven digits total.
    PATTERN.get_or_init(|| Regex::new(r"^07[0-9]{9}$").unwrap())
}

pub struct RegistrationValidator;

impl RegistrationValidator {
    pub fn validate_email(email: &str) -> FieldValidationReport {
        if email_pattern().is_match(email) {
            FieldValidationReport::ok()
        } else {
            FieldValidationReport::rejected("Email address is not valid")
        }
    }

    pub fn validate_password(password: &str) -> FieldValidationReport {
        if password_pattern().is_match(password) {
            FieldValidationReport::ok()
        } else {
            FieldValidationReport::rejected(
                "Password must be 5-10 characters of letters, digits or underscores",
            )
        }
    }

    pub fn validate_phone(phone: &str) -> FieldValidationReport {
        if phone_pattern().is_match(phone) {
            FieldValidationReport::ok()
        } else {
            FieldValidationReport::rejected("Phone number must be 11 digits starting with 07")
        }
    }

    /// Runs every registration field rule, collecting all failures.
    pub fn validate_registration(
        email: &str,
        password: &str,
        phone: &str,
    ) -> FieldValidationReport {
        Self::validate_email(email)
            .merge(Self::validate_password(password))
            .merge(Self::validate_phone(phone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_registration_fields() {
        let report =
            RegistrationValidator::validate_registration("jane.doe@mail.com", "pass_9", "07911123456");

        assert!(report.valid);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn rejects_bad_email_shapes() {
        assert!(!RegistrationValidator::validate_email("no-at-sign").valid);
        assert!(!RegistrationValidator::validate_email("a@b").valid);
        assert!(!RegistrationValidator::validate_email("a b@mail.com").valid);
        assert!(RegistrationValidator::validate_email("a_b@mail.co.uk").valid);
    }

    #[test]
    fn password_length_bounds_are_enforced() {
        assert!(!RegistrationValidator::validate_password("abcd").valid);
        assert!(RegistrationValidator::validate_password("abcde").valid);
        assert!(RegistrationValidator::validate_password("abcdefghij").valid);
        assert!(!RegistrationValidator::validate_password("abcdefghijk").valid);
        assert!(!RegistrationValidator::validate_password("with space").valid);
    }

    #[test]
    fn phone_must_be_uk_mobile_shaped() {
        assert!(RegistrationValidator::validate_phone("07911123456").valid);
        assert!(!RegistrationValidator::validate_phone("0791112345").valid);
        assert!(!RegistrationValidator::validate_phone("08911123456").valid);
        assert!(!RegistrationValidator::validate_phone("+4791112345").valid);
    }

    #[test]
    fn collects_every_failure_in_one_report() {
        let report = RegistrationValidator::validate_registration("bad", "x", "123");

        assert!(!report.valid);
        assert_eq!(report.issues.len(), 3);
    }
}
