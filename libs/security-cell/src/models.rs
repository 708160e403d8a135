use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordCheckRequest {
    pub password: String,
}

/// Outcome of running a registration field through its rule set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldValidationReport {
    pub valid: bool,
    pub issues: Vec<String>,
}

impl FieldValidationReport {
    pub fn ok() -> Self {
        Self {
            valid: true,
            issues: Vec::new(),
        }
    }

    pub fn rejected(issue: &str) -> Self {
        Self {
            valid: false,
            issues: vec![issue.to_string()],
        }
    }

    pub fn merge(mut self, other: FieldValidationReport) -> Self {
        self.valid = self.valid && other.valid;
        self.issues.extend(other.issues);
        self
    }
}
