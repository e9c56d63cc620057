//! User identity and session records.

use super::{require_id, require_text, string_enum, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimum accepted password length at registration.
pub const PASSWORD_MIN_CHARS: usize = 6;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    Teacher,
    Admin,
}

string_enum!(UserRole {
    Student => "student",
    Teacher => "teacher",
    Admin => "admin",
});

impl UserRole {
    /// Whether this role may author curriculum content and teacher tools.
    pub fn can_author(self) -> bool {
        matches!(self, Self::Teacher | Self::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub class_id: Option<String>,
}

impl User {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("user.id", &self.id)?;
        require_text("user.name", &self.name)?;
        validate_email(&self.email)
    }
}

/// Authenticated session persisted locally after login/register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Checks `value` (trimmed) against a pragmatic `local@domain.tld` shape.
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankField("email"));
    }
    if !EMAIL_RE.is_match(trimmed) {
        return Err(ValidationError::InvalidEmail(trimmed.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_email, UserRole};
    use crate::model::ValidationError;

    #[test]
    fn email_validation_accepts_common_addresses() {
        assert!(validate_email("wanjiru@school.ac.ke").is_ok());
        assert!(validate_email(" otieno.k+math@example.com ").is_ok());
    }

    #[test]
    fn email_validation_rejects_malformed_values() {
        assert_eq!(
            validate_email("  "),
            Err(ValidationError::BlankField("email"))
        );
        assert!(matches!(
            validate_email("not-an-email"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("a@b"),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn only_teachers_and_admins_author() {
        assert!(!UserRole::Student.can_author());
        assert!(UserRole::Teacher.can_author());
        assert!(UserRole::Admin.can_author());
    }
}
