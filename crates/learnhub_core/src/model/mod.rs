//! Domain model for the curriculum hierarchy, assessment and teacher tools.
//!
//! # Responsibility
//! - Define canonical records shared by repositories, services and FFI.
//! - Keep wire (JSON) and storage string forms of enums in one place.
//!
//! # Invariants
//! - Every record is identified by a non-blank string id.
//! - Parent references (`class_id`, `subject_id`, ...) are plain ids; there is
//!   no ownership between records beyond parent/child filtering.
//! - Enum string forms are snake_case and stable across wire and SQLite.

pub mod curriculum;
pub mod engagement;
pub mod progress;
pub mod quiz;
pub mod teacher;
pub mod user;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation error for domain records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required identifier is blank after trim.
    BlankId(&'static str),
    /// Required text field is blank after trim.
    BlankField(&'static str),
    /// Numeric field is out of its allowed range.
    OutOfRange {
        field: &'static str,
        value: i64,
    },
    /// Multiple-choice question has fewer than two options.
    TooFewOptions(usize),
    /// Correct answer is not one of the listed options.
    AnswerNotInOptions(String),
    /// Email does not look like `local@domain.tld`.
    InvalidEmail(String),
    /// Password is shorter than the accepted minimum.
    PasswordTooShort { min: usize },
    /// Date is not a `YYYY-MM-DD` calendar date.
    InvalidDate(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId(field) => write!(f, "{field} must not be blank"),
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::OutOfRange { field, value } => {
                write!(f, "{field} is out of range: {value}")
            }
            Self::TooFewOptions(count) => write!(
                f,
                "multiple choice question needs at least 2 options, got {count}"
            ),
            Self::AnswerNotInOptions(answer) => {
                write!(f, "correct answer `{answer}` is not one of the options")
            }
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::InvalidDate(value) => write!(f, "invalid date `{value}`, expected YYYY-MM-DD"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_id(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankId(field));
    }
    Ok(())
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}

/// Defines `as_str`/`parse` for a fieldless enum with stable string forms.
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Stable snake_case form used on the wire and in SQLite.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            /// Parses the stable string form; returns `None` for unknown values.
            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use string_enum;
