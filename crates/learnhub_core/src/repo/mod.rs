//! Repository layer contracts and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details and remote fetches from services.
//!
//! # Invariants
//! - Write paths validate domain records before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   and remote transport errors.
//! - Repositories refuse connections whose migrations are not applied.

pub mod bookmark_repo;
pub mod cache_repo;
pub mod progress_repo;
pub mod quiz_repo;
pub mod session_repo;
pub mod teacher_repo;

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::ValidationError;
use crate::remote::RemoteError;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence, cache and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound {
        entity: &'static str,
        id: String,
    },
    InvalidData(String),
    /// Remote fetch failed and no cached value exists to fall back to.
    Remote(RemoteError),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl RepoError {
    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Remote(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match required {expected_version}; open it with db::open_db"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Remote(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidData(_) | Self::UninitializedConnection { .. } => {
                None
            }
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RemoteError> for RepoError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

/// Rejects connections that did not go through `open_db`/`open_db_in_memory`.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

pub(crate) fn int_to_bool(column: &str, value: i64) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> RepoResult<String> {
    serde_json::to_string(value)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode json column: {err}")))
}

pub(crate) fn from_json<T: DeserializeOwned>(column: &str, raw: &str) -> RepoResult<T> {
    serde_json::from_str(raw)
        .map_err(|err| RepoError::InvalidData(format!("invalid json in {column}: {err}")))
}

/// Parses a stored enum string with a column-qualified error.
pub(crate) fn parse_enum<T>(
    column: &str,
    raw: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> RepoResult<T> {
    parse(raw).ok_or_else(|| RepoError::InvalidData(format!("invalid value `{raw}` in {column}")))
}
