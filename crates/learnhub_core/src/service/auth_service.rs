//! Authentication use cases.
//!
//! # Invariants
//! - Credentials are validated locally before any remote call.
//! - A successful login/register persists exactly one local session.
//! - Logout always clears the local session and cached curriculum, even
//!   when the remote logout call fails. Progress is kept.

use crate::clock::{Clock, SystemClock};
use crate::model::user::{validate_email, Session, PASSWORD_MIN_CHARS};
use crate::model::{require_text, ValidationError};
use crate::remote::{AuthRemote, AuthResponse, LoginRequest, RegisterRequest, RemoteError};
use crate::repo::session_repo::SessionRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum AuthError {
    Validation(ValidationError),
    /// Backend rejected the credentials.
    InvalidCredentials(String),
    Remote(RemoteError),
    Repo(RepoError),
    NotLoggedIn,
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidCredentials(message) => write!(f, "{message}"),
            Self::Remote(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::NotLoggedIn => write!(f, "no active session; please log in"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Remote(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::InvalidCredentials(_) | Self::NotLoggedIn => None,
        }
    }
}

impl From<ValidationError> for AuthError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<RemoteError> for AuthError {
    fn from(value: RemoteError) -> Self {
        if !value.is_unauthorized() {
            return Self::Remote(value);
        }
        match value {
            RemoteError::Status { message, .. } => Self::InvalidCredentials(message),
            other => Self::Remote(other),
        }
    }
}

pub struct AuthService<A: AuthRemote, S: SessionRepository> {
    remote: A,
    sessions: S,
    clock: Box<dyn Clock>,
}

impl<A: AuthRemote, S: SessionRepository> AuthService<A, S> {
    pub fn new(remote: A, sessions: S) -> Self {
        Self {
            remote,
            sessions,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Logs in and persists the session.
    pub fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim();
        validate_email(email)?;
        if password.trim().is_empty() {
            return Err(ValidationError::BlankField("password").into());
        }

        let response = self.remote.login(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let session = self.persist(response)?;
        info!(
            "event=auth_login module=auth status=ok role={}",
            session.user.role
        );
        Ok(session)
    }

    /// Registers a new account and persists the session.
    pub fn register(&self, request: RegisterRequest) -> Result<Session, AuthError> {
        require_text("name", &request.name)?;
        validate_email(&request.email)?;
        if request.password.chars().count() < PASSWORD_MIN_CHARS {
            return Err(ValidationError::PasswordTooShort {
                min: PASSWORD_MIN_CHARS,
            }
            .into());
        }

        let request = RegisterRequest {
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            ..request
        };
        let response = self.remote.register(&request)?;
        let session = self.persist(response)?;
        info!(
            "event=auth_register module=auth status=ok role={}",
            session.user.role
        );
        Ok(session)
    }

    /// Ends the session. Idempotent when nobody is logged in.
    pub fn logout(&self) -> Result<(), AuthError> {
        if let Some(session) = self.sessions.current_session()? {
            if let Err(err) = self.remote.logout(&session.token) {
                warn!("event=auth_logout module=auth status=remote_error error={err}");
            }
        }
        self.sessions.clear_session(true)?;
        info!("event=auth_logout module=auth status=ok");
        Ok(())
    }

    pub fn current_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.sessions.current_session()?)
    }

    pub fn require_session(&self) -> Result<Session, AuthError> {
        self.current_session()?.ok_or(AuthError::NotLoggedIn)
    }

    fn persist(&self, response: AuthResponse) -> Result<Session, AuthError> {
        if response.token.trim().is_empty() {
            return Err(RemoteError::Decode("auth response carries an empty token".to_string()).into());
        }
        let session = Session {
            user: response.user,
            token: response.token,
            created_at: self.clock.now_ms(),
        };
        self.sessions.save_session(&session)?;
        Ok(session)
    }
}
