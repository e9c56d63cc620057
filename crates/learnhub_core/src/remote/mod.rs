//! Remote backend contracts and clients.
//!
//! # Responsibility
//! - Define the content hierarchy and auth operations served by the backend.
//! - Map transport/HTTP failures into one [`RemoteError`] shape.
//!
//! # Invariants
//! - Remote calls never touch local storage.
//! - Every failure carries a human-readable message suitable for UI display.

pub mod http;
pub mod memory;

use crate::model::curriculum::{
    ClassLevel, Content, HierarchyLevel, HierarchyNode, Subject, Subtopic, Topic,
};
use crate::model::user::{User, UserRole};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use http::HttpApiClient;
pub use memory::InMemoryRemote;

pub type RemoteResult<T> = Result<T, RemoteError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Connection could not be established or was dropped.
    Network(String),
    /// Request exceeded the configured timeout.
    Timeout,
    /// Backend answered with a non-success status.
    Status { status: u16, message: String },
    /// Response body could not be decoded into the expected shape.
    Decode(String),
}

impl RemoteError {
    /// Whether the backend rejected the caller's credentials or token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }

    /// Whether the backend reports the requested record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(message) => write!(f, "network error: {message}"),
            Self::Timeout => write!(f, "request timed out"),
            Self::Status { status, message } => write!(f, "server error {status}: {message}"),
            Self::Decode(message) => write!(f, "unexpected server response: {message}"),
        }
    }
}

impl Error for RemoteError {}

/// Credentials for `auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload for `auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub class_id: Option<String>,
}

/// Successful auth response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Authentication endpoints.
pub trait AuthRemote {
    fn login(&self, request: &LoginRequest) -> RemoteResult<AuthResponse>;
    fn register(&self, request: &RegisterRequest) -> RemoteResult<AuthResponse>;
    fn logout(&self, token: &str) -> RemoteResult<()>;
}

/// Curriculum hierarchy endpoints.
pub trait ContentRemote {
    fn fetch_classes(&self) -> RemoteResult<Vec<ClassLevel>>;
    fn fetch_subjects(&self, class_id: &str) -> RemoteResult<Vec<Subject>>;
    fn fetch_topics(&self, subject_id: &str) -> RemoteResult<Vec<Topic>>;
    fn fetch_subtopics(&self, topic_id: &str) -> RemoteResult<Vec<Subtopic>>;
    fn fetch_contents(&self, subtopic_id: &str) -> RemoteResult<Vec<Content>>;

    /// Creates a node; returns the record as stored by the backend.
    fn create_node(&self, node: &HierarchyNode) -> RemoteResult<HierarchyNode>;
    /// Replaces a node by id; returns the record as stored by the backend.
    fn update_node(&self, node: &HierarchyNode) -> RemoteResult<HierarchyNode>;
    fn delete_node(&self, level: HierarchyLevel, id: &str) -> RemoteResult<()>;
}
