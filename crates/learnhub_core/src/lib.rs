//! Core of the LearnHub Kenya learning app.
//! Owns curriculum caching, learner state and teacher tooling; UI layers call
//! in through the services re-exported here.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod remote;
pub mod repo;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::ValidationError;
pub use remote::{HttpApiClient, InMemoryRemote, RemoteError};
pub use repo::cache_repo::{
    CacheOrigin, CacheScope, Cached, CachedContentRepository, ContentRepository, FetchPolicy,
};
pub use repo::{RepoError, RepoResult};
pub use service::auth_service::{AuthError, AuthService};
pub use service::content_service::{ContentError, ContentService};
pub use service::engagement_service::EngagementService;
pub use service::progress_service::{ProgressError, ProgressService};
pub use service::quiz_service::{QuizError, QuizService};
pub use service::teacher_service::{TeacherError, TeacherService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
