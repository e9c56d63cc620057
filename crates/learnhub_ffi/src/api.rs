//! FFI use-case API for the Flutter app.
//!
//! # Responsibility
//! - Expose use-case level functions to Dart via FRB.
//! - Translate every core result into an `ApiResponse` envelope.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - Each call opens its own SQLite connection under the configured data dir.
//! - Calls that may reach the network are non-`sync` so FRB runs them on its
//!   worker pool.
//! - Learner and teacher operations act on behalf of the persisted session.

use learnhub_core::model::curriculum::{HierarchyLevel, HierarchyNode};
use learnhub_core::model::quiz::{Difficulty, QuizAnswer};
use learnhub_core::model::teacher::ExamRequest;
use learnhub_core::model::user::{Session, UserRole};
use learnhub_core::remote::RegisterRequest;
use learnhub_core::repo::bookmark_repo::SqliteEngagementRepository;
use learnhub_core::repo::progress_repo::SqliteProgressRepository;
use learnhub_core::repo::quiz_repo::SqliteQuizRepository;
use learnhub_core::repo::session_repo::{SessionRepository, SqliteSessionRepository};
use learnhub_core::repo::teacher_repo::{QuestionQuery, SqliteTeacherRepository};
use learnhub_core::service::quiz_service::QuizRequest;
use learnhub_core::service::teacher_service::{LessonPlanDraft, QuestionDraft};
use learnhub_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_db,
    ping as ping_inner, AuthError, AuthService, CachedContentRepository, ContentService,
    CoreConfig, EngagementService, FetchPolicy, HttpApiClient, ProgressService, QuizService,
    TeacherService,
};
use log::{info, warn};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

const DATA_DIR_ENV: &str = "LEARNHUB_DATA_DIR";
const DEFAULT_DATA_DIR_NAME: &str = "learnhub";

static SETTINGS: RwLock<Option<BridgeSettings>> = RwLock::new(None);

#[derive(Debug, Clone)]
struct BridgeSettings {
    data_dir: PathBuf,
    config: CoreConfig,
}

impl BridgeSettings {
    fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.config.db_file_name)
    }
}

/// Uniform result envelope for every data-bearing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
    /// JSON payload on success; `None` on failure or for empty results.
    pub data_json: Option<String>,
}

impl ApiResponse {
    fn success(message: impl Into<String>, data: &impl Serialize) -> Self {
        match serde_json::to_string(data) {
            Ok(json) => Self {
                ok: true,
                message: message.into(),
                data_json: Some(json),
            },
            Err(err) => Self::failure(format!("response encoding failed: {err}")),
        }
    }

    fn done(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            data_json: None,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            data_json: None,
        }
    }
}

/// Health check.
///
/// # FFI contract
/// - Sync call, non-blocking.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
///
/// # FFI contract
/// - Sync call, non-blocking.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Sync call; may create the log directory.
/// - Idempotent for the same `level + log_dir`; conflicting calls fail.
/// - Returns an empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Sets the data directory and optional JSON config for later calls.
///
/// `config_json` uses `CoreConfig` field names; missing fields take defaults.
/// May be called again to switch settings.
#[flutter_rust_bridge::frb(sync)]
pub fn configure(data_dir: String, config_json: Option<String>) -> ApiResponse {
    let data_dir = data_dir.trim();
    if data_dir.is_empty() || !Path::new(data_dir).is_absolute() {
        return ApiResponse::failure(format!(
            "configure failed: data_dir must be an absolute path, got `{data_dir}`"
        ));
    }
    let config = match config_json.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => match CoreConfig::from_json_str(raw) {
            Ok(config) => config,
            Err(err) => return ApiResponse::failure(format!("configure failed: {err}")),
        },
        _ => CoreConfig::default(),
    };
    if let Err(err) = std::fs::create_dir_all(data_dir) {
        return ApiResponse::failure(format!("configure failed: {err}"));
    }

    let settings = BridgeSettings {
        data_dir: PathBuf::from(data_dir),
        config,
    };
    match SETTINGS.write() {
        Ok(mut guard) => *guard = Some(settings.clone()),
        Err(poisoned) => *poisoned.into_inner() = Some(settings.clone()),
    }
    info!("event=ffi_configure module=ffi status=ok");
    ApiResponse::success("Configured.", &settings.config)
}

/// Logs in against the remote API and stores the session.
pub fn auth_login(email: String, password: String) -> ApiResponse {
    respond("auth_login", "Logged in.", || {
        with_db(|conn, config| {
            let service = auth_service(conn, config)?;
            service.login(&email, &password).map_err(to_message)
        })
    })
}

/// Registers an account; `role` is `student|teacher|admin`.
pub fn auth_register(
    name: String,
    email: String,
    password: String,
    role: String,
    school: Option<String>,
    class_id: Option<String>,
) -> ApiResponse {
    respond("auth_register", "Registered.", || {
        let role = UserRole::parse(role.trim())
            .ok_or_else(|| format!("unknown role `{}`", role.trim()))?;
        with_db(|conn, config| {
            let service = auth_service(conn, config)?;
            service
                .register(RegisterRequest {
                    name,
                    email,
                    password,
                    role,
                    school,
                    class_id,
                })
                .map_err(to_message)
        })
    })
}

/// Ends the session and clears cached curriculum. Progress is kept.
pub fn auth_logout() -> ApiResponse {
    respond_done("auth_logout", "Logged out.", || {
        with_db(|conn, config| auth_service(conn, config)?.logout().map_err(to_message))
    })
}

/// Current session or `null` data when logged out.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_current_session() -> ApiResponse {
    respond("auth_current_session", "Session loaded.", || {
        with_db(|conn, _| {
            SqliteSessionRepository::try_new(conn)
                .and_then(|repo| repo.current_session())
                .map_err(to_message)
        })
    })
}

/// Classes; `refresh` bypasses a fresh cache.
pub fn content_list_classes(refresh: bool) -> ApiResponse {
    with_content("content_list_classes", |service| {
        service.list_classes(policy(refresh)).map_err(to_message)
    })
}

pub fn content_list_subjects(class_id: String, refresh: bool) -> ApiResponse {
    with_content("content_list_subjects", |service| {
        service
            .list_subjects(&class_id, policy(refresh))
            .map_err(to_message)
    })
}

pub fn content_list_topics(subject_id: String, refresh: bool) -> ApiResponse {
    with_content("content_list_topics", |service| {
        service
            .list_topics(&subject_id, policy(refresh))
            .map_err(to_message)
    })
}

pub fn content_list_subtopics(topic_id: String, refresh: bool) -> ApiResponse {
    with_content("content_list_subtopics", |service| {
        service
            .list_subtopics(&topic_id, policy(refresh))
            .map_err(to_message)
    })
}

pub fn content_list_contents(subtopic_id: String, refresh: bool) -> ApiResponse {
    with_content("content_list_contents", |service| {
        service
            .list_contents(&subtopic_id, policy(refresh))
            .map_err(to_message)
    })
}

/// Cached content item by id; never reaches the network.
#[flutter_rust_bridge::frb(sync)]
pub fn content_detail(content_id: String) -> ApiResponse {
    with_content("content_detail", |service| {
        service.content_detail(&content_id).map_err(to_message)
    })
}

/// Creates a hierarchy node from `HierarchyNode` JSON. Teachers and admins only.
pub fn content_create(node_json: String) -> ApiResponse {
    with_content("content_create", |service| {
        let node: HierarchyNode = parse_json("node_json", &node_json)?;
        service.create_node(&node).map_err(to_message)
    })
}

pub fn content_update(node_json: String) -> ApiResponse {
    with_content("content_update", |service| {
        let node: HierarchyNode = parse_json("node_json", &node_json)?;
        service.update_node(&node).map_err(to_message)
    })
}

/// `level` is `class|subject|topic|subtopic|content`.
pub fn content_delete(level: String, id: String) -> ApiResponse {
    with_content("content_delete", |service| {
        let level = HierarchyLevel::parse(level.trim())
            .ok_or_else(|| format!("unknown level `{}`", level.trim()))?;
        service.delete_node(level, &id).map_err(to_message)?;
        Ok(serde_json::Value::Null)
    })
}

/// Marks content complete for the session user; returns the rollup outcome.
pub fn progress_mark_completed(content_id: String) -> ApiResponse {
    respond("progress_mark_completed", "Progress saved.", || {
        with_db(|conn, config| {
            let session = require_session(conn)?;
            let service = progress_service(conn, config, &session)?;
            service
                .mark_content_completed(&session.user.id, &content_id)
                .map_err(to_message)
        })
    })
}

pub fn progress_topic(topic_id: String) -> ApiResponse {
    respond("progress_topic", "Progress loaded.", || {
        with_db(|conn, config| {
            let session = require_session(conn)?;
            let service = progress_service(conn, config, &session)?;
            service
                .topic_progress(&session.user.id, &topic_id)
                .map_err(to_message)
        })
    })
}

pub fn progress_subject(subject_id: String) -> ApiResponse {
    respond("progress_subject", "Progress loaded.", || {
        with_db(|conn, config| {
            let session = require_session(conn)?;
            let service = progress_service(conn, config, &session)?;
            service
                .subject_progress(&session.user.id, &subject_id)
                .map_err(to_message)
        })
    })
}

/// Clears every completion marker of the session user.
#[flutter_rust_bridge::frb(sync)]
pub fn progress_reset() -> ApiResponse {
    respond("progress_reset", "Progress reset.", || {
        with_db(|conn, config| {
            let session = require_session(conn)?;
            let service = progress_service(conn, config, &session)?;
            service.reset_progress(&session.user.id).map_err(to_message)
        })
    })
}

/// Builds a quiz from `QuizRequest` JSON.
#[flutter_rust_bridge::frb(sync)]
pub fn quiz_build(request_json: String) -> ApiResponse {
    respond("quiz_build", "Quiz ready.", || {
        let request: QuizRequest = parse_json("request_json", &request_json)?;
        with_db(|conn, _| quiz_service(conn)?.build_quiz(&request).map_err(to_message))
    })
}

/// Grades `answers_json` (`[{question_id, answer}]`) for the session user.
#[flutter_rust_bridge::frb(sync)]
pub fn quiz_submit(quiz_id: String, answers_json: String) -> ApiResponse {
    respond("quiz_submit", "Quiz submitted.", || {
        let answers: Vec<QuizAnswer> = parse_json("answers_json", &answers_json)?;
        with_db(|conn, _| {
            let session = require_session(conn)?;
            quiz_service(conn)?
                .submit(&session.user.id, &quiz_id, &answers)
                .map_err(to_message)
        })
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn quiz_history() -> ApiResponse {
    respond("quiz_history", "History loaded.", || {
        with_db(|conn, _| {
            let session = require_session(conn)?;
            quiz_service(conn)?
                .history(&session.user.id)
                .map_err(to_message)
        })
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn bookmark_add(content_id: String, note: Option<String>) -> ApiResponse {
    with_engagement("bookmark_add", |service, session| {
        service
            .add_bookmark(&session.user.id, &content_id, note.as_deref())
            .map_err(to_message)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn bookmark_remove(content_id: String) -> ApiResponse {
    with_engagement("bookmark_remove", |service, session| {
        service
            .remove_bookmark(&session.user.id, &content_id)
            .map_err(to_message)?;
        Ok(serde_json::Value::Null)
    })
}

/// Returns `true` data when the content ends up bookmarked.
#[flutter_rust_bridge::frb(sync)]
pub fn bookmark_toggle(content_id: String) -> ApiResponse {
    with_engagement("bookmark_toggle", |service, session| {
        service
            .toggle_bookmark(&session.user.id, &content_id)
            .map_err(to_message)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn bookmark_list() -> ApiResponse {
    with_engagement("bookmark_list", |service, session| {
        service
            .list_bookmarks(&session.user.id)
            .map_err(to_message)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn achievements_list() -> ApiResponse {
    with_engagement("achievements_list", |service, session| {
        service.achievements(&session.user.id).map_err(to_message)
    })
}

/// Ranked learners; `limit` defaults to 20 and is capped at 100.
#[flutter_rust_bridge::frb(sync)]
pub fn leaderboard(limit: Option<u32>) -> ApiResponse {
    respond("leaderboard", "Leaderboard loaded.", || {
        with_db(|conn, _| {
            let service = engagement_service(conn)?;
            service.leaderboard(limit).map_err(to_message)
        })
    })
}

/// Creates a lesson plan from `LessonPlanDraft` JSON.
#[flutter_rust_bridge::frb(sync)]
pub fn lesson_plan_create(draft_json: String) -> ApiResponse {
    with_teacher("lesson_plan_create", |service, session| {
        let draft: LessonPlanDraft = parse_json("draft_json", &draft_json)?;
        service
            .create_lesson_plan(&session.user, draft)
            .map_err(to_message)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn lesson_plan_update(plan_id: String, draft_json: String) -> ApiResponse {
    with_teacher("lesson_plan_update", |service, session| {
        let draft: LessonPlanDraft = parse_json("draft_json", &draft_json)?;
        service
            .update_lesson_plan(&session.user, &plan_id, draft)
            .map_err(to_message)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn lesson_plan_get(plan_id: String) -> ApiResponse {
    with_teacher("lesson_plan_get", |service, session| {
        service
            .get_lesson_plan(&session.user, &plan_id)
            .map_err(to_message)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn lesson_plan_list() -> ApiResponse {
    with_teacher("lesson_plan_list", |service, session| {
        service.list_lesson_plans(&session.user).map_err(to_message)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn lesson_plan_delete(plan_id: String) -> ApiResponse {
    with_teacher("lesson_plan_delete", |service, session| {
        service
            .delete_lesson_plan(&session.user, &plan_id)
            .map_err(to_message)?;
        Ok(serde_json::Value::Null)
    })
}

/// Adds a question bank entry from `QuestionDraft` JSON.
#[flutter_rust_bridge::frb(sync)]
pub fn question_add(draft_json: String) -> ApiResponse {
    with_teacher("question_add", |service, session| {
        let draft: QuestionDraft = parse_json("draft_json", &draft_json)?;
        service.add_question(&session.user, draft).map_err(to_message)
    })
}

/// Lists bank questions; `difficulty` is `easy|medium|hard`.
#[flutter_rust_bridge::frb(sync)]
pub fn question_list(
    subject_id: Option<String>,
    topic_id: Option<String>,
    difficulty: Option<String>,
) -> ApiResponse {
    with_teacher("question_list", |service, session| {
        let difficulty = match difficulty.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(
                Difficulty::parse(raw).ok_or_else(|| format!("unknown difficulty `{raw}`"))?,
            ),
            _ => None,
        };
        let query = QuestionQuery {
            subject_id,
            topic_ids: topic_id.into_iter().collect(),
            difficulty,
            limit: None,
        };
        service
            .list_questions(&session.user, &query)
            .map_err(to_message)
    })
}

/// Generates and stores an exam paper from `ExamRequest` JSON.
#[flutter_rust_bridge::frb(sync)]
pub fn exam_generate(request_json: String) -> ApiResponse {
    with_teacher("exam_generate", |service, session| {
        let request: ExamRequest = parse_json("request_json", &request_json)?;
        service
            .generate_exam(&session.user, &request)
            .map_err(to_message)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn exam_list() -> ApiResponse {
    with_teacher("exam_list", |service, session| {
        service.list_exams(&session.user).map_err(to_message)
    })
}

fn respond<T: Serialize>(
    op: &'static str,
    message: &'static str,
    call: impl FnOnce() -> Result<T, String>,
) -> ApiResponse {
    match call() {
        Ok(data) => ApiResponse::success(message, &data),
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error op={op}");
            ApiResponse::failure(format!("{op} failed: {err}"))
        }
    }
}

fn respond_done(
    op: &'static str,
    message: &'static str,
    call: impl FnOnce() -> Result<(), String>,
) -> ApiResponse {
    match call() {
        Ok(()) => ApiResponse::done(message),
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error op={op}");
            ApiResponse::failure(format!("{op} failed: {err}"))
        }
    }
}

fn current_settings() -> BridgeSettings {
    let configured = match SETTINGS.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    configured.unwrap_or_else(|| BridgeSettings {
        data_dir: default_data_dir(),
        config: CoreConfig::default(),
    })
}

fn default_data_dir() -> PathBuf {
    if let Ok(raw) = std::env::var(DATA_DIR_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(DEFAULT_DATA_DIR_NAME)
}

fn with_db<T>(
    f: impl FnOnce(&Connection, &CoreConfig) -> Result<T, String>,
) -> Result<T, String> {
    let settings = current_settings();
    std::fs::create_dir_all(&settings.data_dir)
        .map_err(|err| format!("data dir unavailable: {err}"))?;
    let conn = open_db(settings.db_path()).map_err(|err| format!("database open failed: {err}"))?;
    f(&conn, &settings.config)
}

fn require_session(conn: &Connection) -> Result<Session, String> {
    SqliteSessionRepository::try_new(conn)
        .and_then(|repo| repo.current_session())
        .map_err(to_message)?
        .ok_or_else(|| AuthError::NotLoggedIn.to_string())
}

fn optional_session(conn: &Connection) -> Result<Option<Session>, String> {
    SqliteSessionRepository::try_new(conn)
        .and_then(|repo| repo.current_session())
        .map_err(to_message)
}

fn auth_service<'conn>(
    conn: &'conn Connection,
    config: &CoreConfig,
) -> Result<AuthService<HttpApiClient, SqliteSessionRepository<'conn>>, String> {
    let remote = HttpApiClient::new(config).map_err(to_message)?;
    let sessions = SqliteSessionRepository::try_new(conn).map_err(to_message)?;
    Ok(AuthService::new(remote, sessions))
}

fn content_repo<'conn>(
    conn: &'conn Connection,
    config: &CoreConfig,
    session: Option<&Session>,
) -> Result<CachedContentRepository<'conn, HttpApiClient>, String> {
    let remote = HttpApiClient::new(config)
        .map_err(to_message)?
        .with_token(session.map(|session| session.token.clone()));
    CachedContentRepository::try_new(conn, remote, config.cache_ttl()).map_err(to_message)
}

fn with_content<T: Serialize>(
    op: &'static str,
    f: impl FnOnce(&ContentService<CachedContentRepository<'_, HttpApiClient>>) -> Result<T, String>,
) -> ApiResponse {
    respond(op, "Content loaded.", || {
        with_db(|conn, config| {
            let session = optional_session(conn)?;
            let repo = content_repo(conn, config, session.as_ref())?;
            let service = ContentService::new(repo)
                .with_viewer(session.as_ref().map(|session| session.user.role));
            f(&service)
        })
    })
}

fn progress_service<'conn>(
    conn: &'conn Connection,
    config: &CoreConfig,
    session: &Session,
) -> Result<
    ProgressService<
        SqliteProgressRepository<'conn>,
        CachedContentRepository<'conn, HttpApiClient>,
        SqliteEngagementRepository<'conn>,
    >,
    String,
> {
    Ok(ProgressService::new(
        SqliteProgressRepository::try_new(conn).map_err(to_message)?,
        content_repo(conn, config, Some(session))?,
        SqliteEngagementRepository::try_new(conn).map_err(to_message)?,
    ))
}

fn quiz_service(
    conn: &Connection,
) -> Result<
    QuizService<
        SqliteTeacherRepository<'_>,
        SqliteQuizRepository<'_>,
        SqliteEngagementRepository<'_>,
    >,
    String,
> {
    Ok(QuizService::new(
        SqliteTeacherRepository::try_new(conn).map_err(to_message)?,
        SqliteQuizRepository::try_new(conn).map_err(to_message)?,
        SqliteEngagementRepository::try_new(conn).map_err(to_message)?,
    ))
}

fn engagement_service(
    conn: &Connection,
) -> Result<
    EngagementService<
        SqliteEngagementRepository<'_>,
        SqliteEngagementRepository<'_>,
        SqliteQuizRepository<'_>,
    >,
    String,
> {
    let engagement = SqliteEngagementRepository::try_new(conn).map_err(to_message)?;
    let quizzes = SqliteQuizRepository::try_new(conn).map_err(to_message)?;
    Ok(EngagementService::new(engagement, engagement, quizzes))
}

type EngagementServiceRef<'a, 'conn> = &'a EngagementService<
    SqliteEngagementRepository<'conn>,
    SqliteEngagementRepository<'conn>,
    SqliteQuizRepository<'conn>,
>;

fn with_engagement<T: Serialize>(
    op: &'static str,
    f: impl FnOnce(EngagementServiceRef<'_, '_>, &Session) -> Result<T, String>,
) -> ApiResponse {
    respond(op, "Done.", || {
        with_db(|conn, _| {
            let session = require_session(conn)?;
            let service = engagement_service(conn)?;
            f(&service, &session)
        })
    })
}

type TeacherServiceRef<'a, 'conn> = &'a TeacherService<
    SqliteTeacherRepository<'conn>,
    SqliteTeacherRepository<'conn>,
    SqliteTeacherRepository<'conn>,
>;

fn with_teacher<T: Serialize>(
    op: &'static str,
    f: impl FnOnce(TeacherServiceRef<'_, '_>, &Session) -> Result<T, String>,
) -> ApiResponse {
    respond(op, "Done.", || {
        with_db(|conn, _| {
            let session = require_session(conn)?;
            let repo = SqliteTeacherRepository::try_new(conn).map_err(to_message)?;
            let service = TeacherService::new(repo, repo, repo);
            f(&service, &session)
        })
    })
}

fn policy(refresh: bool) -> FetchPolicy {
    if refresh {
        FetchPolicy::Refresh
    } else {
        FetchPolicy::CacheFirst
    }
}

fn parse_json<T: DeserializeOwned>(field: &str, raw: &str) -> Result<T, String> {
    serde_json::from_str(raw).map_err(|err| format!("invalid {field}: {err}"))
}

fn to_message(err: impl std::fmt::Display) -> String {
    err.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use learnhub_core::model::user::User;
    use std::sync::OnceLock;

    static TEST_DIR: OnceLock<tempfile::TempDir> = OnceLock::new();

    fn configured() {
        let dir = TEST_DIR.get_or_init(|| tempfile::tempdir().expect("tempdir"));
        let response = configure(
            dir.path().to_string_lossy().to_string(),
            Some(r#"{"api_base_url":"http://127.0.0.1:9/v1","request_timeout_secs":1}"#.to_string()),
        );
        assert!(response.ok, "{}", response.message);
    }

    fn login_as(role: UserRole) -> Session {
        let session = Session {
            user: User {
                id: format!("{role}-1"),
                name: "Achieng".to_string(),
                email: "achieng@example.com".to_string(),
                role,
                school: None,
                class_id: None,
            },
            token: "tok-test".to_string(),
            created_at: 1,
        };
        with_db(|conn, _| {
            SqliteSessionRepository::try_new(conn)
                .and_then(|repo| repo.save_session(&session))
                .map_err(to_message)
        })
        .expect("save session");
        session
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "/tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn configure_rejects_relative_dir_and_bad_config() {
        assert!(!configure("data".to_string(), None).ok);
        let response = configure(
            std::env::temp_dir().to_string_lossy().to_string(),
            Some(r#"{"cache_ttl_secs":0}"#.to_string()),
        );
        assert!(!response.ok);
        assert!(response.message.contains("cache_ttl_secs"));
    }

    #[test]
    fn session_scoped_flows_share_one_database() {
        configured();

        let leaderboard_response = leaderboard(Some(500));
        assert!(leaderboard_response.ok, "{}", leaderboard_response.message);

        let teacher = login_as(UserRole::Teacher);
        let created = lesson_plan_create(
            r#"{"class_id":"grade-7","subject_id":"math","title":"Fractions","duration_minutes":40}"#
                .to_string(),
        );
        assert!(created.ok, "{}", created.message);
        let data = created.data_json.expect("plan json");
        assert!(data.contains(&teacher.user.id));

        let listed = lesson_plan_list();
        assert!(listed.ok, "{}", listed.message);
        assert!(listed.data_json.expect("list json").contains("Fractions"));

        let bad = lesson_plan_create("{not json".to_string());
        assert!(!bad.ok);
        assert!(bad.message.starts_with("lesson_plan_create failed: invalid draft_json"));

        let toggled = bookmark_toggle("content-1".to_string());
        assert!(toggled.ok, "{}", toggled.message);
        assert_eq!(toggled.data_json.as_deref(), Some("true"));
        let toggled = bookmark_toggle("content-1".to_string());
        assert_eq!(toggled.data_json.as_deref(), Some("false"));

        login_as(UserRole::Student);
        let forbidden = exam_list();
        assert!(!forbidden.ok);
        assert!(forbidden.message.contains("only teachers and admins"));

        let unknown = content_delete("chapter".to_string(), "x".to_string());
        assert!(!unknown.ok);
        assert!(unknown.message.contains("unknown level"));
    }
}
