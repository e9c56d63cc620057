mod common;

use common::{seeded_remote, user, SUBTOPIC_A};
use learnhub_core::model::progress::ProgressTarget;
use learnhub_core::model::user::UserRole;
use learnhub_core::model::ValidationError;
use learnhub_core::remote::RegisterRequest;
use learnhub_core::repo::progress_repo::{ProgressRepository, SqliteProgressRepository};
use learnhub_core::repo::session_repo::SqliteSessionRepository;
use learnhub_core::{
    open_db_in_memory, AuthError, AuthService, CachedContentRepository, ContentRepository,
    FetchPolicy, InMemoryRemote, ManualClock,
};
use std::time::Duration;

fn register_request(email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        name: "  Kamau Njoroge ".to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role: UserRole::Student,
        school: None,
        class_id: Some("grade-7".to_string()),
    }
}

#[test]
fn login_persists_session_and_logout_clears_it() {
    let conn = open_db_in_memory().unwrap();
    let remote = InMemoryRemote::new();
    remote.seed_account(user("amina", UserRole::Teacher), "secret-pass");
    let service = AuthService::new(remote.clone(), SqliteSessionRepository::try_new(&conn).unwrap())
        .with_clock(ManualClock::new(42));

    let session = service
        .login(" AMINA@example.co.ke ", "secret-pass")
        .unwrap();
    assert_eq!(session.user.id, "amina");
    assert_eq!(session.created_at, 42);
    assert!(remote.is_token_active(&session.token));
    assert_eq!(service.current_session().unwrap(), Some(session.clone()));

    service.logout().unwrap();
    assert!(!remote.is_token_active(&session.token));
    assert_eq!(service.current_session().unwrap(), None);
    assert!(matches!(
        service.require_session(),
        Err(AuthError::NotLoggedIn)
    ));
}

#[test]
fn login_validates_locally_before_calling_remote() {
    let conn = open_db_in_memory().unwrap();
    let remote = InMemoryRemote::new();
    remote.set_offline(true);
    let service = AuthService::new(remote, SqliteSessionRepository::try_new(&conn).unwrap());

    assert!(matches!(
        service.login("   ", "pw"),
        Err(AuthError::Validation(ValidationError::BlankField("email")))
    ));
    assert!(matches!(
        service.login("not-an-email", "pw"),
        Err(AuthError::Validation(ValidationError::InvalidEmail(_)))
    ));
    assert!(matches!(
        service.login("amina@example.co.ke", ""),
        Err(AuthError::Validation(ValidationError::BlankField("password")))
    ));
    assert!(matches!(
        service.login("amina@example.co.ke", "   "),
        Err(AuthError::Validation(ValidationError::BlankField("password")))
    ));
    assert!(matches!(
        service.login("amina@example.co.ke", "pw"),
        Err(AuthError::Remote(_))
    ));
}

#[test]
fn wrong_password_maps_to_invalid_credentials() {
    let conn = open_db_in_memory().unwrap();
    let remote = InMemoryRemote::new();
    remote.seed_account(user("amina", UserRole::Student), "secret-pass");
    let service = AuthService::new(remote, SqliteSessionRepository::try_new(&conn).unwrap());

    match service.login("amina@example.co.ke", "wrong") {
        Err(AuthError::InvalidCredentials(message)) => {
            assert_eq!(message, "Invalid email or password");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(service.current_session().unwrap(), None);
}

#[test]
fn register_enforces_password_length_and_trims_name() {
    let conn = open_db_in_memory().unwrap();
    let remote = InMemoryRemote::new();
    let service = AuthService::new(remote, SqliteSessionRepository::try_new(&conn).unwrap());

    assert!(matches!(
        service.register(register_request("kamau@example.co.ke", "12345")),
        Err(AuthError::Validation(ValidationError::PasswordTooShort { min: 6 }))
    ));
    let mut blank_name = register_request("kamau@example.co.ke", "123456");
    blank_name.name = " ".to_string();
    assert!(matches!(
        service.register(blank_name),
        Err(AuthError::Validation(ValidationError::BlankField("name")))
    ));

    let session = service
        .register(register_request("kamau@example.co.ke", "123456"))
        .unwrap();
    assert_eq!(session.user.name, "Kamau Njoroge");
    assert_eq!(session.user.role, UserRole::Student);

    assert!(matches!(
        service.register(register_request("KAMAU@example.co.ke", "123456")),
        Err(AuthError::Remote(_))
    ));
}

#[test]
fn logout_survives_remote_failure_and_keeps_progress() {
    let conn = open_db_in_memory().unwrap();
    let remote = seeded_remote();
    remote.seed_account(user("amina", UserRole::Student), "secret-pass");
    let service = AuthService::new(remote.clone(), SqliteSessionRepository::try_new(&conn).unwrap());
    let session = service.login("amina@example.co.ke", "secret-pass").unwrap();

    let content = CachedContentRepository::try_new(&conn, remote.clone(), Duration::from_secs(60))
        .unwrap();
    content.contents(SUBTOPIC_A, FetchPolicy::CacheFirst).unwrap();
    let progress = SqliteProgressRepository::try_new(&conn).unwrap();
    progress
        .mark_completed(&session.user.id, &ProgressTarget::content("intro-1"), 1)
        .unwrap();

    remote.set_offline(true);
    service.logout().unwrap();

    assert_eq!(service.current_session().unwrap(), None);
    assert!(content.find_content("intro-1").unwrap().is_none());
    assert!(progress
        .is_completed(&session.user.id, &ProgressTarget::content("intro-1"))
        .unwrap());
}

#[test]
fn logout_without_session_is_a_no_op() {
    let conn = open_db_in_memory().unwrap();
    let service = AuthService::new(
        InMemoryRemote::new(),
        SqliteSessionRepository::try_new(&conn).unwrap(),
    );
    service.logout().unwrap();
    assert_eq!(service.current_session().unwrap(), None);
}
