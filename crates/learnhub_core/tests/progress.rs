mod common;

use common::{content, seeded_remote, subtopic, SUBJECT_ID, SUBTOPIC_A, SUBTOPIC_B, TOPIC_ID};
use learnhub_core::model::curriculum::{ContentStatus, HierarchyNode};
use learnhub_core::model::engagement::AchievementKind;
use learnhub_core::model::progress::{ProgressKind, ProgressTarget};
use learnhub_core::repo::bookmark_repo::{AchievementRepository, SqliteEngagementRepository};
use learnhub_core::repo::progress_repo::SqliteProgressRepository;
use learnhub_core::{
    open_db_in_memory, CachedContentRepository, InMemoryRemote, ManualClock, ProgressError,
    ProgressService,
};
use rusqlite::Connection;
use std::time::Duration;

const USER: &str = "learner-1";

type Service<'conn> = ProgressService<
    SqliteProgressRepository<'conn>,
    CachedContentRepository<'conn, InMemoryRemote>,
    SqliteEngagementRepository<'conn>,
>;

fn service(conn: &Connection) -> Service<'_> {
    service_with(conn, seeded_remote())
}

fn service_with(conn: &Connection, remote: InMemoryRemote) -> Service<'_> {
    ProgressService::new(
        SqliteProgressRepository::try_new(conn).unwrap(),
        CachedContentRepository::try_new(conn, remote, Duration::from_secs(3600)).unwrap(),
        SqliteEngagementRepository::try_new(conn).unwrap(),
    )
    .with_clock(ManualClock::new(5_000))
}

#[test]
fn completing_every_item_rolls_up_to_subtopic_and_topic() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let before = service.topic_progress(USER, TOPIC_ID).unwrap();
    assert_eq!(before.summary.total, 3);
    assert_eq!(before.summary.completed, 0);

    let first = service.mark_content_completed(USER, "intro-1").unwrap();
    assert!(first.newly_completed);
    assert_eq!(first.completed_subtopic, None);
    assert_eq!(first.achievements.len(), 1);
    assert_eq!(first.achievements[0].kind, AchievementKind::FirstLesson);

    let second = service.mark_content_completed(USER, "intro-2").unwrap();
    assert_eq!(second.completed_subtopic.as_deref(), Some(SUBTOPIC_A));
    assert_eq!(second.completed_topic, None);
    assert!(second.achievements.is_empty());

    let last = service.mark_content_completed(USER, "add-1").unwrap();
    assert_eq!(last.completed_subtopic.as_deref(), Some(SUBTOPIC_B));
    assert_eq!(last.completed_topic.as_deref(), Some(TOPIC_ID));
    assert_eq!(last.achievements.len(), 1);
    assert_eq!(last.achievements[0].kind, AchievementKind::TopicMaster);

    assert!(service
        .is_completed(USER, &ProgressTarget::topic(TOPIC_ID))
        .unwrap());
    let after = service.topic_progress(USER, TOPIC_ID).unwrap();
    assert_eq!(after.summary.completed, 3);
    assert!((after.percent - 100.0).abs() < f64::EPSILON);
}

#[test]
fn marking_twice_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service.topic_progress(USER, TOPIC_ID).unwrap();

    service.mark_content_completed(USER, "intro-1").unwrap();
    let again = service.mark_content_completed(USER, "intro-1").unwrap();
    assert!(!again.newly_completed);
    assert!(again.achievements.is_empty());

    let history = service.history(USER).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].target.kind, ProgressKind::Content);
    assert_eq!(history[0].completed_at, 5_000);
}

#[test]
fn topic_progress_breaks_down_by_subtopic() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service.topic_progress(USER, TOPIC_ID).unwrap();
    service.mark_content_completed(USER, "intro-1").unwrap();

    let progress = service.topic_progress(USER, TOPIC_ID).unwrap();
    assert_eq!(progress.subtopics.len(), 2);
    assert_eq!(progress.subtopics[0].subtopic_id, SUBTOPIC_A);
    assert_eq!(progress.subtopics[0].summary.completed, 1);
    assert_eq!(progress.subtopics[0].summary.total, 2);
    assert_eq!(progress.subtopics[1].summary.completed, 0);
    assert!((progress.percent - 100.0 / 3.0).abs() < 1e-9);

    let subject = service.subject_progress(USER, SUBJECT_ID).unwrap();
    assert_eq!(subject.completed, 1);
    assert_eq!(subject.total, 3);
}

#[test]
fn unknown_content_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    match service.mark_content_completed(USER, "never-fetched") {
        Err(ProgressError::NotFound { entity, id }) => {
            assert_eq!(entity, "content");
            assert_eq!(id, "never-fetched");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(matches!(
        service.mark_content_completed(" ", "intro-1"),
        Err(ProgressError::Validation(_))
    ));
}

#[test]
fn reset_clears_markers_but_keeps_achievements() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service.topic_progress(USER, TOPIC_ID).unwrap();
    service.mark_content_completed(USER, "intro-1").unwrap();
    service.mark_content_completed(USER, "intro-2").unwrap();

    assert_eq!(service.reset_progress(USER).unwrap(), 3);
    assert_eq!(
        service
            .topic_progress(USER, TOPIC_ID)
            .unwrap()
            .summary
            .completed,
        0
    );

    let achievements = SqliteEngagementRepository::try_new(&conn)
        .unwrap()
        .list_achievements(USER)
        .unwrap();
    assert_eq!(achievements.len(), 1);

    let again = service.mark_content_completed(USER, "intro-1").unwrap();
    assert!(again.newly_completed);
    assert!(again.achievements.is_empty());
}

#[test]
fn subtopic_without_published_content_does_not_block_topic() {
    let conn = open_db_in_memory().unwrap();
    let remote = seeded_remote();
    remote.seed(HierarchyNode::Subtopic(subtopic("fractions-review", TOPIC_ID, 3)));
    remote.seed(HierarchyNode::Content(content(
        "review-draft",
        "fractions-review",
        ContentStatus::Draft,
        1,
    )));
    let service = service_with(&conn, remote);

    let before = service.topic_progress(USER, TOPIC_ID).unwrap();
    assert_eq!(before.subtopics.len(), 3);
    assert_eq!(before.subtopics[2].summary.total, 0);

    for id in ["intro-1", "intro-2"] {
        service.mark_content_completed(USER, id).unwrap();
    }
    let last = service.mark_content_completed(USER, "add-1").unwrap();
    assert_eq!(last.completed_topic.as_deref(), Some(TOPIC_ID));
    assert!(last
        .achievements
        .iter()
        .any(|achievement| achievement.kind == AchievementKind::TopicMaster));

    let after = service.topic_progress(USER, TOPIC_ID).unwrap();
    assert!((after.percent - 100.0).abs() < f64::EPSILON);
}

#[test]
fn draft_content_cannot_be_completed() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service.topic_progress(USER, TOPIC_ID).unwrap();

    assert!(matches!(
        service.mark_content_completed(USER, "intro-draft"),
        Err(ProgressError::NotFound { entity: "content", .. })
    ));
    assert!(service.history(USER).unwrap().is_empty());
    let achievements = SqliteEngagementRepository::try_new(&conn)
        .unwrap()
        .list_achievements(USER)
        .unwrap();
    assert!(achievements.is_empty());
}
