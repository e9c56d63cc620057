mod common;

use common::{question, user, SUBJECT_ID, TOPIC_ID};
use learnhub_core::model::quiz::{Difficulty, QuestionKind};
use learnhub_core::model::teacher::ExamRequest;
use learnhub_core::model::user::{User, UserRole};
use learnhub_core::model::ValidationError;
use learnhub_core::repo::teacher_repo::{
    QuestionBankRepository, QuestionQuery, SqliteTeacherRepository,
};
use learnhub_core::service::teacher_service::{LessonPlanDraft, QuestionDraft};
use learnhub_core::{open_db_in_memory, ManualClock, TeacherError, TeacherService};
use rusqlite::Connection;

type Service<'conn> = TeacherService<
    SqliteTeacherRepository<'conn>,
    SqliteTeacherRepository<'conn>,
    SqliteTeacherRepository<'conn>,
>;

fn service<'conn>(conn: &'conn Connection, clock: &ManualClock) -> Service<'conn> {
    let repo = SqliteTeacherRepository::try_new(conn).unwrap();
    TeacherService::new(repo, repo, repo).with_clock(clock.clone())
}

fn teacher(id: &str) -> User {
    user(id, UserRole::Teacher)
}

fn draft(title: &str) -> LessonPlanDraft {
    LessonPlanDraft {
        class_id: "grade-7".to_string(),
        subject_id: SUBJECT_ID.to_string(),
        topic_id: Some(TOPIC_ID.to_string()),
        title: title.to_string(),
        objectives: vec!["Compare fractions".to_string(), " ".to_string()],
        activities: vec!["Group work".to_string()],
        resources: vec!["Fraction strips".to_string()],
        duration_minutes: 40,
        scheduled_on: Some("2026-03-02".to_string()),
    }
}

fn seed_bank(conn: &Connection) {
    let bank = SqliteTeacherRepository::try_new(conn).unwrap();
    let layout = [
        ("e", Difficulty::Easy, 4, 1),
        ("m", Difficulty::Medium, 3, 2),
        ("h", Difficulty::Hard, 2, 3),
    ];
    for (prefix, difficulty, count, marks) in layout {
        for index in 0..count {
            bank.create_question(&question(
                &format!("{prefix}{index}"),
                TOPIC_ID,
                difficulty,
                marks,
            ))
            .unwrap();
        }
    }
    bank.create_question(&question("e-decimals", "decimals", Difficulty::Easy, 1))
        .unwrap();
}

fn exam_request(counts: Vec<(Difficulty, u32)>, seed: u64) -> ExamRequest {
    ExamRequest {
        title: "End of term".to_string(),
        subject_id: SUBJECT_ID.to_string(),
        topic_ids: vec![TOPIC_ID.to_string()],
        counts,
        duration_minutes: 60,
        seed,
    }
}

#[test]
fn lesson_plan_lifecycle() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new(1_000);
    let service = service(&conn, &clock);
    let owner = teacher("mwangi");

    let created = service
        .create_lesson_plan(&owner, draft(" Fractions intro "))
        .unwrap();
    assert_eq!(created.teacher_id, "mwangi");
    assert_eq!(created.title, "Fractions intro");
    assert_eq!(created.objectives, vec!["Compare fractions".to_string()]);
    assert_eq!(service.get_lesson_plan(&owner, &created.id).unwrap(), created);

    clock.advance_ms(500);
    let updated = service
        .update_lesson_plan(&owner, &created.id, draft("Fractions part 1"))
        .unwrap();
    assert_eq!(updated.created_at, 1_000);
    assert_eq!(updated.updated_at, 1_500);

    clock.advance_ms(500);
    let newer = service.create_lesson_plan(&owner, draft("Decimals")).unwrap();
    let titles: Vec<String> = service
        .list_lesson_plans(&owner)
        .unwrap()
        .into_iter()
        .map(|plan| plan.title)
        .collect();
    assert_eq!(titles, vec!["Decimals", "Fractions part 1"]);

    service.delete_lesson_plan(&owner, &newer.id).unwrap();
    assert!(matches!(
        service.get_lesson_plan(&owner, &newer.id),
        Err(TeacherError::NotFound { .. })
    ));
}

#[test]
fn lesson_plans_are_guarded_by_role_and_ownership() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, &ManualClock::new(0));
    let owner = teacher("mwangi");
    let plan = service.create_lesson_plan(&owner, draft("Fractions")).unwrap();

    let student = user("pupil", UserRole::Student);
    assert!(matches!(
        service.create_lesson_plan(&student, draft("Nope")),
        Err(TeacherError::Forbidden)
    ));
    assert!(matches!(
        service.update_lesson_plan(&teacher("otieno"), &plan.id, draft("Taken over")),
        Err(TeacherError::Forbidden)
    ));

    let admin = user("head", UserRole::Admin);
    let edited = service
        .update_lesson_plan(&admin, &plan.id, draft("Reviewed"))
        .unwrap();
    assert_eq!(edited.teacher_id, "mwangi");
    assert!(service.list_lesson_plans(&teacher("otieno")).unwrap().is_empty());
}

#[test]
fn lesson_plan_drafts_are_validated() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, &ManualClock::new(0));
    let owner = teacher("mwangi");

    let mut zero = draft("Fractions");
    zero.duration_minutes = 0;
    assert!(matches!(
        service.create_lesson_plan(&owner, zero),
        Err(TeacherError::Validation(ValidationError::OutOfRange { .. }))
    ));
    assert!(matches!(
        service.create_lesson_plan(&owner, draft("  ")),
        Err(TeacherError::Validation(ValidationError::BlankField(_)))
    ));
    let mut bad_date = draft("Fractions");
    bad_date.scheduled_on = Some("02/03/2026".to_string());
    assert!(matches!(
        service.create_lesson_plan(&owner, bad_date),
        Err(TeacherError::Validation(ValidationError::InvalidDate(_)))
    ));
}

#[test]
fn question_bank_crud_with_filters() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, &ManualClock::new(0));
    let author = teacher("mwangi");

    let added = service
        .add_question(
            &author,
            QuestionDraft {
                subject_id: SUBJECT_ID.to_string(),
                topic_id: Some(TOPIC_ID.to_string()),
                text: " Is 1/2 larger than 1/3? ".to_string(),
                kind: QuestionKind::TrueFalse,
                options: vec!["True".to_string(), "False".to_string()],
                correct_answer: "True".to_string(),
                explanation: Some("  ".to_string()),
                difficulty: Difficulty::Easy,
                marks: 1,
            },
        )
        .unwrap();
    assert_eq!(added.text, "Is 1/2 larger than 1/3?");
    assert_eq!(added.explanation, None);

    let invalid = QuestionDraft {
        subject_id: SUBJECT_ID.to_string(),
        topic_id: None,
        text: "Pick one".to_string(),
        kind: QuestionKind::MultipleChoice,
        options: vec!["A".to_string(), "B".to_string()],
        correct_answer: "C".to_string(),
        explanation: None,
        difficulty: Difficulty::Medium,
        marks: 2,
    };
    assert!(matches!(
        service.add_question(&author, invalid.clone()),
        Err(TeacherError::Validation(ValidationError::AnswerNotInOptions(_)))
    ));

    let mut fixed = invalid;
    fixed.correct_answer = "B".to_string();
    service.add_question(&author, fixed.clone()).unwrap();
    fixed.marks = 5;
    let updated = service
        .update_question(&author, &added.id, fixed)
        .unwrap();
    assert_eq!(updated.marks, 5);

    let medium = service
        .list_questions(
            &author,
            &QuestionQuery {
                difficulty: Some(Difficulty::Medium),
                ..QuestionQuery::default()
            },
        )
        .unwrap();
    assert_eq!(medium.len(), 2);

    service.delete_question(&author, &added.id).unwrap();
    assert!(matches!(
        service.delete_question(&author, &added.id),
        Err(TeacherError::NotFound { .. })
    ));
    assert!(matches!(
        service.list_questions(&user("pupil", UserRole::Student), &QuestionQuery::default()),
        Err(TeacherError::Forbidden)
    ));
}

#[test]
fn generate_exam_fills_each_bucket_deterministically() {
    let conn = open_db_in_memory().unwrap();
    seed_bank(&conn);
    let service = service(&conn, &ManualClock::new(9_000));
    let author = teacher("mwangi");
    let counts = vec![
        (Difficulty::Hard, 1),
        (Difficulty::Easy, 2),
        (Difficulty::Medium, 2),
        (Difficulty::Easy, 1),
    ];

    let paper = service
        .generate_exam(&author, &exam_request(counts.clone(), 42))
        .unwrap();
    let difficulties: Vec<Difficulty> = paper
        .questions
        .iter()
        .map(|question| question.difficulty)
        .collect();
    assert_eq!(
        difficulties,
        vec![
            Difficulty::Easy,
            Difficulty::Easy,
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Medium,
            Difficulty::Hard,
        ]
    );
    assert_eq!(paper.total_marks, 3 + 4 + 3);
    assert!(paper.questions.iter().all(|q| q.id != "e-decimals"));
    assert_eq!(paper.created_at, 9_000);

    let again = service
        .generate_exam(&author, &exam_request(counts, 42))
        .unwrap();
    let ids = |questions: &[learnhub_core::model::quiz::Question]| -> Vec<String> {
        questions.iter().map(|q| q.id.clone()).collect()
    };
    assert_eq!(ids(&again.questions), ids(&paper.questions));
    assert_ne!(again.id, paper.id);

    assert_eq!(service.list_exams(&author).unwrap().len(), 2);
    assert_eq!(service.get_exam(&author, &paper.id).unwrap(), paper);
    assert!(matches!(
        service.get_exam(&teacher("otieno"), &paper.id),
        Err(TeacherError::Forbidden)
    ));
}

#[test]
fn generate_exam_reports_the_short_bucket() {
    let conn = open_db_in_memory().unwrap();
    seed_bank(&conn);
    let service = service(&conn, &ManualClock::new(0));
    let author = teacher("mwangi");

    match service.generate_exam(
        &author,
        &exam_request(vec![(Difficulty::Easy, 1), (Difficulty::Hard, 3)], 1),
    ) {
        Err(TeacherError::InsufficientQuestions {
            difficulty,
            requested,
            available,
        }) => {
            assert_eq!(difficulty, Difficulty::Hard);
            assert_eq!(requested, 3);
            assert_eq!(available, 2);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(service.list_exams(&author).unwrap().is_empty());

    let mut whole_subject = exam_request(vec![(Difficulty::Easy, 5)], 1);
    whole_subject.topic_ids.clear();
    let paper = service.generate_exam(&author, &whole_subject).unwrap();
    assert_eq!(paper.questions.len(), 5);

    assert!(matches!(
        service.generate_exam(&author, &exam_request(vec![(Difficulty::Easy, 0)], 1)),
        Err(TeacherError::Validation(_))
    ));
}

#[test]
fn generate_exam_rejects_counts_beyond_u32() {
    let conn = open_db_in_memory().unwrap();
    seed_bank(&conn);
    let service = service(&conn, &ManualClock::new(0));
    let author = teacher("mwangi");

    match service.generate_exam(
        &author,
        &exam_request(vec![(Difficulty::Easy, u32::MAX), (Difficulty::Easy, 2)], 7),
    ) {
        Err(TeacherError::Validation(ValidationError::OutOfRange { field, value })) => {
            assert_eq!(field, "exam.counts");
            assert_eq!(value, i64::from(u32::MAX) + 2);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(service.list_exams(&author).unwrap().is_empty());
}
