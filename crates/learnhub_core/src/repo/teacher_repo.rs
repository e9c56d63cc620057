//! Teacher tooling persistence: question bank, lesson plans, exam papers.
//!
//! # Invariants
//! - Question and lesson plan writes call `validate()` before SQL mutations.
//! - Lists are deterministic: questions by `id`, plans by `updated_at DESC`.

use crate::model::quiz::{Difficulty, Question, QuestionKind};
use crate::model::teacher::{ExamPaper, LessonPlan};
use crate::repo::{
    ensure_connection_ready, from_json, parse_enum, to_json, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

/// Filters for question bank listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionQuery {
    pub subject_id: Option<String>,
    /// Any of these topics; empty means no topic filter.
    pub topic_ids: Vec<String>,
    pub difficulty: Option<Difficulty>,
    pub limit: Option<u32>,
}

pub trait QuestionBankRepository {
    fn create_question(&self, question: &Question) -> RepoResult<()>;
    fn update_question(&self, question: &Question) -> RepoResult<()>;
    fn delete_question(&self, question_id: &str) -> RepoResult<()>;
    fn get_question(&self, question_id: &str) -> RepoResult<Option<Question>>;
    fn list_questions(&self, query: &QuestionQuery) -> RepoResult<Vec<Question>>;
}

pub trait LessonPlanRepository {
    fn create_plan(&self, plan: &LessonPlan) -> RepoResult<()>;
    fn update_plan(&self, plan: &LessonPlan) -> RepoResult<()>;
    fn get_plan(&self, plan_id: &str) -> RepoResult<Option<LessonPlan>>;
    fn list_plans(&self, teacher_id: &str) -> RepoResult<Vec<LessonPlan>>;
    fn delete_plan(&self, plan_id: &str) -> RepoResult<()>;
}

pub trait ExamPaperRepository {
    fn save_exam(&self, exam: &ExamPaper) -> RepoResult<()>;
    fn get_exam(&self, exam_id: &str) -> RepoResult<Option<ExamPaper>>;
    /// Newest first.
    fn list_exams(&self, teacher_id: &str) -> RepoResult<Vec<ExamPaper>>;
}

const QUESTION_COLUMNS: &str =
    "id, subject_id, topic_id, text, kind, options_json, correct_answer, explanation, difficulty, marks";
const PLAN_COLUMNS: &str = "id, teacher_id, class_id, subject_id, topic_id, title, objectives_json, activities_json, resources_json, duration_minutes, scheduled_on, created_at, updated_at";
const EXAM_COLUMNS: &str =
    "id, teacher_id, subject_id, title, questions_json, total_marks, duration_minutes, created_at";

/// SQLite-backed repository for all teacher tooling tables.
#[derive(Clone, Copy)]
pub struct SqliteTeacherRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTeacherRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl QuestionBankRepository for SqliteTeacherRepository<'_> {
    fn create_question(&self, question: &Question) -> RepoResult<()> {
        question.validate()?;
        self.conn.execute(
            &format!(
                "INSERT INTO questions ({QUESTION_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);"
            ),
            params![
                question.id,
                question.subject_id,
                question.topic_id,
                question.text,
                question.kind.as_str(),
                to_json(&question.options)?,
                question.correct_answer,
                question.explanation,
                question.difficulty.as_str(),
                question.marks
            ],
        )?;
        Ok(())
    }

    fn update_question(&self, question: &Question) -> RepoResult<()> {
        question.validate()?;
        let changed = self.conn.execute(
            "UPDATE questions
             SET
                subject_id = ?2,
                topic_id = ?3,
                text = ?4,
                kind = ?5,
                options_json = ?6,
                correct_answer = ?7,
                explanation = ?8,
                difficulty = ?9,
                marks = ?10,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                question.id,
                question.subject_id,
                question.topic_id,
                question.text,
                question.kind.as_str(),
                to_json(&question.options)?,
                question.correct_answer,
                question.explanation,
                question.difficulty.as_str(),
                question.marks
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("question", question.id.clone()));
        }
        Ok(())
    }

    fn delete_question(&self, question_id: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM questions WHERE id = ?1;", [question_id])?;
        if changed == 0 {
            return Err(RepoError::not_found("question", question_id));
        }
        Ok(())
    }

    fn get_question(&self, question_id: &str) -> RepoResult<Option<Question>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1;"
        ))?;
        let mut rows = stmt.query([question_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_question_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_questions(&self, query: &QuestionQuery) -> RepoResult<Vec<Question>> {
        let mut sql = format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(subject_id) = query.subject_id.as_ref() {
            sql.push_str(" AND subject_id = ?");
            bind_values.push(Value::Text(subject_id.clone()));
        }
        if !query.topic_ids.is_empty() {
            let placeholders = vec!["?"; query.topic_ids.len()].join(", ");
            sql.push_str(&format!(" AND topic_id IN ({placeholders})"));
            bind_values.extend(query.topic_ids.iter().cloned().map(Value::Text));
        }
        if let Some(difficulty) = query.difficulty {
            sql.push_str(" AND difficulty = ?");
            bind_values.push(Value::Text(difficulty.as_str().to_string()));
        }

        sql.push_str(" ORDER BY id ASC");
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut questions = Vec::new();
        while let Some(row) = rows.next()? {
            questions.push(parse_question_row(row)?);
        }
        Ok(questions)
    }
}

impl LessonPlanRepository for SqliteTeacherRepository<'_> {
    fn create_plan(&self, plan: &LessonPlan) -> RepoResult<()> {
        plan.validate()?;
        self.conn.execute(
            &format!(
                "INSERT INTO lesson_plans ({PLAN_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);"
            ),
            params![
                plan.id,
                plan.teacher_id,
                plan.class_id,
                plan.subject_id,
                plan.topic_id,
                plan.title,
                to_json(&plan.objectives)?,
                to_json(&plan.activities)?,
                to_json(&plan.resources)?,
                plan.duration_minutes,
                plan.scheduled_on,
                plan.created_at,
                plan.updated_at
            ],
        )?;
        Ok(())
    }

    fn update_plan(&self, plan: &LessonPlan) -> RepoResult<()> {
        plan.validate()?;
        let changed = self.conn.execute(
            "UPDATE lesson_plans
             SET
                class_id = ?2,
                subject_id = ?3,
                topic_id = ?4,
                title = ?5,
                objectives_json = ?6,
                activities_json = ?7,
                resources_json = ?8,
                duration_minutes = ?9,
                scheduled_on = ?10,
                updated_at = ?11
             WHERE id = ?1 AND teacher_id = ?12;",
            params![
                plan.id,
                plan.class_id,
                plan.subject_id,
                plan.topic_id,
                plan.title,
                to_json(&plan.objectives)?,
                to_json(&plan.activities)?,
                to_json(&plan.resources)?,
                plan.duration_minutes,
                plan.scheduled_on,
                plan.updated_at,
                plan.teacher_id
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("lesson plan", plan.id.clone()));
        }
        Ok(())
    }

    fn get_plan(&self, plan_id: &str) -> RepoResult<Option<LessonPlan>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PLAN_COLUMNS} FROM lesson_plans WHERE id = ?1;"
        ))?;
        let mut rows = stmt.query([plan_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_plan_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_plans(&self, teacher_id: &str) -> RepoResult<Vec<LessonPlan>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PLAN_COLUMNS} FROM lesson_plans
             WHERE teacher_id = ?1
             ORDER BY updated_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query([teacher_id])?;
        let mut plans = Vec::new();
        while let Some(row) = rows.next()? {
            plans.push(parse_plan_row(row)?);
        }
        Ok(plans)
    }

    fn delete_plan(&self, plan_id: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM lesson_plans WHERE id = ?1;", [plan_id])?;
        if changed == 0 {
            return Err(RepoError::not_found("lesson plan", plan_id));
        }
        Ok(())
    }
}

impl ExamPaperRepository for SqliteTeacherRepository<'_> {
    fn save_exam(&self, exam: &ExamPaper) -> RepoResult<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO exam_papers ({EXAM_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);"
            ),
            params![
                exam.id,
                exam.teacher_id,
                exam.subject_id,
                exam.title,
                to_json(&exam.questions)?,
                exam.total_marks,
                exam.duration_minutes,
                exam.created_at
            ],
        )?;
        Ok(())
    }

    fn get_exam(&self, exam_id: &str) -> RepoResult<Option<ExamPaper>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EXAM_COLUMNS} FROM exam_papers WHERE id = ?1;"
        ))?;
        let mut rows = stmt.query([exam_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_exam_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_exams(&self, teacher_id: &str) -> RepoResult<Vec<ExamPaper>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EXAM_COLUMNS} FROM exam_papers
             WHERE teacher_id = ?1
             ORDER BY created_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query([teacher_id])?;
        let mut exams = Vec::new();
        while let Some(row) = rows.next()? {
            exams.push(parse_exam_row(row)?);
        }
        Ok(exams)
    }
}

fn parse_question_row(row: &Row<'_>) -> RepoResult<Question> {
    let kind: String = row.get("kind")?;
    let difficulty: String = row.get("difficulty")?;
    let options_json: String = row.get("options_json")?;
    let question = Question {
        id: row.get("id")?,
        subject_id: row.get("subject_id")?,
        topic_id: row.get("topic_id")?,
        text: row.get("text")?,
        kind: parse_enum("questions.kind", &kind, QuestionKind::parse)?,
        options: from_json("questions.options_json", &options_json)?,
        correct_answer: row.get("correct_answer")?,
        explanation: row.get("explanation")?,
        difficulty: parse_enum("questions.difficulty", &difficulty, Difficulty::parse)?,
        marks: row.get("marks")?,
    };
    question.validate()?;
    Ok(question)
}

fn parse_plan_row(row: &Row<'_>) -> RepoResult<LessonPlan> {
    let objectives_json: String = row.get("objectives_json")?;
    let activities_json: String = row.get("activities_json")?;
    let resources_json: String = row.get("resources_json")?;
    Ok(LessonPlan {
        id: row.get("id")?,
        teacher_id: row.get("teacher_id")?,
        class_id: row.get("class_id")?,
        subject_id: row.get("subject_id")?,
        topic_id: row.get("topic_id")?,
        title: row.get("title")?,
        objectives: from_json("lesson_plans.objectives_json", &objectives_json)?,
        activities: from_json("lesson_plans.activities_json", &activities_json)?,
        resources: from_json("lesson_plans.resources_json", &resources_json)?,
        duration_minutes: row.get("duration_minutes")?,
        scheduled_on: row.get("scheduled_on")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_exam_row(row: &Row<'_>) -> RepoResult<ExamPaper> {
    let questions_json: String = row.get("questions_json")?;
    Ok(ExamPaper {
        id: row.get("id")?,
        teacher_id: row.get("teacher_id")?,
        subject_id: row.get("subject_id")?,
        title: row.get("title")?,
        questions: from_json("exam_papers.questions_json", &questions_json)?,
        total_marks: row.get("total_marks")?,
        duration_minutes: row.get("duration_minutes")?,
        created_at: row.get("created_at")?,
    })
}
