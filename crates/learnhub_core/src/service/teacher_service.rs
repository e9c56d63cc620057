//! Teacher tooling use cases: lesson plans, question bank, exam generation.
//!
//! # Responsibility
//! - Gate every operation on an authoring role.
//! - Normalize drafts into validated records with generated ids.
//! - Assemble exam papers from the bank per difficulty bucket.
//!
//! # Invariants
//! - Lesson plans are modified only by their owner or an admin.
//! - Exam selection is deterministic for a given seed and bank.
//! - A paper is persisted only when every bucket could be filled.

use crate::clock::{Clock, SystemClock};
use crate::model::quiz::{Difficulty, Question, QuestionKind};
use crate::model::teacher::{ExamPaper, ExamRequest, LessonPlan};
use crate::model::user::{User, UserRole};
use crate::model::{require_id, require_text, ValidationError};
use crate::repo::teacher_repo::{
    ExamPaperRepository, LessonPlanRepository, QuestionBankRepository, QuestionQuery,
};
use crate::repo::RepoError;
use log::info;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").expect("valid date regex")
});

#[derive(Debug)]
pub enum TeacherError {
    Validation(ValidationError),
    /// Actor lacks the role or ownership required.
    Forbidden,
    NotFound { entity: &'static str, id: String },
    InsufficientQuestions {
        difficulty: Difficulty,
        requested: u32,
        available: u32,
    },
    Repo(RepoError),
}

impl Display for TeacherError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Forbidden => write!(f, "only teachers and admins can use teacher tools"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InsufficientQuestions {
                difficulty,
                requested,
                available,
            } => write!(
                f,
                "not enough {difficulty} questions: requested {requested}, available {available}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TeacherError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TeacherError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for TeacherError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Editable fields of a lesson plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonPlanDraft {
    pub class_id: String,
    pub subject_id: String,
    #[serde(default)]
    pub topic_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    pub duration_minutes: u32,
    #[serde(default)]
    pub scheduled_on: Option<String>,
}

/// Editable fields of a question bank entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub subject_id: String,
    #[serde(default)]
    pub topic_id: Option<String>,
    pub text: String,
    pub kind: QuestionKind,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
    pub difficulty: Difficulty,
    pub marks: u32,
}

impl QuestionDraft {
    fn into_question(self, id: String) -> Question {
        Question {
            id,
            subject_id: self.subject_id.trim().to_string(),
            topic_id: non_blank(self.topic_id),
            text: self.text.trim().to_string(),
            kind: self.kind,
            options: clean_list(self.options),
            correct_answer: self.correct_answer.trim().to_string(),
            explanation: non_blank(self.explanation),
            difficulty: self.difficulty,
            marks: self.marks,
        }
    }
}

pub struct TeacherService<Q, L, E>
where
    Q: QuestionBankRepository,
    L: LessonPlanRepository,
    E: ExamPaperRepository,
{
    bank: Q,
    plans: L,
    exams: E,
    clock: Box<dyn Clock>,
}

impl<Q, L, E> TeacherService<Q, L, E>
where
    Q: QuestionBankRepository,
    L: LessonPlanRepository,
    E: ExamPaperRepository,
{
    pub fn new(bank: Q, plans: L, exams: E) -> Self {
        Self {
            bank,
            plans,
            exams,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn create_lesson_plan(
        &self,
        actor: &User,
        draft: LessonPlanDraft,
    ) -> Result<LessonPlan, TeacherError> {
        require_author(actor)?;
        let now = self.clock.now_ms();
        let plan = build_plan(Uuid::new_v4().to_string(), &actor.id, draft, now, now)?;
        self.plans.create_plan(&plan)?;
        info!("event=lesson_plan_create module=teacher status=ok");
        Ok(plan)
    }

    pub fn update_lesson_plan(
        &self,
        actor: &User,
        plan_id: &str,
        draft: LessonPlanDraft,
    ) -> Result<LessonPlan, TeacherError> {
        let existing = self.owned_plan(actor, plan_id)?;
        let plan = build_plan(
            existing.id,
            &existing.teacher_id,
            draft,
            existing.created_at,
            self.clock.now_ms(),
        )?;
        self.plans.update_plan(&plan)?;
        info!("event=lesson_plan_update module=teacher status=ok");
        Ok(plan)
    }

    pub fn get_lesson_plan(&self, actor: &User, plan_id: &str) -> Result<LessonPlan, TeacherError> {
        self.owned_plan(actor, plan_id)
    }

    /// Plans owned by the actor, most recently updated first.
    pub fn list_lesson_plans(&self, actor: &User) -> Result<Vec<LessonPlan>, TeacherError> {
        require_author(actor)?;
        Ok(self.plans.list_plans(&actor.id)?)
    }

    pub fn delete_lesson_plan(&self, actor: &User, plan_id: &str) -> Result<(), TeacherError> {
        let plan = self.owned_plan(actor, plan_id)?;
        self.plans.delete_plan(&plan.id)?;
        info!("event=lesson_plan_delete module=teacher status=ok");
        Ok(())
    }

    pub fn add_question(
        &self,
        actor: &User,
        draft: QuestionDraft,
    ) -> Result<Question, TeacherError> {
        require_author(actor)?;
        let question = draft.into_question(Uuid::new_v4().to_string());
        self.bank.create_question(&question)?;
        info!(
            "event=question_add module=teacher status=ok difficulty={}",
            question.difficulty
        );
        Ok(question)
    }

    pub fn update_question(
        &self,
        actor: &User,
        question_id: &str,
        draft: QuestionDraft,
    ) -> Result<Question, TeacherError> {
        require_author(actor)?;
        require_id("question_id", question_id)?;
        let question = draft.into_question(question_id.to_string());
        self.bank.update_question(&question)?;
        Ok(question)
    }

    pub fn delete_question(&self, actor: &User, question_id: &str) -> Result<(), TeacherError> {
        require_author(actor)?;
        self.bank.delete_question(question_id)?;
        Ok(())
    }

    pub fn list_questions(
        &self,
        actor: &User,
        query: &QuestionQuery,
    ) -> Result<Vec<Question>, TeacherError> {
        require_author(actor)?;
        Ok(self.bank.list_questions(query)?)
    }

    /// Picks questions per difficulty bucket and persists the resulting paper.
    ///
    /// Buckets naming the same difficulty are merged. Buckets are filled in
    /// ascending difficulty order from one rng seeded with `request.seed`.
    pub fn generate_exam(
        &self,
        actor: &User,
        request: &ExamRequest,
    ) -> Result<ExamPaper, TeacherError> {
        require_author(actor)?;
        require_text("exam.title", &request.title)?;
        require_id("exam.subject_id", &request.subject_id)?;
        if request.duration_minutes == 0 {
            return Err(ValidationError::OutOfRange {
                field: "exam.duration_minutes",
                value: 0,
            }
            .into());
        }

        let mut buckets: BTreeMap<Difficulty, u32> = BTreeMap::new();
        for (difficulty, count) in &request.counts {
            let slot = buckets.entry(*difficulty).or_insert(0);
            *slot = slot.checked_add(*count).ok_or(ValidationError::OutOfRange {
                field: "exam.counts",
                value: i64::from(*slot) + i64::from(*count),
            })?;
        }
        buckets.retain(|_, count| *count > 0);
        if buckets.is_empty() {
            return Err(ValidationError::BlankField("exam.counts").into());
        }

        let topic_ids: Vec<String> = request
            .topic_ids
            .iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        let mut rng = StdRng::seed_from_u64(request.seed);
        let mut questions = Vec::new();
        for (difficulty, requested) in buckets {
            let mut pool = self.bank.list_questions(&QuestionQuery {
                subject_id: Some(request.subject_id.clone()),
                topic_ids: topic_ids.clone(),
                difficulty: Some(difficulty),
                limit: None,
            })?;
            let available = u32::try_from(pool.len()).unwrap_or(u32::MAX);
            if available < requested {
                return Err(TeacherError::InsufficientQuestions {
                    difficulty,
                    requested,
                    available,
                });
            }
            pool.shuffle(&mut rng);
            pool.truncate(requested as usize);
            questions.extend(pool);
        }

        let total_marks = questions
            .iter()
            .try_fold(0u32, |total, question| total.checked_add(question.marks))
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "exam.total_marks",
                value: questions
                    .iter()
                    .map(|question| i64::from(question.marks))
                    .sum(),
            })?;
        let paper = ExamPaper {
            id: Uuid::new_v4().to_string(),
            teacher_id: actor.id.clone(),
            subject_id: request.subject_id.clone(),
            title: request.title.trim().to_string(),
            total_marks,
            questions,
            duration_minutes: request.duration_minutes,
            created_at: self.clock.now_ms(),
        };
        self.exams.save_exam(&paper)?;
        info!(
            "event=exam_generate module=teacher status=ok questions={} total_marks={}",
            paper.questions.len(),
            paper.total_marks
        );
        Ok(paper)
    }

    pub fn get_exam(&self, actor: &User, exam_id: &str) -> Result<ExamPaper, TeacherError> {
        require_author(actor)?;
        let exam = self
            .exams
            .get_exam(exam_id)?
            .ok_or_else(|| TeacherError::NotFound {
                entity: "exam paper",
                id: exam_id.to_string(),
            })?;
        if exam.teacher_id != actor.id && actor.role != UserRole::Admin {
            return Err(TeacherError::Forbidden);
        }
        Ok(exam)
    }

    pub fn list_exams(&self, actor: &User) -> Result<Vec<ExamPaper>, TeacherError> {
        require_author(actor)?;
        Ok(self.exams.list_exams(&actor.id)?)
    }

    fn owned_plan(&self, actor: &User, plan_id: &str) -> Result<LessonPlan, TeacherError> {
        require_author(actor)?;
        let plan = self
            .plans
            .get_plan(plan_id)?
            .ok_or_else(|| TeacherError::NotFound {
                entity: "lesson plan",
                id: plan_id.to_string(),
            })?;
        if plan.teacher_id != actor.id && actor.role != UserRole::Admin {
            return Err(TeacherError::Forbidden);
        }
        Ok(plan)
    }
}

fn require_author(actor: &User) -> Result<(), TeacherError> {
    if actor.role.can_author() {
        Ok(())
    } else {
        Err(TeacherError::Forbidden)
    }
}

fn build_plan(
    id: String,
    teacher_id: &str,
    draft: LessonPlanDraft,
    created_at: i64,
    updated_at: i64,
) -> Result<LessonPlan, TeacherError> {
    let scheduled_on = non_blank(draft.scheduled_on);
    if let Some(date) = &scheduled_on {
        if !DATE_RE.is_match(date) {
            return Err(ValidationError::InvalidDate(date.clone()).into());
        }
    }
    let plan = LessonPlan {
        id,
        teacher_id: teacher_id.to_string(),
        class_id: draft.class_id.trim().to_string(),
        subject_id: draft.subject_id.trim().to_string(),
        topic_id: non_blank(draft.topic_id),
        title: draft.title.trim().to_string(),
        objectives: clean_list(draft.objectives),
        activities: clean_list(draft.activities),
        resources: clean_list(draft.resources),
        duration_minutes: draft.duration_minutes,
        scheduled_on,
        created_at,
        updated_at,
    };
    plan.validate()?;
    Ok(plan)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> LessonPlanDraft {
        LessonPlanDraft {
            class_id: "grade-7".to_string(),
            subject_id: "math".to_string(),
            topic_id: Some("  ".to_string()),
            title: "  Fractions intro ".to_string(),
            objectives: vec![" add halves ".to_string(), String::new()],
            activities: Vec::new(),
            resources: Vec::new(),
            duration_minutes: 40,
            scheduled_on: Some("2026-03-02".to_string()),
        }
    }

    #[test]
    fn build_plan_trims_fields_and_checks_date_shape() {
        let plan = build_plan("p1".to_string(), "t1", draft(), 1, 2).expect("plan");
        assert_eq!(plan.title, "Fractions intro");
        assert_eq!(plan.topic_id, None);
        assert_eq!(plan.objectives, vec!["add halves".to_string()]);

        let mut bad = draft();
        bad.scheduled_on = Some("next monday".to_string());
        assert!(matches!(
            build_plan("p1".to_string(), "t1", bad, 1, 2),
            Err(TeacherError::Validation(ValidationError::InvalidDate(_)))
        ));
    }
}
