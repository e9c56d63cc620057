//! Teacher tooling records: lesson plans and generated exam papers.

use super::quiz::{Difficulty, Question};
use super::{require_id, require_text, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonPlan {
    pub id: String,
    pub teacher_id: String,
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
    /// ISO-8601 calendar date (`YYYY-MM-DD`) chosen by the teacher.
    #[serde(default)]
    pub scheduled_on: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl LessonPlan {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("lesson_plan.id", &self.id)?;
        require_id("lesson_plan.teacher_id", &self.teacher_id)?;
        require_id("lesson_plan.class_id", &self.class_id)?;
        require_id("lesson_plan.subject_id", &self.subject_id)?;
        require_text("lesson_plan.title", &self.title)?;
        if self.duration_minutes == 0 {
            return Err(ValidationError::OutOfRange {
                field: "lesson_plan.duration_minutes",
                value: 0,
            });
        }
        Ok(())
    }
}

/// Request for exam generation from the question bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamRequest {
    pub title: String,
    pub subject_id: String,
    /// Limits selection to these topics; empty means the whole subject.
    #[serde(default)]
    pub topic_ids: Vec<String>,
    /// Requested number of questions per difficulty bucket.
    pub counts: Vec<(Difficulty, u32)>,
    pub duration_minutes: u32,
    /// Seed for the shuffle; identical seeds over the same bank pick identical papers.
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamPaper {
    pub id: String,
    pub teacher_id: String,
    pub subject_id: String,
    pub title: String,
    pub questions: Vec<Question>,
    pub total_marks: u32,
    pub duration_minutes: u32,
    pub created_at: i64,
}
