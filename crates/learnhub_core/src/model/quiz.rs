//! Question bank and quiz records.
//!
//! # Invariants
//! - Multiple-choice questions carry at least two options and their correct
//!   answer is one of them.
//! - `marks` is positive for every question.

use super::{require_id, require_text, string_enum, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
}

string_enum!(QuestionKind {
    MultipleChoice => "multiple_choice",
    TrueFalse => "true_false",
    ShortAnswer => "short_answer",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

string_enum!(Difficulty {
    Easy => "easy",
    Medium => "medium",
    Hard => "hard",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
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

impl Question {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("question.id", &self.id)?;
        require_id("question.subject_id", &self.subject_id)?;
        require_text("question.text", &self.text)?;
        require_text("question.correct_answer", &self.correct_answer)?;
        if self.marks == 0 {
            return Err(ValidationError::OutOfRange {
                field: "question.marks",
                value: 0,
            });
        }

        match self.kind {
            QuestionKind::MultipleChoice => {
                if self.options.len() < 2 {
                    return Err(ValidationError::TooFewOptions(self.options.len()));
                }
                if !self
                    .options
                    .iter()
                    .any(|option| answers_match(option, &self.correct_answer))
                {
                    return Err(ValidationError::AnswerNotInOptions(
                        self.correct_answer.clone(),
                    ));
                }
            }
            QuestionKind::TrueFalse => {
                let normalized = normalize_answer(&self.correct_answer);
                if normalized != "true" && normalized != "false" {
                    return Err(ValidationError::AnswerNotInOptions(
                        self.correct_answer.clone(),
                    ));
                }
            }
            QuestionKind::ShortAnswer => {}
        }
        Ok(())
    }

    /// Returns whether `answer` is accepted for this question.
    pub fn is_correct(&self, answer: &str) -> bool {
        answers_match(answer, &self.correct_answer)
    }
}

/// Answers compare case-insensitively with surrounding/inner whitespace collapsed.
pub fn answers_match(left: &str, right: &str) -> bool {
    normalize_answer(left) == normalize_answer(right)
}

fn normalize_answer(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub topic_id: String,
    pub title: String,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub time_limit_minutes: Option<u32>,
    pub pass_mark_percent: u8,
}

impl Quiz {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("quiz.id", &self.id)?;
        require_text("quiz.title", &self.title)?;
        if self.questions.is_empty() {
            return Err(ValidationError::BlankField("quiz.questions"));
        }
        if self.pass_mark_percent > 100 {
            return Err(ValidationError::OutOfRange {
                field: "quiz.pass_mark_percent",
                value: i64::from(self.pass_mark_percent),
            });
        }
        for question in &self.questions {
            question.validate()?;
        }
        let marks: u64 = self
            .questions
            .iter()
            .map(|question| u64::from(question.marks))
            .sum();
        if marks > u64::from(u32::MAX) {
            return Err(ValidationError::OutOfRange {
                field: "quiz.total_marks",
                value: i64::try_from(marks).unwrap_or(i64::MAX),
            });
        }
        Ok(())
    }

    /// Sum of question marks, saturating at `u32::MAX`.
    pub fn total_marks(&self) -> u32 {
        self.questions
            .iter()
            .fold(0u32, |total, question| total.saturating_add(question.marks))
    }
}

/// One learner answer keyed by question id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAnswer {
    pub question_id: String,
    pub answer: String,
}

/// Per-question grading outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradedAnswer {
    pub question_id: String,
    /// `None` when the learner skipped the question.
    pub given: Option<String>,
    pub correct: bool,
    pub marks_awarded: u32,
}

/// Persisted result of one quiz submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: String,
    pub user_id: String,
    pub quiz_id: String,
    pub score: u32,
    pub total_marks: u32,
    pub percentage: f64,
    pub passed: bool,
    pub answers: Vec<GradedAnswer>,
    /// Epoch milliseconds.
    pub submitted_at: i64,
}
