//! Quiz assembly, grading and attempt history.
//!
//! # Responsibility
//! - Build quizzes for a topic from the question bank with a seeded shuffle.
//! - Grade submissions and persist attempts.
//! - Award quiz achievements.
//!
//! # Invariants
//! - Identical seeds over an identical bank produce identical quizzes.
//! - Answers are compared case-insensitively after whitespace normalization.
//! - Answers naming questions outside the quiz are rejected, not ignored.

use crate::clock::{Clock, SystemClock};
use crate::model::engagement::{Achievement, AchievementKind};
use crate::model::quiz::{GradedAnswer, Quiz, QuizAnswer, QuizAttempt};
use crate::model::{require_id, require_text, ValidationError};
use crate::repo::bookmark_repo::AchievementRepository;
use crate::repo::quiz_repo::QuizRepository;
use crate::repo::teacher_repo::{QuestionBankRepository, QuestionQuery};
use crate::repo::RepoError;
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Passed attempts in a row needed for `QuizStreak`.
pub const STREAK_LENGTH: usize = 3;
pub const DEFAULT_PASS_MARK_PERCENT: u8 = 50;

#[derive(Debug)]
pub enum QuizError {
    Validation(ValidationError),
    NotFound { entity: &'static str, id: String },
    NotEnoughQuestions { requested: u32, available: u32 },
    UnknownQuestion(String),
    Repo(RepoError),
}

impl Display for QuizError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::NotEnoughQuestions {
                requested,
                available,
            } => write!(
                f,
                "not enough questions: requested {requested}, available {available}"
            ),
            Self::UnknownQuestion(id) => write!(f, "answer for unknown question: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for QuizError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for QuizError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for QuizError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRequest {
    pub topic_id: String,
    pub title: String,
    pub question_count: u32,
    #[serde(default = "default_pass_mark")]
    pub pass_mark_percent: u8,
    #[serde(default)]
    pub time_limit_minutes: Option<u32>,
    pub seed: u64,
}

fn default_pass_mark() -> u8 {
    DEFAULT_PASS_MARK_PERCENT
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionOutcome {
    pub attempt: QuizAttempt,
    pub achievements: Vec<Achievement>,
}

/// Grades `answers` against `quiz`. Unanswered questions score zero.
pub fn grade(quiz: &Quiz, answers: &[QuizAnswer]) -> Result<Vec<GradedAnswer>, QuizError> {
    let known: HashSet<&str> = quiz.questions.iter().map(|q| q.id.as_str()).collect();
    let mut given: HashMap<&str, &str> = HashMap::new();
    for answer in answers {
        if !known.contains(answer.question_id.as_str()) {
            return Err(QuizError::UnknownQuestion(answer.question_id.clone()));
        }
        given.insert(answer.question_id.as_str(), answer.answer.as_str());
    }

    Ok(quiz
        .questions
        .iter()
        .map(|question| {
            let answer = given
                .get(question.id.as_str())
                .map(|value| value.to_string())
                .filter(|value| !value.trim().is_empty());
            let correct = answer
                .as_deref()
                .is_some_and(|value| question.is_correct(value));
            GradedAnswer {
                question_id: question.id.clone(),
                given: answer,
                correct,
                marks_awarded: if correct { question.marks } else { 0 },
            }
        })
        .collect())
}

pub struct QuizService<Q, R, A>
where
    Q: QuestionBankRepository,
    R: QuizRepository,
    A: AchievementRepository,
{
    bank: Q,
    quizzes: R,
    achievements: A,
    clock: Box<dyn Clock>,
}

impl<Q, R, A> QuizService<Q, R, A>
where
    Q: QuestionBankRepository,
    R: QuizRepository,
    A: AchievementRepository,
{
    pub fn new(bank: Q, quizzes: R, achievements: A) -> Self {
        Self {
            bank,
            quizzes,
            achievements,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Draws `question_count` questions of the topic and stores the quiz.
    pub fn build_quiz(&self, request: &QuizRequest) -> Result<Quiz, QuizError> {
        require_id("topic_id", &request.topic_id)?;
        require_text("quiz.title", &request.title)?;
        if request.question_count == 0 {
            return Err(ValidationError::OutOfRange {
                field: "quiz.question_count",
                value: 0,
            }
            .into());
        }

        let mut pool = self.bank.list_questions(&QuestionQuery {
            topic_ids: vec![request.topic_id.clone()],
            ..QuestionQuery::default()
        })?;
        let available = u32::try_from(pool.len()).unwrap_or(u32::MAX);
        if available < request.question_count {
            return Err(QuizError::NotEnoughQuestions {
                requested: request.question_count,
                available,
            });
        }

        let mut rng = StdRng::seed_from_u64(request.seed);
        pool.shuffle(&mut rng);
        pool.truncate(request.question_count as usize);

        let quiz = Quiz {
            id: Uuid::new_v4().to_string(),
            topic_id: request.topic_id.clone(),
            title: request.title.trim().to_string(),
            questions: pool,
            time_limit_minutes: request.time_limit_minutes,
            pass_mark_percent: request.pass_mark_percent,
        };
        quiz.validate()?;
        self.quizzes.save_quiz(&quiz, self.clock.now_ms())?;
        info!(
            "event=quiz_build module=quiz status=ok questions={}",
            quiz.questions.len()
        );
        Ok(quiz)
    }

    pub fn get_quiz(&self, quiz_id: &str) -> Result<Quiz, QuizError> {
        self.quizzes
            .get_quiz(quiz_id)?
            .ok_or_else(|| QuizError::NotFound {
                entity: "quiz",
                id: quiz_id.to_string(),
            })
    }

    pub fn quizzes_for_topic(&self, topic_id: &str) -> Result<Vec<Quiz>, QuizError> {
        require_id("topic_id", topic_id)?;
        Ok(self.quizzes.list_quizzes(topic_id)?)
    }

    /// Grades and records one attempt.
    pub fn submit(
        &self,
        user_id: &str,
        quiz_id: &str,
        answers: &[QuizAnswer],
    ) -> Result<SubmissionOutcome, QuizError> {
        require_id("user_id", user_id)?;
        let quiz = self.get_quiz(quiz_id)?;
        let graded = grade(&quiz, answers)?;

        let score = graded
            .iter()
            .fold(0u32, |total, answer| total.saturating_add(answer.marks_awarded));
        let total_marks = quiz.total_marks();
        let percentage = if total_marks == 0 {
            0.0
        } else {
            f64::from(score) * 100.0 / f64::from(total_marks)
        };
        let now = self.clock.now_ms();
        let attempt = QuizAttempt {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            quiz_id: quiz.id.clone(),
            score,
            total_marks,
            percentage,
            passed: percentage >= f64::from(quiz.pass_mark_percent),
            answers: graded,
            submitted_at: now,
        };
        self.quizzes.save_attempt(&attempt)?;

        let mut earned = Vec::new();
        self.award(user_id, AchievementKind::FirstQuiz, now, &mut earned)?;
        if total_marks > 0 && score == total_marks {
            self.award(user_id, AchievementKind::PerfectScore, now, &mut earned)?;
        }
        if attempt.passed && self.on_streak(user_id)? {
            self.award(user_id, AchievementKind::QuizStreak, now, &mut earned)?;
        }

        info!(
            "event=quiz_submit module=quiz status=ok passed={} achievements={}",
            attempt.passed,
            earned.len()
        );
        Ok(SubmissionOutcome {
            attempt,
            achievements: earned,
        })
    }

    pub fn history(&self, user_id: &str) -> Result<Vec<QuizAttempt>, QuizError> {
        Ok(self.quizzes.list_attempts(user_id)?)
    }

    pub fn best_attempt(
        &self,
        user_id: &str,
        quiz_id: &str,
    ) -> Result<Option<QuizAttempt>, QuizError> {
        Ok(self.quizzes.best_attempt(user_id, quiz_id)?)
    }

    fn on_streak(&self, user_id: &str) -> Result<bool, QuizError> {
        let recent = self.quizzes.list_attempts(user_id)?;
        Ok(recent.len() >= STREAK_LENGTH
            && recent.iter().take(STREAK_LENGTH).all(|attempt| attempt.passed))
    }

    fn award(
        &self,
        user_id: &str,
        kind: AchievementKind,
        now: i64,
        earned: &mut Vec<Achievement>,
    ) -> Result<(), QuizError> {
        if let Some(achievement) = self.achievements.award(user_id, kind, now)? {
            earned.push(achievement);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::quiz::{Difficulty, Question, QuestionKind};

    fn question(id: &str, answer: &str, marks: u32) -> Question {
        Question {
            id: id.to_string(),
            subject_id: "math".to_string(),
            topic_id: Some("fractions".to_string()),
            text: format!("question {id}"),
            kind: QuestionKind::ShortAnswer,
            options: Vec::new(),
            correct_answer: answer.to_string(),
            explanation: None,
            difficulty: Difficulty::Easy,
            marks,
        }
    }

    fn quiz() -> Quiz {
        Quiz {
            id: "q1".to_string(),
            topic_id: "fractions".to_string(),
            title: "Fractions".to_string(),
            questions: vec![question("a", "One Half", 2), question("b", "3", 1)],
            time_limit_minutes: None,
            pass_mark_percent: 50,
        }
    }

    #[test]
    fn grade_normalizes_answers_and_scores_skips_as_zero() {
        let graded = grade(
            &quiz(),
            &[QuizAnswer {
                question_id: "a".to_string(),
                answer: "  one   half ".to_string(),
            }],
        )
        .expect("grade");
        assert!(graded[0].correct);
        assert_eq!(graded[0].marks_awarded, 2);
        assert_eq!(graded[1].given, None);
        assert_eq!(graded[1].marks_awarded, 0);
    }

    #[test]
    fn grade_rejects_answers_for_foreign_questions() {
        let err = grade(
            &quiz(),
            &[QuizAnswer {
                question_id: "zzz".to_string(),
                answer: "3".to_string(),
            }],
        )
        .expect_err("unknown question");
        assert!(matches!(err, QuizError::UnknownQuestion(id) if id == "zzz"));
    }
}
