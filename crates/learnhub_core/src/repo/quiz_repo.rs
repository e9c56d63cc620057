//! Quiz definitions, attempts and leaderboard aggregation.
//!
//! # Invariants
//! - Attempts reference a stored quiz.
//! - Leaderboard points are the sum of each user's best score per quiz.

use crate::model::engagement::LeaderboardEntry;
use crate::model::quiz::{GradedAnswer, Question, Quiz, QuizAttempt};
use crate::repo::{
    bool_to_int, ensure_connection_ready, from_json, int_to_bool, to_json, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

pub trait QuizRepository {
    fn save_quiz(&self, quiz: &Quiz, created_at: i64) -> RepoResult<()>;
    fn get_quiz(&self, quiz_id: &str) -> RepoResult<Option<Quiz>>;
    fn list_quizzes(&self, topic_id: &str) -> RepoResult<Vec<Quiz>>;
    fn save_attempt(&self, attempt: &QuizAttempt) -> RepoResult<()>;
    /// Newest first.
    fn list_attempts(&self, user_id: &str) -> RepoResult<Vec<QuizAttempt>>;
    /// Highest score, earliest submission on ties.
    fn best_attempt(&self, user_id: &str, quiz_id: &str) -> RepoResult<Option<QuizAttempt>>;
    /// Users ordered by points desc, then user id asc.
    fn leaderboard(&self, limit: u32) -> RepoResult<Vec<LeaderboardEntry>>;
}

const ATTEMPT_COLUMNS: &str = "id, user_id, quiz_id, score, total_marks, percentage, passed, answers_json, submitted_at";

#[derive(Clone, Copy)]
pub struct SqliteQuizRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteQuizRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_attempts(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<QuizAttempt>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut attempts = Vec::new();
        while let Some(row) = rows.next()? {
            attempts.push(parse_attempt_row(row)?);
        }
        Ok(attempts)
    }
}

impl QuizRepository for SqliteQuizRepository<'_> {
    fn save_quiz(&self, quiz: &Quiz, created_at: i64) -> RepoResult<()> {
        quiz.validate()?;
        self.conn.execute(
            "INSERT INTO quizzes (
                id, topic_id, title, questions_json, time_limit_minutes, pass_mark_percent, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                topic_id = excluded.topic_id,
                title = excluded.title,
                questions_json = excluded.questions_json,
                time_limit_minutes = excluded.time_limit_minutes,
                pass_mark_percent = excluded.pass_mark_percent;",
            params![
                quiz.id,
                quiz.topic_id,
                quiz.title,
                to_json(&quiz.questions)?,
                quiz.time_limit_minutes,
                quiz.pass_mark_percent,
                created_at
            ],
        )?;
        Ok(())
    }

    fn get_quiz(&self, quiz_id: &str) -> RepoResult<Option<Quiz>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, topic_id, title, questions_json, time_limit_minutes, pass_mark_percent
             FROM quizzes WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([quiz_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_quiz_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_quizzes(&self, topic_id: &str) -> RepoResult<Vec<Quiz>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, topic_id, title, questions_json, time_limit_minutes, pass_mark_percent
             FROM quizzes WHERE topic_id = ?1
             ORDER BY created_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([topic_id])?;
        let mut quizzes = Vec::new();
        while let Some(row) = rows.next()? {
            quizzes.push(parse_quiz_row(row)?);
        }
        Ok(quizzes)
    }

    fn save_attempt(&self, attempt: &QuizAttempt) -> RepoResult<()> {
        if self.get_quiz(&attempt.quiz_id)?.is_none() {
            return Err(RepoError::not_found("quiz", attempt.quiz_id.clone()));
        }
        self.conn.execute(
            &format!(
                "INSERT INTO quiz_attempts ({ATTEMPT_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);"
            ),
            params![
                attempt.id,
                attempt.user_id,
                attempt.quiz_id,
                attempt.score,
                attempt.total_marks,
                attempt.percentage,
                bool_to_int(attempt.passed),
                to_json(&attempt.answers)?,
                attempt.submitted_at
            ],
        )?;
        Ok(())
    }

    fn list_attempts(&self, user_id: &str) -> RepoResult<Vec<QuizAttempt>> {
        self.query_attempts(
            &format!(
                "SELECT {ATTEMPT_COLUMNS} FROM quiz_attempts
                 WHERE user_id = ?1
                 ORDER BY submitted_at DESC, rowid DESC;"
            ),
            [user_id],
        )
    }

    fn best_attempt(&self, user_id: &str, quiz_id: &str) -> RepoResult<Option<QuizAttempt>> {
        let mut attempts = self.query_attempts(
            &format!(
                "SELECT {ATTEMPT_COLUMNS} FROM quiz_attempts
                 WHERE user_id = ?1 AND quiz_id = ?2
                 ORDER BY score DESC, submitted_at ASC, rowid ASC
                 LIMIT 1;"
            ),
            [user_id, quiz_id],
        )?;
        Ok(attempts.pop())
    }

    fn leaderboard(&self, limit: u32) -> RepoResult<Vec<LeaderboardEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                best.user_id AS user_id,
                COALESCE(u.name, best.user_id) AS user_name,
                SUM(best.best_score) AS points,
                COUNT(*) AS quizzes_taken
             FROM (
                SELECT user_id, quiz_id, MAX(score) AS best_score
                FROM quiz_attempts
                GROUP BY user_id, quiz_id
             ) best
             LEFT JOIN users u ON u.id = best.user_id
             GROUP BY best.user_id
             ORDER BY points DESC, best.user_id ASC
             LIMIT ?1;",
        )?;
        let mut rows = stmt.query([i64::from(limit)])?;
        let mut entries: Vec<LeaderboardEntry> = Vec::new();
        while let Some(row) = rows.next()? {
            let points: u32 = row.get("points")?;
            let rank = match entries.last() {
                Some(previous) if previous.points == points => previous.rank,
                Some(previous) => previous.rank + 1,
                None => 1,
            };
            entries.push(LeaderboardEntry {
                rank,
                user_id: row.get("user_id")?,
                user_name: row.get("user_name")?,
                points,
                quizzes_taken: row.get("quizzes_taken")?,
            });
        }
        Ok(entries)
    }
}

fn parse_quiz_row(row: &Row<'_>) -> RepoResult<Quiz> {
    let questions_json: String = row.get("questions_json")?;
    Ok(Quiz {
        id: row.get("id")?,
        topic_id: row.get("topic_id")?,
        title: row.get("title")?,
        questions: from_json::<Vec<Question>>("quizzes.questions_json", &questions_json)?,
        time_limit_minutes: row.get("time_limit_minutes")?,
        pass_mark_percent: row.get("pass_mark_percent")?,
    })
}

fn parse_attempt_row(row: &Row<'_>) -> RepoResult<QuizAttempt> {
    let answers_json: String = row.get("answers_json")?;
    Ok(QuizAttempt {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        quiz_id: row.get("quiz_id")?,
        score: row.get("score")?,
        total_marks: row.get("total_marks")?,
        percentage: row.get("percentage")?,
        passed: int_to_bool("quiz_attempts.passed", row.get("passed")?)?,
        answers: from_json::<Vec<GradedAnswer>>("quiz_attempts.answers_json", &answers_json)?,
        submitted_at: row.get("submitted_at")?,
    })
}
