//! Bookmarks, achievements and leaderboard rows.

use super::string_enum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub content_id: String,
    #[serde(default)]
    pub note: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    /// First content item completed.
    FirstLesson,
    /// First topic fully completed.
    TopicMaster,
    /// First quiz submitted.
    FirstQuiz,
    /// A quiz scored 100%.
    PerfectScore,
    /// Three passed quiz attempts in a row.
    QuizStreak,
}

string_enum!(AchievementKind {
    FirstLesson => "first_lesson",
    TopicMaster => "topic_master",
    FirstQuiz => "first_quiz",
    PerfectScore => "perfect_score",
    QuizStreak => "quiz_streak",
});

impl AchievementKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::FirstLesson => "First Lesson",
            Self::TopicMaster => "Topic Master",
            Self::FirstQuiz => "Quiz Taker",
            Self::PerfectScore => "Perfect Score",
            Self::QuizStreak => "On a Roll",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub user_id: String,
    pub kind: AchievementKind,
    pub earned_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based dense rank.
    pub rank: u32,
    pub user_id: String,
    pub user_name: String,
    pub points: u32,
    pub quizzes_taken: u32,
}
