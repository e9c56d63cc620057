//! Bookmarks, achievements and the leaderboard.

use crate::clock::{Clock, SystemClock};
use crate::model::engagement::{Achievement, Bookmark, LeaderboardEntry};
use crate::model::require_id;
use crate::repo::bookmark_repo::{AchievementRepository, BookmarkRepository};
use crate::repo::quiz_repo::QuizRepository;
use crate::repo::RepoResult;
use log::info;

pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 20;
pub const MAX_LEADERBOARD_LIMIT: u32 = 100;

pub struct EngagementService<B, A, Q>
where
    B: BookmarkRepository,
    A: AchievementRepository,
    Q: QuizRepository,
{
    bookmarks: B,
    achievements: A,
    quizzes: Q,
    clock: Box<dyn Clock>,
}

impl<B, A, Q> EngagementService<B, A, Q>
where
    B: BookmarkRepository,
    A: AchievementRepository,
    Q: QuizRepository,
{
    pub fn new(bookmarks: B, achievements: A, quizzes: Q) -> Self {
        Self {
            bookmarks,
            achievements,
            quizzes,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Adds a bookmark; bookmarking the same content twice returns the first one.
    pub fn add_bookmark(
        &self,
        user_id: &str,
        content_id: &str,
        note: Option<&str>,
    ) -> RepoResult<Bookmark> {
        require_id("user_id", user_id)?;
        require_id("content_id", content_id)?;
        let bookmark = self
            .bookmarks
            .add_bookmark(user_id, content_id, note, self.clock.now_ms())?;
        info!("event=bookmark_add module=engagement status=ok");
        Ok(bookmark)
    }

    pub fn remove_bookmark(&self, user_id: &str, content_id: &str) -> RepoResult<()> {
        self.bookmarks.remove_bookmark(user_id, content_id)?;
        info!("event=bookmark_remove module=engagement status=ok");
        Ok(())
    }

    /// Flips the bookmark state; returns `true` when the content is now bookmarked.
    pub fn toggle_bookmark(&self, user_id: &str, content_id: &str) -> RepoResult<bool> {
        if self.bookmarks.is_bookmarked(user_id, content_id)? {
            self.remove_bookmark(user_id, content_id)?;
            Ok(false)
        } else {
            self.add_bookmark(user_id, content_id, None)?;
            Ok(true)
        }
    }

    pub fn is_bookmarked(&self, user_id: &str, content_id: &str) -> RepoResult<bool> {
        self.bookmarks.is_bookmarked(user_id, content_id)
    }

    pub fn list_bookmarks(&self, user_id: &str) -> RepoResult<Vec<Bookmark>> {
        self.bookmarks.list_bookmarks(user_id)
    }

    pub fn achievements(&self, user_id: &str) -> RepoResult<Vec<Achievement>> {
        self.achievements.list_achievements(user_id)
    }

    /// Ranked entries; `None` uses the default limit, larger limits are clamped.
    pub fn leaderboard(&self, limit: Option<u32>) -> RepoResult<Vec<LeaderboardEntry>> {
        let limit = limit
            .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
            .clamp(1, MAX_LEADERBOARD_LIMIT);
        self.quizzes.leaderboard(limit)
    }
}
