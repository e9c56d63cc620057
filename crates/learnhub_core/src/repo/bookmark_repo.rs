//! Bookmark and achievement repositories.
//!
//! # Invariants
//! - One bookmark per `(user, content)`; one achievement per `(user, kind)`.

use crate::model::engagement::{Achievement, AchievementKind, Bookmark};
use crate::model::require_id;
use crate::repo::{ensure_connection_ready, parse_enum, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

pub trait BookmarkRepository {
    /// Adds a bookmark, or returns the existing one for the same content.
    fn add_bookmark(
        &self,
        user_id: &str,
        content_id: &str,
        note: Option<&str>,
        created_at: i64,
    ) -> RepoResult<Bookmark>;
    fn remove_bookmark(&self, user_id: &str, content_id: &str) -> RepoResult<()>;
    fn is_bookmarked(&self, user_id: &str, content_id: &str) -> RepoResult<bool>;
    /// Newest first.
    fn list_bookmarks(&self, user_id: &str) -> RepoResult<Vec<Bookmark>>;
}

pub trait AchievementRepository {
    /// Awards `kind` once; returns `None` when the user already holds it.
    fn award(
        &self,
        user_id: &str,
        kind: AchievementKind,
        earned_at: i64,
    ) -> RepoResult<Option<Achievement>>;
    /// Oldest first.
    fn list_achievements(&self, user_id: &str) -> RepoResult<Vec<Achievement>>;
}

#[derive(Clone, Copy)]
pub struct SqliteEngagementRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEngagementRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn find_bookmark(&self, user_id: &str, content_id: &str) -> RepoResult<Option<Bookmark>> {
        let bookmark = self
            .conn
            .query_row(
                "SELECT id, user_id, content_id, note, created_at
                 FROM bookmarks
                 WHERE user_id = ?1 AND content_id = ?2;",
                params![user_id, content_id],
                parse_bookmark_row,
            )
            .optional()?;
        Ok(bookmark)
    }
}

impl BookmarkRepository for SqliteEngagementRepository<'_> {
    fn add_bookmark(
        &self,
        user_id: &str,
        content_id: &str,
        note: Option<&str>,
        created_at: i64,
    ) -> RepoResult<Bookmark> {
        require_id("bookmark.user_id", user_id)?;
        require_id("bookmark.content_id", content_id)?;

        if let Some(existing) = self.find_bookmark(user_id, content_id)? {
            return Ok(existing);
        }

        let bookmark = Bookmark {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            content_id: content_id.to_string(),
            note: note
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            created_at,
        };
        self.conn.execute(
            "INSERT INTO bookmarks (id, user_id, content_id, note, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                bookmark.id,
                bookmark.user_id,
                bookmark.content_id,
                bookmark.note,
                bookmark.created_at
            ],
        )?;
        Ok(bookmark)
    }

    fn remove_bookmark(&self, user_id: &str, content_id: &str) -> RepoResult<()> {
        let removed = self.conn.execute(
            "DELETE FROM bookmarks WHERE user_id = ?1 AND content_id = ?2;",
            params![user_id, content_id],
        )?;
        if removed == 0 {
            return Err(RepoError::not_found("bookmark", content_id));
        }
        Ok(())
    }

    fn is_bookmarked(&self, user_id: &str, content_id: &str) -> RepoResult<bool> {
        Ok(self.find_bookmark(user_id, content_id)?.is_some())
    }

    fn list_bookmarks(&self, user_id: &str) -> RepoResult<Vec<Bookmark>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, content_id, note, created_at
             FROM bookmarks
             WHERE user_id = ?1
             ORDER BY created_at DESC, id ASC;",
        )?;
        let bookmarks = stmt
            .query_map([user_id], parse_bookmark_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(bookmarks)
    }
}

impl AchievementRepository for SqliteEngagementRepository<'_> {
    fn award(
        &self,
        user_id: &str,
        kind: AchievementKind,
        earned_at: i64,
    ) -> RepoResult<Option<Achievement>> {
        require_id("achievement.user_id", user_id)?;
        let achievement = Achievement {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind,
            earned_at,
        };
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO achievements (id, user_id, kind, earned_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                achievement.id,
                achievement.user_id,
                kind.as_str(),
                achievement.earned_at
            ],
        )?;
        Ok((inserted > 0).then_some(achievement))
    }

    fn list_achievements(&self, user_id: &str) -> RepoResult<Vec<Achievement>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, kind, earned_at
             FROM achievements
             WHERE user_id = ?1
             ORDER BY earned_at ASC, kind ASC;",
        )?;
        let mut rows = stmt.query([user_id])?;
        let mut achievements = Vec::new();
        while let Some(row) = rows.next()? {
            let kind: String = row.get("kind")?;
            achievements.push(Achievement {
                id: row.get("id")?,
                user_id: row.get("user_id")?,
                kind: parse_enum("achievements.kind", &kind, AchievementKind::parse)?,
                earned_at: row.get("earned_at")?,
            });
        }
        Ok(achievements)
    }
}

fn parse_bookmark_row(row: &Row<'_>) -> rusqlite::Result<Bookmark> {
    Ok(Bookmark {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        content_id: row.get("content_id")?,
        note: row.get("note")?,
        created_at: row.get("created_at")?,
    })
}
