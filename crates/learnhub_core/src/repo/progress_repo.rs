//! Progress (completion marker) repository.
//!
//! # Invariants
//! - At most one marker per `(user, kind, target)`; re-marking keeps the
//!   first completion timestamp.

use crate::model::progress::{ProgressKind, ProgressRecord, ProgressTarget};
use crate::model::require_id;
use crate::repo::{ensure_connection_ready, parse_enum, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::collections::HashSet;

pub trait ProgressRepository {
    /// Records completion; returns `true` when the marker is new.
    fn mark_completed(
        &self,
        user_id: &str,
        target: &ProgressTarget,
        completed_at: i64,
    ) -> RepoResult<bool>;
    fn is_completed(&self, user_id: &str, target: &ProgressTarget) -> RepoResult<bool>;
    /// Returns the subset of `ids` completed by the user at `kind` level.
    fn completed_among(
        &self,
        user_id: &str,
        kind: ProgressKind,
        ids: &[String],
    ) -> RepoResult<HashSet<String>>;
    fn count_completed(&self, user_id: &str, kind: ProgressKind) -> RepoResult<u32>;
    /// All markers for a user, newest first.
    fn list_for_user(&self, user_id: &str) -> RepoResult<Vec<ProgressRecord>>;
    /// Removes all markers of a user; returns the number removed.
    fn reset(&self, user_id: &str) -> RepoResult<usize>;
}

#[derive(Clone, Copy)]
pub struct SqliteProgressRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProgressRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ProgressRepository for SqliteProgressRepository<'_> {
    fn mark_completed(
        &self,
        user_id: &str,
        target: &ProgressTarget,
        completed_at: i64,
    ) -> RepoResult<bool> {
        require_id("progress.user_id", user_id)?;
        require_id("progress.target_id", &target.id)?;
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO progress (user_id, target_kind, target_id, completed_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![user_id, target.kind.as_str(), target.id, completed_at],
        )?;
        Ok(inserted > 0)
    }

    fn is_completed(&self, user_id: &str, target: &ProgressTarget) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM progress
                WHERE user_id = ?1 AND target_kind = ?2 AND target_id = ?3
            );",
            params![user_id, target.kind.as_str(), target.id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn completed_among(
        &self,
        user_id: &str,
        kind: ProgressKind,
        ids: &[String],
    ) -> RepoResult<HashSet<String>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT target_id FROM progress
             WHERE user_id = ? AND target_kind = ? AND target_id IN ({placeholders});"
        );
        let mut bind_values = vec![
            Value::Text(user_id.to_string()),
            Value::Text(kind.as_str().to_string()),
        ];
        bind_values.extend(ids.iter().map(|id| Value::Text(id.clone())));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut completed = HashSet::new();
        while let Some(row) = rows.next()? {
            completed.insert(row.get::<_, String>(0)?);
        }
        Ok(completed)
    }

    fn count_completed(&self, user_id: &str, kind: ProgressKind) -> RepoResult<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM progress WHERE user_id = ?1 AND target_kind = ?2;",
            params![user_id, kind.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn list_for_user(&self, user_id: &str) -> RepoResult<Vec<ProgressRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, target_kind, target_id, completed_at
             FROM progress
             WHERE user_id = ?1
             ORDER BY completed_at DESC, target_kind ASC, target_id ASC;",
        )?;
        let mut rows = stmt.query([user_id])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let kind: String = row.get("target_kind")?;
            records.push(ProgressRecord {
                user_id: row.get("user_id")?,
                target: ProgressTarget {
                    kind: parse_enum("progress.target_kind", &kind, ProgressKind::parse)?,
                    id: row.get("target_id")?,
                },
                completed_at: row.get("completed_at")?,
            });
        }
        Ok(records)
    }

    fn reset(&self, user_id: &str) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM progress WHERE user_id = ?1;", [user_id])?;
        Ok(removed)
    }
}
