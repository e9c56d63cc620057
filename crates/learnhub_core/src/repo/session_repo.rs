//! Local session and known-user storage.
//!
//! # Invariants
//! - At most one active session (`session.slot = 1`).
//! - Saving a session upserts the user row used by leaderboard names.

use crate::model::user::{Session, User, UserRole};
use crate::repo::cache_repo::clear_cache_tables;
use crate::repo::{ensure_connection_ready, parse_enum, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

pub trait SessionRepository {
    fn save_session(&self, session: &Session) -> RepoResult<()>;
    fn current_session(&self) -> RepoResult<Option<Session>>;
    /// Drops the active session; with `purge_cache` also drops cached curriculum rows.
    fn clear_session(&self, purge_cache: bool) -> RepoResult<()>;
    fn upsert_user(&self, user: &User) -> RepoResult<()>;
}

#[derive(Clone, Copy)]
pub struct SqliteSessionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSessionRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl SessionRepository for SqliteSessionRepository<'_> {
    fn save_session(&self, session: &Session) -> RepoResult<()> {
        session.user.validate()?;
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        upsert_user_row(&tx, &session.user)?;
        tx.execute(
            "INSERT INTO session (slot, user_id, token, created_at) VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(slot) DO UPDATE SET
                user_id = excluded.user_id,
                token = excluded.token,
                created_at = excluded.created_at;",
            params![session.user.id, session.token, session.created_at],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn current_session(&self) -> RepoResult<Option<Session>> {
        let row = self
            .conn
            .query_row(
                "SELECT u.id, u.name, u.email, u.role, u.school, u.class_id, s.token, s.created_at
                 FROM session s
                 INNER JOIN users u ON u.id = s.user_id
                 WHERE s.slot = 1;",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, Option<String>>(5)?,
                        row.get::<_, String>(6)?,
                        row.get::<_, i64>(7)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, name, email, role, school, class_id, token, created_at)) = row else {
            return Ok(None);
        };
        Ok(Some(Session {
            user: User {
                id,
                name,
                email,
                role: parse_enum("users.role", &role, UserRole::parse)?,
                school,
                class_id,
            },
            token,
            created_at,
        }))
    }

    fn clear_session(&self, purge_cache: bool) -> RepoResult<()> {
        self.conn.execute("DELETE FROM session;", [])?;
        if purge_cache {
            clear_cache_tables(self.conn)?;
        }
        Ok(())
    }

    fn upsert_user(&self, user: &User) -> RepoResult<()> {
        user.validate()?;
        upsert_user_row(self.conn, user)
    }
}

fn upsert_user_row(conn: &Connection, user: &User) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO users (id, name, email, role, school, class_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            email = excluded.email,
            role = excluded.role,
            school = excluded.school,
            class_id = excluded.class_id;",
        params![
            user.id,
            user.name,
            user.email,
            user.role.as_str(),
            user.school,
            user.class_id
        ],
    )?;
    Ok(())
}
