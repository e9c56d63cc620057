//! Read-through cache over the remote curriculum hierarchy.
//!
//! # Responsibility
//! - Serve the five hierarchy lists (classes, subjects, topics, subtopics,
//!   contents) from SQLite while fresh, refetching from the remote once stale.
//! - Route content authoring writes to the remote and invalidate local scopes.
//!
//! # Invariants
//! - A scope is "present" when it has a `cache_meta` row; an empty list
//!   fetched from the remote is a valid cached value.
//! - Replacing a scope deletes every row under its parent and inserts the
//!   fetched rows in one transaction, together with the `cache_meta` update.
//! - A failed fetch falls back to the stale rows when the scope is present,
//!   otherwise the remote error propagates.
//! - Fetched rows must belong to the requested parent; a mismatch is treated
//!   as an undecodable response.

use crate::clock::{Clock, SystemClock};
use crate::model::curriculum::{
    ClassLevel, Content, ContentKind, ContentStatus, Curriculum, HierarchyLevel, HierarchyNode,
    Subject, Subtopic, Topic,
};
use crate::model::ValidationError;
use crate::remote::{ContentRemote, RemoteError, RemoteResult};
use crate::repo::{ensure_connection_ready, parse_enum, RepoError, RepoResult};
use log::{debug, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use serde::Serialize;
use std::time::{Duration, Instant};

const CACHE_TABLES: &[&str] = &["contents", "subtopics", "topics", "subjects", "classes"];

/// Where a list result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheOrigin {
    /// Just fetched from the remote and written to the local store.
    Fresh,
    /// Served from the local store within the TTL.
    Cached,
    /// Served from the local store after a failed refresh.
    Stale,
}

/// A list result tagged with its origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cached<T> {
    pub value: T,
    pub origin: CacheOrigin,
}

impl<T> Cached<T> {
    pub fn is_stale(&self) -> bool {
        self.origin == CacheOrigin::Stale
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Cached<U> {
        Cached {
            value: f(self.value),
            origin: self.origin,
        }
    }
}

/// Whether a read may be answered from a fresh local copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    #[default]
    CacheFirst,
    /// Always go to the remote first; still falls back to stale rows on failure.
    Refresh,
}

/// Cache key of one hierarchy list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheScope {
    Classes,
    Subjects(String),
    Topics(String),
    Subtopics(String),
    Contents(String),
}

impl CacheScope {
    pub fn key(&self) -> String {
        match self {
            Self::Classes => "classes".to_string(),
            Self::Subjects(class_id) => format!("subjects:{class_id}"),
            Self::Topics(subject_id) => format!("topics:{subject_id}"),
            Self::Subtopics(topic_id) => format!("subtopics:{topic_id}"),
            Self::Contents(subtopic_id) => format!("contents:{subtopic_id}"),
        }
    }

    fn parent_id(&self) -> Option<&str> {
        match self {
            Self::Classes => None,
            Self::Subjects(id) | Self::Topics(id) | Self::Subtopics(id) | Self::Contents(id) => {
                Some(id)
            }
        }
    }

    /// Scope listing nodes of `level` under `parent_id`.
    pub fn containing(level: HierarchyLevel, parent_id: Option<&str>) -> Option<Self> {
        match (level, parent_id) {
            (HierarchyLevel::Class, _) => Some(Self::Classes),
            (HierarchyLevel::Subject, Some(id)) => Some(Self::Subjects(id.to_string())),
            (HierarchyLevel::Topic, Some(id)) => Some(Self::Topics(id.to_string())),
            (HierarchyLevel::Subtopic, Some(id)) => Some(Self::Subtopics(id.to_string())),
            (HierarchyLevel::Content, Some(id)) => Some(Self::Contents(id.to_string())),
            (_, None) => None,
        }
    }

    /// Scope listing the children of node `id` at `level`.
    pub fn children_of(level: HierarchyLevel, id: &str) -> Option<Self> {
        match level {
            HierarchyLevel::Class => Some(Self::Subjects(id.to_string())),
            HierarchyLevel::Subject => Some(Self::Topics(id.to_string())),
            HierarchyLevel::Topic => Some(Self::Subtopics(id.to_string())),
            HierarchyLevel::Subtopic => Some(Self::Contents(id.to_string())),
            HierarchyLevel::Content => None,
        }
    }
}

/// Curriculum access used by content and progress use cases.
pub trait ContentRepository {
    fn classes(&self, policy: FetchPolicy) -> RepoResult<Cached<Vec<ClassLevel>>>;
    fn subjects(&self, class_id: &str, policy: FetchPolicy) -> RepoResult<Cached<Vec<Subject>>>;
    fn topics(&self, subject_id: &str, policy: FetchPolicy) -> RepoResult<Cached<Vec<Topic>>>;
    fn subtopics(&self, topic_id: &str, policy: FetchPolicy)
        -> RepoResult<Cached<Vec<Subtopic>>>;
    fn contents(&self, subtopic_id: &str, policy: FetchPolicy)
        -> RepoResult<Cached<Vec<Content>>>;

    /// Local lookups; never reach the remote.
    fn find_topic(&self, id: &str) -> RepoResult<Option<Topic>>;
    fn find_subtopic(&self, id: &str) -> RepoResult<Option<Subtopic>>;
    fn find_content(&self, id: &str) -> RepoResult<Option<Content>>;

    fn create_node(&self, node: &HierarchyNode) -> RepoResult<HierarchyNode>;
    fn update_node(&self, node: &HierarchyNode) -> RepoResult<HierarchyNode>;
    fn delete_node(&self, level: HierarchyLevel, id: &str) -> RepoResult<()>;

    /// Marks a scope stale; rows are kept as fallback.
    fn invalidate(&self, scope: &CacheScope) -> RepoResult<()>;
    /// Drops every cached row and freshness marker.
    fn clear_all(&self) -> RepoResult<()>;
}

/// Table mapping for one cached hierarchy level.
trait CacheRow: Sized {
    const TABLE: &'static str;
    const PARENT_COLUMN: Option<&'static str>;
    const COLUMNS: &'static str;
    const ORDER_BY: &'static str;

    fn parent_id(&self) -> Option<&str>;
    fn validate(&self) -> Result<(), ValidationError>;
    fn insert(&self, conn: &Connection) -> rusqlite::Result<()>;
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;
}

impl CacheRow for ClassLevel {
    const TABLE: &'static str = "classes";
    const PARENT_COLUMN: Option<&'static str> = None;
    const COLUMNS: &'static str = "id, name, curriculum, description, sort_order";
    const ORDER_BY: &'static str = "sort_order ASC, id ASC";

    fn parent_id(&self) -> Option<&str> {
        None
    }

    fn validate(&self) -> Result<(), ValidationError> {
        ClassLevel::validate(self)
    }

    fn insert(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO classes (id, name, curriculum, description, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                self.id,
                self.name,
                self.curriculum.as_str(),
                self.description,
                self.order
            ],
        )?;
        Ok(())
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let curriculum: String = row.get("curriculum")?;
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            curriculum: parse_enum("classes.curriculum", &curriculum, Curriculum::parse)?,
            description: row.get("description")?,
            order: row.get("sort_order")?,
        })
    }
}

impl CacheRow for Subject {
    const TABLE: &'static str = "subjects";
    const PARENT_COLUMN: Option<&'static str> = Some("class_id");
    const COLUMNS: &'static str = "id, class_id, name, description, icon";
    const ORDER_BY: &'static str = "name COLLATE NOCASE ASC, id ASC";

    fn parent_id(&self) -> Option<&str> {
        Some(&self.class_id)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Subject::validate(self)
    }

    fn insert(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO subjects (id, class_id, name, description, icon)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                self.id,
                self.class_id,
                self.name,
                self.description,
                self.icon
            ],
        )?;
        Ok(())
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            class_id: row.get("class_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            icon: row.get("icon")?,
        })
    }
}

impl CacheRow for Topic {
    const TABLE: &'static str = "topics";
    const PARENT_COLUMN: Option<&'static str> = Some("subject_id");
    const COLUMNS: &'static str = "id, subject_id, name, description, sort_order";
    const ORDER_BY: &'static str = "sort_order ASC, id ASC";

    fn parent_id(&self) -> Option<&str> {
        Some(&self.subject_id)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Topic::validate(self)
    }

    fn insert(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO topics (id, subject_id, name, description, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                self.id,
                self.subject_id,
                self.name,
                self.description,
                self.order
            ],
        )?;
        Ok(())
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            subject_id: row.get("subject_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            order: row.get("sort_order")?,
        })
    }
}

impl CacheRow for Subtopic {
    const TABLE: &'static str = "subtopics";
    const PARENT_COLUMN: Option<&'static str> = Some("topic_id");
    const COLUMNS: &'static str = "id, topic_id, name, description, sort_order";
    const ORDER_BY: &'static str = "sort_order ASC, id ASC";

    fn parent_id(&self) -> Option<&str> {
        Some(&self.topic_id)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Subtopic::validate(self)
    }

    fn insert(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO subtopics (id, topic_id, name, description, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                self.id,
                self.topic_id,
                self.name,
                self.description,
                self.order
            ],
        )?;
        Ok(())
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            topic_id: row.get("topic_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            order: row.get("sort_order")?,
        })
    }
}

impl CacheRow for Content {
    const TABLE: &'static str = "contents";
    const PARENT_COLUMN: Option<&'static str> = Some("subtopic_id");
    const COLUMNS: &'static str =
        "id, subtopic_id, title, kind, body, media_url, duration_minutes, status, sort_order";
    const ORDER_BY: &'static str = "sort_order ASC, id ASC";

    fn parent_id(&self) -> Option<&str> {
        Some(&self.subtopic_id)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Content::validate(self)
    }

    fn insert(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO contents (
                id, subtopic_id, title, kind, body, media_url, duration_minutes, status, sort_order
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                self.id,
                self.subtopic_id,
                self.title,
                self.kind.as_str(),
                self.body,
                self.media_url,
                self.duration_minutes,
                self.status.as_str(),
                self.order
            ],
        )?;
        Ok(())
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let kind: String = row.get("kind")?;
        let status: String = row.get("status")?;
        Ok(Self {
            id: row.get("id")?,
            subtopic_id: row.get("subtopic_id")?,
            title: row.get("title")?,
            kind: parse_enum("contents.kind", &kind, ContentKind::parse)?,
            body: row.get("body")?,
            media_url: row.get("media_url")?,
            duration_minutes: row.get("duration_minutes")?,
            status: parse_enum("contents.status", &status, ContentStatus::parse)?,
            order: row.get("sort_order")?,
        })
    }
}

/// SQLite-backed read-through cache in front of a [`ContentRemote`].
pub struct CachedContentRepository<'conn, R: ContentRemote> {
    conn: &'conn Connection,
    remote: R,
    ttl_ms: i64,
    clock: Box<dyn Clock>,
}

impl<'conn, R: ContentRemote> CachedContentRepository<'conn, R> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection, remote: R, ttl: Duration) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self {
            conn,
            remote,
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
            clock: Box::new(SystemClock),
        })
    }

    /// Replaces the wall clock used for staleness checks.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    fn read_through<T: CacheRow>(
        &self,
        scope: CacheScope,
        policy: FetchPolicy,
        fetch: impl FnOnce(&R) -> RemoteResult<Vec<T>>,
    ) -> RepoResult<Cached<Vec<T>>> {
        let scope_key = scope.key();
        let parent = scope.parent_id();
        let now = self.clock.now_ms();
        let meta = self.scope_meta(&scope_key)?;

        if policy == FetchPolicy::CacheFirst {
            if let Some((fetched_at, false)) = meta {
                if now.saturating_sub(fetched_at) < self.ttl_ms {
                    let value = load_rows::<T>(self.conn, parent)?;
                    debug!(
                        "event=cache_read module=cache status=hit scope={scope_key} rows={}",
                        value.len()
                    );
                    return Ok(Cached {
                        value,
                        origin: CacheOrigin::Cached,
                    });
                }
            }
        }

        let started_at = Instant::now();
        let fetched = fetch(&self.remote).and_then(|items| check_fetched(parent, items));
        match fetched {
            Ok(items) => {
                self.replace_scope(&scope_key, parent, &items, now)?;
                info!(
                    "event=cache_refresh module=cache status=ok scope={scope_key} rows={} duration_ms={}",
                    items.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(Cached {
                    value: load_rows::<T>(self.conn, parent)?,
                    origin: CacheOrigin::Fresh,
                })
            }
            Err(err) if meta.is_some() => {
                warn!(
                    "event=cache_refresh module=cache status=stale_fallback scope={scope_key} error={err}"
                );
                Ok(Cached {
                    value: load_rows::<T>(self.conn, parent)?,
                    origin: CacheOrigin::Stale,
                })
            }
            Err(err) => {
                warn!(
                    "event=cache_refresh module=cache status=error scope={scope_key} error={err}"
                );
                Err(RepoError::Remote(err))
            }
        }
    }

    fn scope_meta(&self, scope_key: &str) -> RepoResult<Option<(i64, bool)>> {
        let meta = self
            .conn
            .query_row(
                "SELECT fetched_at, invalidated FROM cache_meta WHERE scope = ?1;",
                [scope_key],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)? != 0)),
            )
            .optional()?;
        Ok(meta)
    }

    fn replace_scope<T: CacheRow>(
        &self,
        scope_key: &str,
        parent: Option<&str>,
        items: &[T],
        fetched_at: i64,
    ) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        match (T::PARENT_COLUMN, parent) {
            (Some(column), Some(parent_id)) => {
                tx.execute(
                    &format!("DELETE FROM {} WHERE {column} = ?1;", T::TABLE),
                    [parent_id],
                )?;
            }
            _ => {
                tx.execute(&format!("DELETE FROM {};", T::TABLE), [])?;
            }
        }
        for item in items {
            item.insert(&tx)?;
        }
        tx.execute(
            "INSERT INTO cache_meta (scope, fetched_at, invalidated) VALUES (?1, ?2, 0)
             ON CONFLICT(scope) DO UPDATE SET fetched_at = excluded.fetched_at, invalidated = 0;",
            params![scope_key, fetched_at],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn find_row<T: CacheRow>(&self, id: &str) -> RepoResult<Option<T>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM {} WHERE id = ?1;",
            T::COLUMNS,
            T::TABLE
        ))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(T::from_row(row)?)),
            None => Ok(None),
        }
    }

    fn local_parent_id(&self, level: HierarchyLevel, id: &str) -> RepoResult<Option<String>> {
        let parent = match level {
            HierarchyLevel::Class => None,
            HierarchyLevel::Subject => self.find_row::<Subject>(id)?.map(|row| row.class_id),
            HierarchyLevel::Topic => self.find_row::<Topic>(id)?.map(|row| row.subject_id),
            HierarchyLevel::Subtopic => self.find_row::<Subtopic>(id)?.map(|row| row.topic_id),
            HierarchyLevel::Content => self.find_row::<Content>(id)?.map(|row| row.subtopic_id),
        };
        Ok(parent)
    }
}

impl<R: ContentRemote> ContentRepository for CachedContentRepository<'_, R> {
    fn classes(&self, policy: FetchPolicy) -> RepoResult<Cached<Vec<ClassLevel>>> {
        self.read_through(CacheScope::Classes, policy, |remote| remote.fetch_classes())
    }

    fn subjects(&self, class_id: &str, policy: FetchPolicy) -> RepoResult<Cached<Vec<Subject>>> {
        self.read_through(CacheScope::Subjects(class_id.to_string()), policy, |remote| {
            remote.fetch_subjects(class_id)
        })
    }

    fn topics(&self, subject_id: &str, policy: FetchPolicy) -> RepoResult<Cached<Vec<Topic>>> {
        self.read_through(CacheScope::Topics(subject_id.to_string()), policy, |remote| {
            remote.fetch_topics(subject_id)
        })
    }

    fn subtopics(
        &self,
        topic_id: &str,
        policy: FetchPolicy,
    ) -> RepoResult<Cached<Vec<Subtopic>>> {
        self.read_through(CacheScope::Subtopics(topic_id.to_string()), policy, |remote| {
            remote.fetch_subtopics(topic_id)
        })
    }

    fn contents(
        &self,
        subtopic_id: &str,
        policy: FetchPolicy,
    ) -> RepoResult<Cached<Vec<Content>>> {
        self.read_through(
            CacheScope::Contents(subtopic_id.to_string()),
            policy,
            |remote| remote.fetch_contents(subtopic_id),
        )
    }

    fn find_topic(&self, id: &str) -> RepoResult<Option<Topic>> {
        self.find_row(id)
    }

    fn find_subtopic(&self, id: &str) -> RepoResult<Option<Subtopic>> {
        self.find_row(id)
    }

    fn find_content(&self, id: &str) -> RepoResult<Option<Content>> {
        self.find_row(id)
    }

    fn create_node(&self, node: &HierarchyNode) -> RepoResult<HierarchyNode> {
        node.validate()?;
        let stored = self.remote.create_node(node)?;
        if let Some(scope) = CacheScope::containing(stored.level(), stored.parent_id()) {
            self.invalidate(&scope)?;
        }
        info!(
            "event=content_write module=cache status=ok op=create level={} id={}",
            stored.level(),
            stored.id()
        );
        Ok(stored)
    }

    fn update_node(&self, node: &HierarchyNode) -> RepoResult<HierarchyNode> {
        node.validate()?;
        let previous_parent = self.local_parent_id(node.level(), node.id())?;
        let stored = self.remote.update_node(node).map_err(|err| {
            if err.is_not_found() {
                RepoError::not_found(node.level().as_str(), node.id())
            } else {
                RepoError::Remote(err)
            }
        })?;

        if let Some(scope) = CacheScope::containing(stored.level(), stored.parent_id()) {
            self.invalidate(&scope)?;
        }
        if let Some(parent) = previous_parent.as_deref() {
            if Some(parent) != stored.parent_id() {
                if let Some(scope) = CacheScope::containing(stored.level(), Some(parent)) {
                    self.invalidate(&scope)?;
                }
            }
        }
        info!(
            "event=content_write module=cache status=ok op=update level={} id={}",
            stored.level(),
            stored.id()
        );
        Ok(stored)
    }

    fn delete_node(&self, level: HierarchyLevel, id: &str) -> RepoResult<()> {
        let parent = self.local_parent_id(level, id)?;
        self.remote.delete_node(level, id).map_err(|err| {
            if err.is_not_found() {
                RepoError::not_found(level.as_str(), id)
            } else {
                RepoError::Remote(err)
            }
        })?;

        self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", level.collection()),
            [id],
        )?;
        if let Some(scope) = CacheScope::containing(level, parent.as_deref()) {
            self.invalidate(&scope)?;
        }
        if let Some(scope) = CacheScope::children_of(level, id) {
            self.invalidate(&scope)?;
        }
        info!("event=content_write module=cache status=ok op=delete level={level} id={id}");
        Ok(())
    }

    fn invalidate(&self, scope: &CacheScope) -> RepoResult<()> {
        self.conn.execute(
            "UPDATE cache_meta SET invalidated = 1 WHERE scope = ?1;",
            [scope.key()],
        )?;
        Ok(())
    }

    fn clear_all(&self) -> RepoResult<()> {
        clear_cache_tables(self.conn)
    }
}

/// Deletes every cached hierarchy row and freshness marker.
pub fn clear_cache_tables(conn: &Connection) -> RepoResult<()> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    for table in CACHE_TABLES {
        tx.execute(&format!("DELETE FROM {table};"), [])?;
    }
    tx.execute("DELETE FROM cache_meta;", [])?;
    tx.commit()?;
    info!("event=cache_clear module=cache status=ok");
    Ok(())
}

fn load_rows<T: CacheRow>(conn: &Connection, parent: Option<&str>) -> RepoResult<Vec<T>> {
    let mut items = Vec::new();
    match (T::PARENT_COLUMN, parent) {
        (Some(column), Some(parent_id)) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM {} WHERE {column} = ?1 ORDER BY {};",
                T::COLUMNS,
                T::TABLE,
                T::ORDER_BY
            ))?;
            let mut rows = stmt.query([parent_id])?;
            while let Some(row) = rows.next()? {
                items.push(T::from_row(row)?);
            }
        }
        _ => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM {} ORDER BY {};",
                T::COLUMNS,
                T::TABLE,
                T::ORDER_BY
            ))?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                items.push(T::from_row(row)?);
            }
        }
    }
    Ok(items)
}

fn check_fetched<T: CacheRow>(parent: Option<&str>, items: Vec<T>) -> RemoteResult<Vec<T>> {
    for item in &items {
        item.validate().map_err(|err| {
            RemoteError::Decode(format!("invalid {} record: {err}", T::TABLE))
        })?;
        if item.parent_id() != parent {
            return Err(RemoteError::Decode(format!(
                "{} record belongs to `{}`, expected `{}`",
                T::TABLE,
                item.parent_id().unwrap_or_default(),
                parent.unwrap_or_default()
            )));
        }
    }
    Ok(items)
}
