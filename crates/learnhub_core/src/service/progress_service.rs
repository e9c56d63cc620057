//! Completion tracking use cases.
//!
//! # Responsibility
//! - Mark content complete and roll completion up to subtopic and topic.
//! - Summarize progress for a topic or a subject.
//! - Award lesson-related achievements.
//!
//! # Invariants
//! - Marking is idempotent; the first completion timestamp wins.
//! - Only learner-visible (published) content counts toward totals.
//! - A subtopic is complete when all its visible content is complete; a
//!   topic is complete when all its subtopics with visible content are.
//! - Draft and archived content cannot be marked complete.

use crate::clock::{Clock, SystemClock};
use crate::model::engagement::{Achievement, AchievementKind};
use crate::model::progress::{ProgressKind, ProgressRecord, ProgressSummary, ProgressTarget};
use crate::model::{require_id, ValidationError};
use crate::remote::RemoteError;
use crate::repo::bookmark_repo::AchievementRepository;
use crate::repo::cache_repo::{ContentRepository, FetchPolicy};
use crate::repo::progress_repo::ProgressRepository;
use crate::repo::RepoError;
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ProgressError {
    Validation(ValidationError),
    NotFound { entity: &'static str, id: String },
    Unavailable(RemoteError),
    Repo(RepoError),
}

impl Display for ProgressError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Unavailable(err) => write!(f, "progress unavailable offline: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProgressError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Unavailable(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound { .. } => None,
        }
    }
}

impl From<RepoError> for ProgressError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Remote(err) => Self::Unavailable(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ProgressError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Result of marking one content item complete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionOutcome {
    /// `false` when the item was already complete.
    pub newly_completed: bool,
    /// Subtopic that became complete with this call.
    pub completed_subtopic: Option<String>,
    /// Topic that became complete with this call.
    pub completed_topic: Option<String>,
    pub achievements: Vec<Achievement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtopicProgress {
    pub subtopic_id: String,
    pub summary: ProgressSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicProgress {
    pub topic_id: String,
    pub summary: ProgressSummary,
    pub percent: f64,
    pub subtopics: Vec<SubtopicProgress>,
}

pub struct ProgressService<P, C, A>
where
    P: ProgressRepository,
    C: ContentRepository,
    A: AchievementRepository,
{
    progress: P,
    content: C,
    achievements: A,
    clock: Box<dyn Clock>,
}

impl<P, C, A> ProgressService<P, C, A>
where
    P: ProgressRepository,
    C: ContentRepository,
    A: AchievementRepository,
{
    pub fn new(progress: P, content: C, achievements: A) -> Self {
        Self {
            progress,
            content,
            achievements,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Marks a cached content item complete and rolls completion upward.
    pub fn mark_content_completed(
        &self,
        user_id: &str,
        content_id: &str,
    ) -> Result<CompletionOutcome, ProgressError> {
        require_id("user_id", user_id)?;
        let content = self
            .content
            .find_content(content_id)?
            .filter(|item| item.is_visible_to_learners())
            .ok_or_else(|| ProgressError::NotFound {
                entity: "content",
                id: content_id.to_string(),
            })?;

        let now = self.clock.now_ms();
        let newly_completed =
            self.progress
                .mark_completed(user_id, &ProgressTarget::content(&content.id), now)?;

        let mut outcome = CompletionOutcome {
            newly_completed,
            completed_subtopic: None,
            completed_topic: None,
            achievements: Vec::new(),
        };
        if newly_completed {
            self.award(user_id, AchievementKind::FirstLesson, now, &mut outcome)?;
        }

        let subtopic_summary = self.subtopic_summary(user_id, &content.subtopic_id)?;
        if !subtopic_summary.is_complete() {
            return Ok(outcome);
        }
        if self.progress.mark_completed(
            user_id,
            &ProgressTarget::subtopic(&content.subtopic_id),
            now,
        )? {
            outcome.completed_subtopic = Some(content.subtopic_id.clone());
        }

        let Some(subtopic) = self.content.find_subtopic(&content.subtopic_id)? else {
            return Ok(outcome);
        };
        if self.topic_complete(user_id, &subtopic.topic_id)? {
            if self.progress.mark_completed(
                user_id,
                &ProgressTarget::topic(&subtopic.topic_id),
                now,
            )? {
                outcome.completed_topic = Some(subtopic.topic_id.clone());
                self.award(user_id, AchievementKind::TopicMaster, now, &mut outcome)?;
            }
        }

        info!(
            "event=progress_mark module=progress status=ok newly={} subtopic_done={} topic_done={}",
            outcome.newly_completed,
            outcome.completed_subtopic.is_some(),
            outcome.completed_topic.is_some()
        );
        Ok(outcome)
    }

    pub fn is_completed(
        &self,
        user_id: &str,
        target: &ProgressTarget,
    ) -> Result<bool, ProgressError> {
        Ok(self.progress.is_completed(user_id, target)?)
    }

    /// Content completion for one topic, broken down by subtopic.
    pub fn topic_progress(
        &self,
        user_id: &str,
        topic_id: &str,
    ) -> Result<TopicProgress, ProgressError> {
        require_id("user_id", user_id)?;
        require_id("topic_id", topic_id)?;

        let mut total = ProgressSummary {
            completed: 0,
            total: 0,
        };
        let mut subtopics = Vec::new();
        for subtopic_id in self.subtopic_ids(topic_id)? {
            let summary = self.subtopic_summary(user_id, &subtopic_id)?;
            total.completed += summary.completed;
            total.total += summary.total;
            subtopics.push(SubtopicProgress {
                subtopic_id,
                summary,
            });
        }

        Ok(TopicProgress {
            topic_id: topic_id.to_string(),
            summary: total,
            percent: total.percent(),
            subtopics,
        })
    }

    /// Content completion summed over all topics of a subject.
    pub fn subject_progress(
        &self,
        user_id: &str,
        subject_id: &str,
    ) -> Result<ProgressSummary, ProgressError> {
        require_id("subject_id", subject_id)?;
        let topics = self.content.topics(subject_id, FetchPolicy::CacheFirst)?.value;
        let mut summary = ProgressSummary {
            completed: 0,
            total: 0,
        };
        for topic in topics {
            let topic_summary = self.topic_progress(user_id, &topic.id)?.summary;
            summary.completed += topic_summary.completed;
            summary.total += topic_summary.total;
        }
        Ok(summary)
    }

    pub fn history(&self, user_id: &str) -> Result<Vec<ProgressRecord>, ProgressError> {
        Ok(self.progress.list_for_user(user_id)?)
    }

    /// Clears all completion markers of a user. Achievements are kept.
    pub fn reset_progress(&self, user_id: &str) -> Result<usize, ProgressError> {
        require_id("user_id", user_id)?;
        let removed = self.progress.reset(user_id)?;
        info!("event=progress_reset module=progress status=ok removed={removed}");
        Ok(removed)
    }

    fn subtopic_ids(&self, topic_id: &str) -> Result<Vec<String>, ProgressError> {
        Ok(self
            .content
            .subtopics(topic_id, FetchPolicy::CacheFirst)?
            .value
            .into_iter()
            .map(|subtopic| subtopic.id)
            .collect())
    }

    /// A topic is complete once every subtopic with published content is.
    /// Subtopics without published content do not hold the topic back.
    fn topic_complete(&self, user_id: &str, topic_id: &str) -> Result<bool, ProgressError> {
        let mut counted = 0usize;
        for subtopic_id in self.subtopic_ids(topic_id)? {
            let summary = self.subtopic_summary(user_id, &subtopic_id)?;
            if summary.total == 0 {
                continue;
            }
            if !summary.is_complete() {
                return Ok(false);
            }
            counted += 1;
        }
        Ok(counted > 0)
    }

    fn subtopic_summary(
        &self,
        user_id: &str,
        subtopic_id: &str,
    ) -> Result<ProgressSummary, ProgressError> {
        let content_ids: Vec<String> = self
            .content
            .contents(subtopic_id, FetchPolicy::CacheFirst)?
            .value
            .into_iter()
            .filter(|item| item.is_visible_to_learners())
            .map(|item| item.id)
            .collect();
        let done = self
            .progress
            .completed_among(user_id, ProgressKind::Content, &content_ids)?;
        Ok(ProgressSummary {
            completed: u32::try_from(done.len()).unwrap_or(u32::MAX),
            total: u32::try_from(content_ids.len()).unwrap_or(u32::MAX),
        })
    }

    fn award(
        &self,
        user_id: &str,
        kind: AchievementKind,
        now: i64,
        outcome: &mut CompletionOutcome,
    ) -> Result<(), ProgressError> {
        if let Some(achievement) = self.achievements.award(user_id, kind, now)? {
            info!("event=achievement_award module=progress status=ok kind={kind}");
            outcome.achievements.push(achievement);
        }
        Ok(())
    }
}
