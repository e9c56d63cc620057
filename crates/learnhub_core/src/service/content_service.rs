//! Curriculum browsing and authoring use cases.
//!
//! # Invariants
//! - Learners (students or anonymous viewers) only see `Published` content.
//! - Authoring requires a `Teacher` or `Admin` viewer.

use crate::model::curriculum::{
    ClassLevel, Content, HierarchyLevel, HierarchyNode, Subject, Subtopic, Topic,
};
use crate::model::user::UserRole;
use crate::model::{require_id, ValidationError};
use crate::remote::RemoteError;
use crate::repo::cache_repo::{Cached, ContentRepository, FetchPolicy};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ContentError {
    Validation(ValidationError),
    NotFound { entity: &'static str, id: String },
    /// Viewer role may not perform the operation.
    Forbidden,
    /// Remote failed and nothing is cached for the requested list.
    Unavailable(RemoteError),
    Repo(RepoError),
}

impl Display for ContentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Forbidden => write!(f, "only teachers and admins can edit content"),
            Self::Unavailable(err) => write!(f, "content unavailable offline: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ContentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Unavailable(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound { .. } | Self::Forbidden => None,
        }
    }
}

impl From<RepoError> for ContentError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Remote(err) => Self::Unavailable(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ContentError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

pub struct ContentService<R: ContentRepository> {
    repo: R,
    viewer_role: Option<UserRole>,
}

impl<R: ContentRepository> ContentService<R> {
    /// Creates a service for an anonymous (learner-level) viewer.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            viewer_role: None,
        }
    }

    pub fn with_viewer(mut self, role: Option<UserRole>) -> Self {
        self.viewer_role = role;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn list_classes(&self, policy: FetchPolicy) -> Result<Cached<Vec<ClassLevel>>, ContentError> {
        Ok(self.repo.classes(policy)?)
    }

    pub fn list_subjects(
        &self,
        class_id: &str,
        policy: FetchPolicy,
    ) -> Result<Cached<Vec<Subject>>, ContentError> {
        require_id("class_id", class_id)?;
        Ok(self.repo.subjects(class_id, policy)?)
    }

    pub fn list_topics(
        &self,
        subject_id: &str,
        policy: FetchPolicy,
    ) -> Result<Cached<Vec<Topic>>, ContentError> {
        require_id("subject_id", subject_id)?;
        Ok(self.repo.topics(subject_id, policy)?)
    }

    pub fn list_subtopics(
        &self,
        topic_id: &str,
        policy: FetchPolicy,
    ) -> Result<Cached<Vec<Subtopic>>, ContentError> {
        require_id("topic_id", topic_id)?;
        Ok(self.repo.subtopics(topic_id, policy)?)
    }

    /// Lists a subtopic's content, hiding unpublished items from learners.
    pub fn list_contents(
        &self,
        subtopic_id: &str,
        policy: FetchPolicy,
    ) -> Result<Cached<Vec<Content>>, ContentError> {
        require_id("subtopic_id", subtopic_id)?;
        let can_see_drafts = self.can_author();
        Ok(self.repo.contents(subtopic_id, policy)?.map(|items| {
            items
                .into_iter()
                .filter(|item| can_see_drafts || item.is_visible_to_learners())
                .collect()
        }))
    }

    /// Looks up one cached content item.
    pub fn content_detail(&self, content_id: &str) -> Result<Content, ContentError> {
        require_id("content_id", content_id)?;
        self.repo
            .find_content(content_id)?
            .filter(|item| self.can_author() || item.is_visible_to_learners())
            .ok_or_else(|| ContentError::NotFound {
                entity: "content",
                id: content_id.to_string(),
            })
    }

    pub fn create_node(&self, node: &HierarchyNode) -> Result<HierarchyNode, ContentError> {
        self.require_author()?;
        Ok(self.repo.create_node(node)?)
    }

    pub fn update_node(&self, node: &HierarchyNode) -> Result<HierarchyNode, ContentError> {
        self.require_author()?;
        Ok(self.repo.update_node(node)?)
    }

    pub fn delete_node(&self, level: HierarchyLevel, id: &str) -> Result<(), ContentError> {
        self.require_author()?;
        require_id("id", id)?;
        Ok(self.repo.delete_node(level, id)?)
    }

    fn can_author(&self) -> bool {
        self.viewer_role.is_some_and(UserRole::can_author)
    }

    fn require_author(&self) -> Result<(), ContentError> {
        if self.can_author() {
            Ok(())
        } else {
            Err(ContentError::Forbidden)
        }
    }
}
