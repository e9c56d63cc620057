//! Curriculum hierarchy records.
//!
//! # Responsibility
//! - Define the four-level containment tree
//!   `ClassLevel -> Subject -> Topic -> Subtopic -> Content`.
//!
//! # Invariants
//! - Child records reference their parent by id only.
//! - Sibling order is carried by `order` and is ascending in list results.

use super::{require_id, require_text, string_enum, ValidationError};
use serde::{Deserialize, Serialize};

/// National curriculum a class level belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Curriculum {
    /// Competency Based Curriculum.
    Cbc,
    /// Legacy 8-4-4 system.
    EightFourFour,
}

string_enum!(Curriculum {
    Cbc => "cbc",
    EightFourFour => "eight_four_four",
});

/// Publication state of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    Draft,
    Published,
    Archived,
}

string_enum!(ContentStatus {
    Draft => "draft",
    Published => "published",
    Archived => "archived",
});

/// Media kind of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    Video,
    Pdf,
    Image,
    Audio,
}

string_enum!(ContentKind {
    Text => "text",
    Video => "video",
    Pdf => "pdf",
    Image => "image",
    Audio => "audio",
});

/// A grade or form, e.g. "Grade 4" or "Form 2".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassLevel {
    pub id: String,
    pub name: String,
    pub curriculum: Curriculum,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub class_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Optional icon asset name resolved by the UI.
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub subject_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtopic {
    pub id: String,
    pub topic_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: i64,
}

/// Leaf learning item rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub id: String,
    pub subtopic_id: String,
    pub title: String,
    pub kind: ContentKind,
    /// Markdown body for text items, caption/summary for media items.
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    pub status: ContentStatus,
    #[serde(default)]
    pub order: i64,
}

impl ClassLevel {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("class.id", &self.id)?;
        require_text("class.name", &self.name)
    }
}

impl Subject {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("subject.id", &self.id)?;
        require_id("subject.class_id", &self.class_id)?;
        require_text("subject.name", &self.name)
    }
}

impl Topic {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("topic.id", &self.id)?;
        require_id("topic.subject_id", &self.subject_id)?;
        require_text("topic.name", &self.name)
    }
}

impl Subtopic {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("subtopic.id", &self.id)?;
        require_id("subtopic.topic_id", &self.topic_id)?;
        require_text("subtopic.name", &self.name)
    }
}

impl Content {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("content.id", &self.id)?;
        require_id("content.subtopic_id", &self.subtopic_id)?;
        require_text("content.title", &self.title)?;
        if self.kind != ContentKind::Text && self.media_url.as_deref().map_or(true, str::is_empty)
        {
            return Err(ValidationError::BlankField("content.media_url"));
        }
        Ok(())
    }

    /// Returns whether learners may see this item.
    pub fn is_visible_to_learners(&self) -> bool {
        self.status == ContentStatus::Published
    }
}

/// One node of the hierarchy, used by write paths that are generic over level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum HierarchyNode {
    Class(ClassLevel),
    Subject(Subject),
    Topic(Topic),
    Subtopic(Subtopic),
    Content(Content),
}

impl HierarchyNode {
    pub fn id(&self) -> &str {
        match self {
            Self::Class(value) => &value.id,
            Self::Subject(value) => &value.id,
            Self::Topic(value) => &value.id,
            Self::Subtopic(value) => &value.id,
            Self::Content(value) => &value.id,
        }
    }

    pub fn level(&self) -> HierarchyLevel {
        match self {
            Self::Class(_) => HierarchyLevel::Class,
            Self::Subject(_) => HierarchyLevel::Subject,
            Self::Topic(_) => HierarchyLevel::Topic,
            Self::Subtopic(_) => HierarchyLevel::Subtopic,
            Self::Content(_) => HierarchyLevel::Content,
        }
    }

    /// Parent id, `None` for class levels which sit at the root.
    pub fn parent_id(&self) -> Option<&str> {
        match self {
            Self::Class(_) => None,
            Self::Subject(value) => Some(&value.class_id),
            Self::Topic(value) => Some(&value.subject_id),
            Self::Subtopic(value) => Some(&value.topic_id),
            Self::Content(value) => Some(&value.subtopic_id),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Class(value) => value.validate(),
            Self::Subject(value) => value.validate(),
            Self::Topic(value) => value.validate(),
            Self::Subtopic(value) => value.validate(),
            Self::Content(value) => value.validate(),
        }
    }
}

/// Level of the curriculum hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyLevel {
    Class,
    Subject,
    Topic,
    Subtopic,
    Content,
}

string_enum!(HierarchyLevel {
    Class => "class",
    Subject => "subject",
    Topic => "topic",
    Subtopic => "subtopic",
    Content => "content",
});

impl HierarchyLevel {
    /// REST collection name for this level.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Class => "classes",
            Self::Subject => "subjects",
            Self::Topic => "topics",
            Self::Subtopic => "subtopics",
            Self::Content => "contents",
        }
    }
}
