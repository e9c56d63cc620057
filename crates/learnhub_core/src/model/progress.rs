//! Per-user completion markers.

use super::string_enum;
use serde::{Deserialize, Serialize};

/// Hierarchy level a progress record can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressKind {
    Content,
    Subtopic,
    Topic,
}

string_enum!(ProgressKind {
    Content => "content",
    Subtopic => "subtopic",
    Topic => "topic",
});

/// Target of a completion marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgressTarget {
    pub kind: ProgressKind,
    pub id: String,
}

impl ProgressTarget {
    pub fn content(id: impl Into<String>) -> Self {
        Self {
            kind: ProgressKind::Content,
            id: id.into(),
        }
    }

    pub fn subtopic(id: impl Into<String>) -> Self {
        Self {
            kind: ProgressKind::Subtopic,
            id: id.into(),
        }
    }

    pub fn topic(id: impl Into<String>) -> Self {
        Self {
            kind: ProgressKind::Topic,
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: String,
    pub target: ProgressTarget,
    /// Epoch milliseconds of the first completion.
    pub completed_at: i64,
}

/// Completion summary over a set of content items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub completed: u32,
    pub total: u32,
}

impl ProgressSummary {
    /// Completion ratio in percent, `0.0` when there is nothing to complete.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.completed) * 100.0 / f64::from(self.total)
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}
