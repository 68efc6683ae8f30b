//! Classification outcome shared by the extractor and the semantic classifier.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::task::TaskKind;

/// What a message asks the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Task,
    Idea,
    /// Speaker claims the most recently raised item.
    Accept,
    /// Small talk, acknowledgement, completion report. No storage action.
    Null,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Idea => "idea",
            Self::Accept => "accept",
            Self::Null => "null",
        }
    }

    /// Storage kind for categories that create a record.
    pub fn task_kind(self) -> Option<TaskKind> {
        match self {
            Self::Task => Some(TaskKind::Task),
            Self::Idea => Some(TaskKind::Idea),
            Self::Accept | Self::Null => None,
        }
    }
}

/// Structured classification of one message.
///
/// Never carries an assignee: ownership is decided only by an explicit claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub topic: Option<String>,
    pub summary: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl ClassificationResult {
    /// The "take no action" result.
    pub fn null() -> Self {
        Self {
            category: Category::Null,
            topic: None,
            summary: None,
            due_date: None,
        }
    }

    pub fn task(summary: impl Into<String>) -> Self {
        Self {
            category: Category::Task,
            topic: None,
            summary: Some(summary.into()),
            due_date: None,
        }
    }
}

/// Which path produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSource {
    /// Deterministic linguistic fast path.
    Extractor,
    /// Contextual fallback that has seen the active-topic list.
    Classifier,
}

impl ClassificationSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extractor => "extractor",
            Self::Classifier => "classifier",
        }
    }
}
