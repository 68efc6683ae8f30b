//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical record for tasks and ideas raised in a family chat.
//! - Describe the lifecycle states used by the assignment state machine.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `assignee` is `None` until an explicit claim; at most one assignee.
//! - `status` moves only pending->done, pending->deleted and done->pending.
//! - `deleted` is terminal apart from permanent removal of the record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task record.
pub type TaskId = Uuid;

/// Storage kind for a task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Concrete actionable item.
    Task,
    /// Open proposal still tracked under a topic.
    Idea,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Idea => "idea",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "task" => Some(Self::Task),
            "idea" => Some(Self::Idea),
            _ => None,
        }
    }
}

/// Persisted lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Done,
    Deleted,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
            Self::Deleted => "deleted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "done" => Some(Self::Done),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }

    /// Returns whether the status graph has an edge `self -> next`.
    ///
    /// Permanent removal is not a status edge and is not covered here.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Done) | (Self::Pending, Self::Deleted) | (Self::Done, Self::Pending)
        )
    }
}

/// Assignment view over status + assignee, as seen by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Unassigned,
    Assigned,
    Done,
    Deleted,
}

impl Display for TaskState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Unassigned => "unassigned",
            Self::Assigned => "assigned",
            Self::Done => "done",
            Self::Deleted => "deleted",
        };
        f.write_str(label)
    }
}

/// Validation errors for task invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyGroupId,
    EmptyContent,
    EmptyTopic,
    /// Assignee present but blank after trim.
    BlankAssignee,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyGroupId => write!(f, "task group id must not be empty"),
            Self::EmptyContent => write!(f, "task content must not be empty"),
            Self::EmptyTopic => write!(f, "task topic must not be empty"),
            Self::BlankAssignee => write!(f, "task assignee must not be blank when set"),
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Conversation group that raised the task.
    pub group_id: String,
    /// Imperative summary, e.g. `卵を買う`.
    pub content: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub topic: String,
    pub assignee: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Task {
    /// Creates a new pending, unassigned task with a generated ID.
    pub fn new(
        group_id: impl Into<String>,
        kind: TaskKind,
        topic: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id: group_id.into(),
            content: content.into(),
            kind,
            topic: topic.into(),
            assignee: None,
            status: TaskStatus::Pending,
            due_date: None,
            created_at: now_epoch_ms(),
        }
    }

    /// Derives the assignment state.
    pub fn state(&self) -> TaskState {
        match self.status {
            TaskStatus::Pending if self.assignee.is_some() => TaskState::Assigned,
            TaskStatus::Pending => TaskState::Unassigned,
            TaskStatus::Done => TaskState::Done,
            TaskStatus::Deleted => TaskState::Deleted,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    pub fn is_assigned_to(&self, identity: &str) -> bool {
        self.assignee.as_deref() == Some(identity)
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.group_id.trim().is_empty() {
            return Err(TaskValidationError::EmptyGroupId);
        }
        if self.content.trim().is_empty() {
            return Err(TaskValidationError::EmptyContent);
        }
        if self.topic.trim().is_empty() {
            return Err(TaskValidationError::EmptyTopic);
        }
        if matches!(self.assignee.as_deref(), Some(value) if value.trim().is_empty()) {
            return Err(TaskValidationError::BlankAssignee);
        }
        Ok(())
    }
}

/// Current wall clock in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
