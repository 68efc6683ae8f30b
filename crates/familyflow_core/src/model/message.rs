//! Chat message model.
//!
//! # Invariants
//! - Messages are immutable once logged.
//! - `group_id` and `speaker` are never blank.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

use super::task::now_epoch_ms;

pub type MessageId = Uuid;

/// Who produced a logged message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// A family member.
    Human,
    /// The bot itself (replies).
    System,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "human" => Some(Self::Human),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageValidationError {
    EmptyGroupId,
    EmptySpeaker,
}

impl Display for MessageValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyGroupId => write!(f, "message group id must not be empty"),
            Self::EmptySpeaker => write!(f, "message speaker must not be empty"),
        }
    }
}

impl Error for MessageValidationError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub group_id: String,
    pub speaker: String,
    pub content: String,
    pub role: MessageRole,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Message {
    pub fn new(
        group_id: impl Into<String>,
        speaker: impl Into<String>,
        content: impl Into<String>,
        role: MessageRole,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id: group_id.into(),
            speaker: speaker.into(),
            content: content.into(),
            role,
            created_at: now_epoch_ms(),
        }
    }

    /// Replaces the creation stamp, e.g. with the time the chat transport
    /// received the message.
    pub fn with_timestamp(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn validate(&self) -> Result<(), MessageValidationError> {
        if self.group_id.trim().is_empty() {
            return Err(MessageValidationError::EmptyGroupId);
        }
        if self.speaker.trim().is_empty() {
            return Err(MessageValidationError::EmptySpeaker);
        }
        Ok(())
    }
}
