//! Conversation context for the semantic classifier.
//!
//! Gathers the recent history and the active-topic set of a group. No
//! decisions are made here; store failures degrade to empty context so the
//! classifier still runs.

use crate::model::message::Message;
use crate::repo::message_repo::MessageRepository;
use crate::repo::task_repo::TaskRepository;
use log::warn;

/// Reads a group's recent history and active topics for the classifier.
pub struct ContextAssembler<T: TaskRepository, M: MessageRepository> {
    tasks: T,
    messages: M,
    history_limit: u32,
}

impl<T: TaskRepository, M: MessageRepository> ContextAssembler<T, M> {
    pub fn new(tasks: T, messages: M, history_limit: u32) -> Self {
        Self {
            tasks,
            messages,
            history_limit,
        }
    }

    /// Last `history_limit` messages of the group, oldest first.
    pub fn recent_history(&self, group_id: &str) -> Vec<Message> {
        match self.messages.list_recent(group_id, self.history_limit) {
            Ok(history) => history,
            Err(err) => {
                warn!(
                    "event=context_history module=context status=error group_id={} error={}",
                    group_id, err
                );
                Vec::new()
            }
        }
    }

    pub fn active_topics(&self, group_id: &str) -> Vec<String> {
        match self.tasks.list_distinct_topics(group_id) {
            Ok(topics) => topics,
            Err(err) => {
                warn!(
                    "event=context_topics module=context status=error group_id={} error={}",
                    group_id, err
                );
                Vec::new()
            }
        }
    }
}
