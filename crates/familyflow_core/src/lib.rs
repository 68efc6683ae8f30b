//! Core engine for a family group-chat task assistant.
//! Turns chat messages into tasks and ideas, and owns the assignment
//! lifecycle invariants.

pub mod classify;
pub mod config;
pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod nlp;
pub mod notify;
pub mod repo;
pub mod service;
pub mod topic;

pub use classify::{
    ClassificationError, ClassificationRequest, ClassificationService, CompletionBackend,
    PromptedClassificationService,
};
pub use config::{ConfigError, EngineConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::classification::{Category, ClassificationResult, ClassificationSource};
pub use model::message::{Message, MessageId, MessageRole};
pub use model::task::{Task, TaskId, TaskKind, TaskState, TaskStatus, TaskValidationError};
pub use nlp::token::{DependencyRole, LinguisticParser, PartOfSpeech, Token};
pub use notify::{Notifier, NotifyError, SilentNotifier};
pub use repo::message_repo::{MessageRepository, SqliteMessageRepository};
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use service::assignment::{AssignmentError, AssignmentStateMachine, ClaimOutcome};
pub use service::board::{BoardService, BoardView};
pub use service::dispatch::{Collaborators, DispatchOutcome, InboundMessage, MessageDispatcher};

/// Minimal health-check API for host wiring.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
