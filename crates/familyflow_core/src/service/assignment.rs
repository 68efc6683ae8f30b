//! Task lifecycle and assignment state machine.
//!
//! # Responsibility
//! - Apply claim/complete/undo/delete/release/pick-up/hard-remove
//!   transitions through single conditional store writes.
//! - Gate the implicit "claim latest" gesture on the topic allow-list.
//!
//! # Invariants
//! - `deleted` only leaves the store through hard-remove.
//! - A refused transition performs no write.
//! - No in-engine locking: concurrent claims race at the store, last write
//!   wins.

use crate::config::EngineConfig;
use crate::model::task::{Task, TaskId, TaskState, TaskStatus};
use crate::notify::{send_best_effort, Notifier};
use crate::repo::task_repo::{AssigneeGuard, ClaimWrite, RepoError, TaskRepository};
use crate::service::reply;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Statuses from which a record may be permanently removed.
const HARD_REMOVABLE: &[TaskStatus] = &[TaskStatus::Done, TaskStatus::Deleted];

/// Transition names, used in errors and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    ClaimLatest,
    Complete,
    Undo,
    Delete,
    Release,
    PickUp,
    HardRemove,
}

impl Transition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClaimLatest => "claim_latest",
            Self::Complete => "complete",
            Self::Undo => "undo",
            Self::Delete => "delete",
            Self::Release => "release",
            Self::PickUp => "pick_up",
            Self::HardRemove => "hard_remove",
        }
    }
}

/// Result of the implicit claim gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    Claimed {
        task_id: TaskId,
        content: String,
        assignee: String,
    },
    /// The latest pending task belongs to a project topic; project tasks need
    /// explicit per-task assignment. Nothing was written.
    PolicyLocked { task_id: TaskId, topic: String },
    /// The group has no pending task.
    NothingToClaim,
}

#[derive(Debug)]
pub enum AssignmentError {
    BlankActor,
    TaskNotFound(TaskId),
    /// The task's current state has no edge for this transition.
    InvalidTransition {
        task_id: TaskId,
        state: TaskState,
        transition: Transition,
    },
    /// Release attempted by someone other than the current assignee.
    NotAssignee { task_id: TaskId, actor: String },
    /// Pick-up attempted on a task someone already holds.
    AlreadyAssigned { task_id: TaskId, assignee: String },
    Repo(RepoError),
}

impl Display for AssignmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankActor => write!(f, "acting identity must not be blank"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidTransition {
                task_id,
                state,
                transition,
            } => write!(
                f,
                "cannot {} task {task_id} in state {state}",
                transition.as_str()
            ),
            Self::NotAssignee { task_id, actor } => {
                write!(f, "{actor} is not the assignee of task {task_id}")
            }
            Self::AlreadyAssigned { task_id, assignee } => {
                write!(f, "task {task_id} is already assigned to {assignee}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AssignmentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AssignmentError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(task_id) => Self::TaskNotFound(task_id),
            other => Self::Repo(other),
        }
    }
}

/// Assignment state machine over a task store and a notifier.
pub struct AssignmentStateMachine<R: TaskRepository, N: Notifier> {
    repo: R,
    notifier: N,
    assignable_topics: Vec<String>,
}

impl<R: TaskRepository, N: Notifier> AssignmentStateMachine<R, N> {
    pub fn new(repo: R, notifier: N, assignable_topics: Vec<String>) -> Self {
        Self {
            repo,
            notifier,
            assignable_topics,
        }
    }

    pub fn from_config(repo: R, notifier: N, config: &EngineConfig) -> Self {
        Self::new(repo, notifier, config.assignable_topics.clone())
    }

    /// Assigns the group's most recent pending task to `actor`, if its topic is
    /// claimable.
    ///
    /// The most recent pending task is the target whether or not someone
    /// already holds it.
    pub fn claim_latest(
        &self,
        group_id: &str,
        actor: &str,
    ) -> Result<ClaimOutcome, AssignmentError> {
        let actor = normalize_actor(actor)?;
        let outcome = match self
            .repo
            .claim_latest(group_id, actor, &self.assignable_topics)?
        {
            ClaimWrite::Claimed(task) => ClaimOutcome::Claimed {
                task_id: task.id,
                content: task.content,
                assignee: actor.to_string(),
            },
            ClaimWrite::Ineligible(task) => ClaimOutcome::PolicyLocked {
                task_id: task.id,
                topic: task.topic,
            },
            ClaimWrite::NoPendingTask => ClaimOutcome::NothingToClaim,
        };

        match &outcome {
            ClaimOutcome::Claimed { task_id, .. } => info!(
                "event=task_transition module=assignment status=ok transition=claim_latest group_id={} task_id={}",
                group_id, task_id
            ),
            ClaimOutcome::PolicyLocked { task_id, topic } => info!(
                "event=task_transition module=assignment status=skip transition=claim_latest reason=policy_locked group_id={} task_id={} topic={}",
                group_id, task_id, topic
            ),
            ClaimOutcome::NothingToClaim => info!(
                "event=task_transition module=assignment status=skip transition=claim_latest reason=no_pending_task group_id={}",
                group_id
            ),
        }
        Ok(outcome)
    }

    /// `pending -> done`, whoever holds the task. Notifies the originating
    /// conversation on a best-effort basis.
    pub fn complete(&self, task_id: TaskId) -> Result<Task, AssignmentError> {
        let task = self.apply_status(
            task_id,
            TaskStatus::Pending,
            TaskStatus::Done,
            Transition::Complete,
        )?;
        send_best_effort(
            &self.notifier,
            &task.group_id,
            &reply::task_completed(&task.content),
        );
        Ok(task)
    }

    /// `done -> pending`, from the history view.
    pub fn undo(&self, task_id: TaskId) -> Result<Task, AssignmentError> {
        self.apply_status(
            task_id,
            TaskStatus::Done,
            TaskStatus::Pending,
            Transition::Undo,
        )
    }

    /// `pending -> deleted` (moves the task to the trash).
    pub fn delete(&self, task_id: TaskId) -> Result<Task, AssignmentError> {
        self.apply_status(
            task_id,
            TaskStatus::Pending,
            TaskStatus::Deleted,
            Transition::Delete,
        )
    }

    /// `assigned -> unassigned`; only the current assignee may release.
    pub fn release(&self, task_id: TaskId, actor: &str) -> Result<Task, AssignmentError> {
        let actor = normalize_actor(actor)?;
        if let Some(task) = self
            .repo
            .update_assignee(task_id, AssigneeGuard::HeldBy(actor), None)?
        {
            return Ok(applied(Transition::Release, task));
        }

        let task = self.require_task(task_id)?;
        let err = match task.state() {
            TaskState::Assigned => AssignmentError::NotAssignee {
                task_id,
                actor: actor.to_string(),
            },
            state => AssignmentError::InvalidTransition {
                task_id,
                state,
                transition: Transition::Release,
            },
        };
        Err(self.refused(Transition::Release, err))
    }

    /// `unassigned -> assigned(actor)`.
    pub fn pick_up(&self, task_id: TaskId, actor: &str) -> Result<Task, AssignmentError> {
        let actor = normalize_actor(actor)?;
        if let Some(task) = self
            .repo
            .update_assignee(task_id, AssigneeGuard::Unassigned, Some(actor))?
        {
            return Ok(applied(Transition::PickUp, task));
        }

        let task = self.require_task(task_id)?;
        let err = match (task.state(), task.assignee) {
            (TaskState::Assigned, Some(assignee)) => {
                AssignmentError::AlreadyAssigned { task_id, assignee }
            }
            (state, _) => AssignmentError::InvalidTransition {
                task_id,
                state,
                transition: Transition::PickUp,
            },
        };
        Err(self.refused(Transition::PickUp, err))
    }

    /// Permanently deletes a `done` or `deleted` task. Irreversible.
    pub fn hard_remove(&self, task_id: TaskId) -> Result<(), AssignmentError> {
        if self.repo.delete_task(task_id, HARD_REMOVABLE)? {
            info!(
                "event=task_transition module=assignment status=ok transition=hard_remove task_id={}",
                task_id
            );
            return Ok(());
        }

        let task = self.require_task(task_id)?;
        Err(self.refused(
            Transition::HardRemove,
            AssignmentError::InvalidTransition {
                task_id,
                state: task.state(),
                transition: Transition::HardRemove,
            },
        ))
    }

    fn apply_status(
        &self,
        task_id: TaskId,
        expected: TaskStatus,
        next: TaskStatus,
        transition: Transition,
    ) -> Result<Task, AssignmentError> {
        if let Some(task) = self.repo.update_status(task_id, expected, next)? {
            return Ok(applied(transition, task));
        }

        let task = self.require_task(task_id)?;
        Err(self.refused(
            transition,
            AssignmentError::InvalidTransition {
                task_id,
                state: task.state(),
                transition,
            },
        ))
    }

    fn require_task(&self, task_id: TaskId) -> Result<Task, AssignmentError> {
        self.repo
            .get_task(task_id)?
            .ok_or(AssignmentError::TaskNotFound(task_id))
    }

    fn refused(&self, transition: Transition, err: AssignmentError) -> AssignmentError {
        warn!(
            "event=task_transition module=assignment status=error transition={} error={}",
            transition.as_str(),
            err
        );
        err
    }
}

/// Logs a transition whose write went through; `task` is the row as written.
fn applied(transition: Transition, task: Task) -> Task {
    info!(
        "event=task_transition module=assignment status=ok transition={} task_id={} state={}",
        transition.as_str(),
        task.id,
        task.state()
    );
    task
}

fn normalize_actor(actor: &str) -> Result<&str, AssignmentError> {
    let trimmed = actor.trim();
    if trimmed.is_empty() {
        return Err(AssignmentError::BlankActor);
    }
    Ok(trimmed)
}
