//! Board projection of a group's tasks.
//!
//! # Responsibility
//! - Split tasks into the routine lane (everyday topics) and the project lane
//!   (grouped by topic), each with completed history and trash.
//! - Tell a viewer which transitions each row offers.
//!
//! # Invariants
//! - Rows appear most recent first; project groups follow the order of their
//!   most recent pending task.
//! - Offered actions are a subset of what the assignment state machine
//!   accepts for the row's state.

use crate::config::EngineConfig;
use crate::model::task::{Task, TaskState, TaskStatus};
use crate::repo::task_repo::{RepoResult, TaskListQuery, TaskRepository};

/// Completed and deleted rows shown per status.
pub const BOARD_HISTORY_LIMIT: u32 = 100;

/// Transitions available to the viewer on one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowActions {
    pub complete: bool,
    pub release: bool,
    pub pick_up: bool,
    pub delete: bool,
    pub undo: bool,
    pub hard_remove: bool,
    /// Someone other than the viewer holds the task.
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRow {
    pub task: Task,
    pub actions: RowActions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicGroup {
    pub topic: String,
    pub rows: Vec<BoardRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutineLane {
    pub pending: Vec<BoardRow>,
    pub history: Vec<BoardRow>,
    pub trash: Vec<BoardRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectLane {
    pub groups: Vec<TopicGroup>,
    pub history: Vec<BoardRow>,
    pub trash: Vec<BoardRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub group_id: String,
    pub viewer: String,
    pub routine: RoutineLane,
    pub projects: ProjectLane,
}

pub struct BoardService<R: TaskRepository> {
    repo: R,
    config: EngineConfig,
}

impl<R: TaskRepository> BoardService<R> {
    pub fn new(repo: R, config: EngineConfig) -> Self {
        Self { repo, config }
    }

    pub fn build(&self, group_id: &str, viewer: &str) -> RepoResult<BoardView> {
        let mut routine = RoutineLane::default();
        let mut projects = ProjectLane::default();

        for task in self.repo.list_pending(group_id)? {
            let is_routine = self.config.is_routine(&task.topic);
            let row = BoardRow {
                actions: pending_actions(&task, viewer, is_routine),
                task,
            };
            if is_routine {
                routine.pending.push(row);
            } else {
                push_into_group(&mut projects.groups, row);
            }
        }

        for status in [TaskStatus::Done, TaskStatus::Deleted] {
            let tasks = self.repo.list_tasks(&TaskListQuery {
                group_id: group_id.to_string(),
                status: Some(status),
                limit: Some(BOARD_HISTORY_LIMIT),
            })?;
            for task in tasks {
                let row = BoardRow {
                    actions: archived_actions(&task),
                    task,
                };
                let lane_rows = match (self.config.is_routine(&row.task.topic), status) {
                    (true, TaskStatus::Done) => &mut routine.history,
                    (true, _) => &mut routine.trash,
                    (false, TaskStatus::Done) => &mut projects.history,
                    (false, _) => &mut projects.trash,
                };
                lane_rows.push(row);
            }
        }

        Ok(BoardView {
            group_id: group_id.to_string(),
            viewer: viewer.to_string(),
            routine,
            projects,
        })
    }
}

fn pending_actions(task: &Task, viewer: &str, is_routine: bool) -> RowActions {
    let state = task.state();
    let mine = task.is_assigned_to(viewer);
    RowActions {
        complete: true,
        release: mine,
        pick_up: state == TaskState::Unassigned,
        delete: !is_routine,
        locked: state == TaskState::Assigned && !mine,
        ..RowActions::default()
    }
}

fn archived_actions(task: &Task) -> RowActions {
    RowActions {
        undo: task.status == TaskStatus::Done,
        hard_remove: true,
        ..RowActions::default()
    }
}

fn push_into_group(groups: &mut Vec<TopicGroup>, row: BoardRow) {
    match groups.iter_mut().find(|group| group.topic == row.task.topic) {
        Some(group) => group.rows.push(row),
        None => groups.push(TopicGroup {
            topic: row.task.topic.clone(),
            rows: vec![row],
        }),
    }
}
