//! Task store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the store operations the assignment engine consumes.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before SQL mutations.
//! - Every state transition is one conditional statement; there is no
//!   client-side read-modify-write. Concurrent claims race at the store and
//!   the last write wins.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::message::MessageValidationError;
use crate::model::task::{Task, TaskId, TaskKind, TaskStatus, TaskValidationError};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Params, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_COLUMNS: &str =
    "uuid, group_id, content, kind, topic, assignee, status, due_date, created_at";

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Most-recent-first ordering. `rowid` breaks ties between rows created in the
/// same millisecond so insertion order still decides.
const RECENT_FIRST: &str = "ORDER BY created_at DESC, rowid DESC";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task and message persistence.
#[derive(Debug)]
pub enum RepoError {
    InvalidTask(TaskValidationError),
    InvalidMessage(MessageValidationError),
    Db(DbError),
    NotFound(TaskId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTask(err) => write!(f, "{err}"),
            Self::InvalidMessage(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTask(err) => Some(err),
            Self::InvalidMessage(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidTask(value)
    }
}

impl From<MessageValidationError> for RepoError {
    fn from(value: MessageValidationError) -> Self {
        Self::InvalidMessage(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Precondition on the current assignee for an assignee write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssigneeGuard<'a> {
    /// Write only if nobody holds the task.
    Unassigned,
    /// Write only if `identity` currently holds the task.
    HeldBy(&'a str),
}

/// Store-level result of the claim-latest conditional write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimWrite {
    /// The latest pending task was updated; carries the row after the write.
    Claimed(Task),
    /// The latest pending task exists but its topic is outside the allow-list.
    /// Nothing was written.
    Ineligible(Task),
    /// The group has no pending task.
    NoPendingTask,
}

/// Filter for listing a group's tasks, most recent first.
#[derive(Debug, Clone, Default)]
pub struct TaskListQuery {
    pub group_id: String,
    pub status: Option<TaskStatus>,
    pub limit: Option<u32>,
}

/// Task store operations.
pub trait TaskRepository {
    fn insert_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Sets `status = next` only when the row currently has `expected`.
    /// Returns the row as written, or `None` when nothing changed.
    fn update_status(
        &self,
        id: TaskId,
        expected: TaskStatus,
        next: TaskStatus,
    ) -> RepoResult<Option<Task>>;
    /// Sets `assignee = next` on a pending row whose assignee satisfies
    /// `guard`. Returns the row as written, or `None` when nothing changed.
    fn update_assignee(
        &self,
        id: TaskId,
        guard: AssigneeGuard<'_>,
        next: Option<&str>,
    ) -> RepoResult<Option<Task>>;
    /// Assigns the group's most recent pending task to `assignee` when its
    /// topic is one of `eligible_topics`.
    fn claim_latest(
        &self,
        group_id: &str,
        assignee: &str,
        eligible_topics: &[String],
    ) -> RepoResult<ClaimWrite>;
    /// Permanently deletes the row when its status is one of `removable`.
    fn delete_task(&self, id: TaskId, removable: &[TaskStatus]) -> RepoResult<bool>;
    /// Pending tasks of a group, most recent first.
    fn list_pending(&self, group_id: &str) -> RepoResult<Vec<Task>>;
    /// Distinct topics among a group's pending tasks, most recently used first.
    fn list_distinct_topics(&self, group_id: &str) -> RepoResult<Vec<String>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
}

impl<T: TaskRepository + ?Sized> TaskRepository for &T {
    fn insert_task(&self, task: &Task) -> RepoResult<TaskId> {
        (**self).insert_task(task)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        (**self).get_task(id)
    }

    fn update_status(
        &self,
        id: TaskId,
        expected: TaskStatus,
        next: TaskStatus,
    ) -> RepoResult<Option<Task>> {
        (**self).update_status(id, expected, next)
    }

    fn update_assignee(
        &self,
        id: TaskId,
        guard: AssigneeGuard<'_>,
        next: Option<&str>,
    ) -> RepoResult<Option<Task>> {
        (**self).update_assignee(id, guard, next)
    }

    fn claim_latest(
        &self,
        group_id: &str,
        assignee: &str,
        eligible_topics: &[String],
    ) -> RepoResult<ClaimWrite> {
        (**self).claim_latest(group_id, assignee, eligible_topics)
    }

    fn delete_task(&self, id: TaskId, removable: &[TaskStatus]) -> RepoResult<bool> {
        (**self).delete_task(id, removable)
    }

    fn list_pending(&self, group_id: &str) -> RepoResult<Vec<Task>> {
        (**self).list_pending(group_id)
    }

    fn list_distinct_topics(&self, group_id: &str) -> RepoResult<Vec<String>> {
        (**self).list_distinct_topics(group_id)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        (**self).list_tasks(query)
    }
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn latest_pending(&self, group_id: &str) -> RepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE group_id = ?1 AND status = 'pending'
             {RECENT_FIRST}
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query([group_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_task_row(row)?)),
            None => Ok(None),
        }
    }

    /// Runs a single-row `UPDATE ... RETURNING` and parses the written row.
    fn write_returning(&self, sql: &str, bind: impl Params) -> RepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_task_row(row)?)),
            None => Ok(None),
        }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        self.conn.execute(
            &format!(
                "INSERT INTO tasks ({TASK_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);"
            ),
            params![
                task.id.to_string(),
                task.group_id.as_str(),
                task.content.as_str(),
                task.kind.as_str(),
                task.topic.as_str(),
                task.assignee.as_deref(),
                task.status.as_str(),
                task.due_date
                    .map(|date| date.format(DUE_DATE_FORMAT).to_string()),
                task.created_at,
            ],
        )?;

        Ok(task.id)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_task_row(row)?)),
            None => Ok(None),
        }
    }

    fn update_status(
        &self,
        id: TaskId,
        expected: TaskStatus,
        next: TaskStatus,
    ) -> RepoResult<Option<Task>> {
        self.write_returning(
            &format!(
                "UPDATE tasks
                 SET
                    status = ?1,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?2 AND status = ?3
                 RETURNING {TASK_COLUMNS};"
            ),
            params![next.as_str(), id.to_string(), expected.as_str()],
        )
    }

    fn update_assignee(
        &self,
        id: TaskId,
        guard: AssigneeGuard<'_>,
        next: Option<&str>,
    ) -> RepoResult<Option<Task>> {
        match guard {
            AssigneeGuard::Unassigned => self.write_returning(
                &format!(
                    "UPDATE tasks
                     SET
                        assignee = ?1,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE uuid = ?2 AND status = 'pending' AND assignee IS NULL
                     RETURNING {TASK_COLUMNS};"
                ),
                params![next, id.to_string()],
            ),
            AssigneeGuard::HeldBy(holder) => self.write_returning(
                &format!(
                    "UPDATE tasks
                     SET
                        assignee = ?1,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE uuid = ?2 AND status = 'pending' AND assignee = ?3
                     RETURNING {TASK_COLUMNS};"
                ),
                params![next, id.to_string(), holder],
            ),
        }
    }

    fn claim_latest(
        &self,
        group_id: &str,
        assignee: &str,
        eligible_topics: &[String],
    ) -> RepoResult<ClaimWrite> {
        if !eligible_topics.is_empty() {
            let placeholders = vec!["?"; eligible_topics.len()].join(", ");
            let sql = format!(
                "UPDATE tasks
                 SET
                    assignee = ?,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = (
                    SELECT uuid FROM tasks
                    WHERE group_id = ? AND status = 'pending'
                    {RECENT_FIRST}
                    LIMIT 1
                 )
                   AND topic IN ({placeholders})
                 RETURNING {TASK_COLUMNS};"
            );

            let mut bind_values: Vec<Value> = Vec::with_capacity(eligible_topics.len() + 2);
            bind_values.push(Value::Text(assignee.to_string()));
            bind_values.push(Value::Text(group_id.to_string()));
            bind_values.extend(eligible_topics.iter().cloned().map(Value::Text));

            if let Some(task) = self.write_returning(&sql, params_from_iter(bind_values))? {
                return Ok(ClaimWrite::Claimed(task));
            }
        }

        // Nothing written; a read-only lookup tells the two refusals apart.
        match self.latest_pending(group_id)? {
            Some(task) => Ok(ClaimWrite::Ineligible(task)),
            None => Ok(ClaimWrite::NoPendingTask),
        }
    }

    fn delete_task(&self, id: TaskId, removable: &[TaskStatus]) -> RepoResult<bool> {
        if removable.is_empty() {
            return Ok(false);
        }

        let placeholders = vec!["?"; removable.len()].join(", ");
        let mut bind_values: Vec<Value> = vec![Value::Text(id.to_string())];
        bind_values.extend(
            removable
                .iter()
                .map(|status| Value::Text(status.as_str().to_string())),
        );

        let changed = self.conn.execute(
            &format!("DELETE FROM tasks WHERE uuid = ? AND status IN ({placeholders});"),
            params_from_iter(bind_values),
        )?;
        Ok(changed > 0)
    }

    fn list_pending(&self, group_id: &str) -> RepoResult<Vec<Task>> {
        self.list_tasks(&TaskListQuery {
            group_id: group_id.to_string(),
            status: Some(TaskStatus::Pending),
            limit: None,
        })
    }

    fn list_distinct_topics(&self, group_id: &str) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT topic FROM tasks
             WHERE group_id = ?1 AND status = 'pending' AND TRIM(topic) <> ''
             GROUP BY topic
             ORDER BY MAX(created_at) DESC, topic ASC;",
        )?;
        let topics = stmt
            .query_map([group_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(topics)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE group_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(query.group_id.clone())];

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        sql.push(' ');
        sql.push_str(RECENT_FIRST);

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in tasks.uuid"))
    })?;

    let kind_text: String = row.get("kind")?;
    let kind = TaskKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid task kind `{kind_text}` in tasks.kind"))
    })?;

    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid task status `{status_text}` in tasks.status"
        ))
    })?;

    let due_date = match row.get::<_, Option<String>>("due_date")? {
        Some(value) => Some(
            NaiveDate::parse_from_str(&value, DUE_DATE_FORMAT).map_err(|_| {
                RepoError::InvalidData(format!("invalid due date `{value}` in tasks.due_date"))
            })?,
        ),
        None => None,
    };

    let task = Task {
        id,
        group_id: row.get("group_id")?,
        content: row.get("content")?,
        kind,
        topic: row.get("topic")?,
        assignee: row.get("assignee")?,
        status,
        due_date,
        created_at: row.get("created_at")?,
    };
    task.validate()?;
    Ok(task)
}
