//! Message log contract and SQLite implementation.
//!
//! # Invariants
//! - Messages are append-only; there is no update or delete path.
//! - `list_recent` returns the newest `limit` messages in oldest-first order.

use crate::model::message::{Message, MessageId, MessageRole};
use crate::repo::task_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

/// Message log operations.
pub trait MessageRepository {
    fn append_message(&self, message: &Message) -> RepoResult<MessageId>;
    fn list_recent(&self, group_id: &str, limit: u32) -> RepoResult<Vec<Message>>;
}

impl<T: MessageRepository + ?Sized> MessageRepository for &T {
    fn append_message(&self, message: &Message) -> RepoResult<MessageId> {
        (**self).append_message(message)
    }

    fn list_recent(&self, group_id: &str, limit: u32) -> RepoResult<Vec<Message>> {
        (**self).list_recent(group_id, limit)
    }
}

/// SQLite-backed message log.
pub struct SqliteMessageRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMessageRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl MessageRepository for SqliteMessageRepository<'_> {
    fn append_message(&self, message: &Message) -> RepoResult<MessageId> {
        message.validate()?;

        self.conn.execute(
            "INSERT INTO messages (uuid, group_id, speaker, content, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                message.id.to_string(),
                message.group_id.as_str(),
                message.speaker.as_str(),
                message.content.as_str(),
                message.role.as_str(),
                message.created_at,
            ],
        )?;

        Ok(message.id)
    }

    fn list_recent(&self, group_id: &str, limit: u32) -> RepoResult<Vec<Message>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(
            "SELECT uuid, group_id, speaker, content, role, created_at
             FROM messages
             WHERE group_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2;",
        )?;
        let mut rows = stmt.query(params![group_id, i64::from(limit)])?;
        let mut messages = Vec::new();
        while let Some(row) = rows.next()? {
            messages.push(parse_message_row(row)?);
        }

        messages.reverse();
        Ok(messages)
    }
}

fn parse_message_row(row: &Row<'_>) -> RepoResult<Message> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in messages.uuid"))
    })?;

    let role_text: String = row.get("role")?;
    let role = MessageRole::parse(&role_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid role `{role_text}` in messages.role"))
    })?;

    Ok(Message {
        id,
        group_id: row.get("group_id")?,
        speaker: row.get("speaker")?,
        content: row.get("content")?,
        role,
        created_at: row.get("created_at")?,
    })
}
