//! Notification store contracts and SQLite implementation.
//!
//! # Invariants
//! - Inbox listings are ordered `created_at DESC, id DESC`.
//! - Rows whose recipient or actor was deleted are not returned.

use super::schema::ensure_connection_ready;
use super::{bool_from_db, PageQuery, RepoError, RepoResult};
use crate::model::content::ContentRef;
use crate::model::notification::{Notification, NotificationRequest, SubjectKind};
use crate::model::user::UserId;
use rusqlite::{params, Connection, Row};

const NOTIFICATIONS_DEFAULT_LIMIT: u32 = 20;
const NOTIFICATIONS_LIMIT_MAX: u32 = 100;

pub trait NotificationRepository {
    fn create_notification(&self, request: &NotificationRequest) -> RepoResult<Notification>;
    fn list_for_recipient(
        &self,
        recipient: UserId,
        page: &PageQuery,
    ) -> RepoResult<Vec<Notification>>;
    fn unread_count(&self, recipient: UserId) -> RepoResult<u64>;
    /// Marks every unread notification as read and returns how many changed.
    fn mark_all_read(&self, recipient: UserId) -> RepoResult<usize>;
}

#[derive(Clone, Copy)]
pub struct SqliteNotificationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNotificationRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["notifications"])?;
        Ok(Self { conn })
    }
}

impl NotificationRepository for SqliteNotificationRepository<'_> {
    fn create_notification(&self, request: &NotificationRequest) -> RepoResult<Notification> {
        self.conn.execute(
            "INSERT INTO notifications (
                recipient_user_id,
                actor_user_id,
                subject_kind,
                subject_id,
                target_kind,
                target_id,
                unread,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7);",
            params![
                request.recipient_user_id,
                request.actor_user_id,
                request.subject_kind.as_str(),
                request.subject_id,
                request.target.kind_str(),
                request.target.id(),
                request.created_at,
            ],
        )?;

        Ok(Notification {
            id: self.conn.last_insert_rowid(),
            recipient_user_id: request.recipient_user_id,
            actor_user_id: request.actor_user_id,
            subject_kind: request.subject_kind,
            subject_id: request.subject_id,
            target: request.target,
            unread: true,
            created_at: request.created_at,
        })
    }

    fn list_for_recipient(
        &self,
        recipient: UserId,
        page: &PageQuery,
    ) -> RepoResult<Vec<Notification>> {
        let limit = page.effective_limit(NOTIFICATIONS_DEFAULT_LIMIT, NOTIFICATIONS_LIMIT_MAX);
        let mut stmt = self.conn.prepare(
            "SELECT
                id,
                recipient_user_id,
                actor_user_id,
                subject_kind,
                subject_id,
                target_kind,
                target_id,
                unread,
                created_at
             FROM notifications
             WHERE recipient_user_id = ?1
               AND actor_user_id IS NOT NULL
             ORDER BY created_at DESC, id DESC
             LIMIT ?2 OFFSET ?3;",
        )?;
        let mut rows = stmt.query(params![recipient, limit, page.offset])?;
        let mut notifications = Vec::new();
        while let Some(row) = rows.next()? {
            notifications.push(parse_notification_row(row)?);
        }
        Ok(notifications)
    }

    fn unread_count(&self, recipient: UserId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM notifications
             WHERE recipient_user_id = ?1
               AND actor_user_id IS NOT NULL
               AND unread = 1;",
            [recipient],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn mark_all_read(&self, recipient: UserId) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE notifications
             SET unread = 0
             WHERE recipient_user_id = ?1
               AND actor_user_id IS NOT NULL
               AND unread = 1;",
            [recipient],
        )?;
        Ok(changed)
    }
}

fn parse_notification_row(row: &Row<'_>) -> RepoResult<Notification> {
    let subject_text: String = row.get("subject_kind")?;
    let subject_kind = SubjectKind::parse(&subject_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid subject kind `{subject_text}` in notifications.subject_kind"
        ))
    })?;

    let target_kind: String = row.get("target_kind")?;
    let target = ContentRef::from_parts(&target_kind, row.get("target_id")?).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid target kind `{target_kind}` in notifications.target_kind"
        ))
    })?;

    Ok(Notification {
        id: row.get("id")?,
        recipient_user_id: row.get("recipient_user_id")?,
        actor_user_id: row.get("actor_user_id")?,
        subject_kind,
        subject_id: row.get("subject_id")?,
        target,
        unread: bool_from_db(row, "unread", "notifications")?,
        created_at: row.get("created_at")?,
    })
}
