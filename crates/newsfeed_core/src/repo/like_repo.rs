//! Like store contracts and SQLite implementation.
//!
//! # Invariants
//! - One like per `(user_id, target)`; inserting it again returns the
//!   existing row with `created = false`.
//! - `target_kind` is either `tweet` or `comment`.

use super::schema::ensure_connection_ready;
use super::{RepoError, RepoResult};
use crate::model::content::ContentRef;
use crate::model::like::Like;
use crate::model::user::UserId;
use rusqlite::{params, Connection, Row};

pub trait LikeRepository {
    /// Inserts the like unless it exists. Returns the row and whether it is new.
    fn insert_like(&self, user: UserId, target: ContentRef, created_at: i64)
        -> RepoResult<(Like, bool)>;
    fn get_like(&self, user: UserId, target: ContentRef) -> RepoResult<Option<Like>>;
    fn delete_like(&self, user: UserId, target: ContentRef) -> RepoResult<usize>;
    fn count_for_target(&self, target: ContentRef) -> RepoResult<u64>;
}

#[derive(Clone, Copy)]
pub struct SqliteLikeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLikeRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["likes"])?;
        Ok(Self { conn })
    }
}

impl LikeRepository for SqliteLikeRepository<'_> {
    fn insert_like(
        &self,
        user: UserId,
        target: ContentRef,
        created_at: i64,
    ) -> RepoResult<(Like, bool)> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO likes (user_id, target_kind, target_id, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![user, target.kind_str(), target.id(), created_at],
        )?;

        let like = self.get_like(user, target)?.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "like by user {user} on {} {} missing after insert",
                target.kind_str(),
                target.id()
            ))
        })?;
        Ok((like, inserted == 1))
    }

    fn get_like(&self, user: UserId, target: ContentRef) -> RepoResult<Option<Like>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, target_kind, target_id, created_at
             FROM likes
             WHERE user_id = ?1 AND target_kind = ?2 AND target_id = ?3;",
        )?;
        let mut rows = stmt.query(params![user, target.kind_str(), target.id()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_like_row(row)?));
        }
        Ok(None)
    }

    fn delete_like(&self, user: UserId, target: ContentRef) -> RepoResult<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM likes WHERE user_id = ?1 AND target_kind = ?2 AND target_id = ?3;",
            params![user, target.kind_str(), target.id()],
        )?;
        Ok(deleted)
    }

    fn count_for_target(&self, target: ContentRef) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM likes
             WHERE target_kind = ?1 AND target_id = ?2 AND user_id IS NOT NULL;",
            params![target.kind_str(), target.id()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

fn parse_like_row(row: &Row<'_>) -> RepoResult<Like> {
    let kind: String = row.get("target_kind")?;
    let target_id: i64 = row.get("target_id")?;
    let target = ContentRef::from_parts(&kind, target_id).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid target kind `{kind}` in likes.target_kind"))
    })?;

    Ok(Like {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        target,
        created_at: row.get("created_at")?,
    })
}
