//! Social graph store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist directed follow edges and answer both directions of the graph.
//! - Provide the single-statement follower id lookup used by fan-out.
//!
//! # Invariants
//! - One edge per `(from_user_id, to_user_id)`; a second insert is a
//!   `Conflict`, decided by the UNIQUE index at write time.
//! - Listings are ordered `created_at DESC, id DESC`.
//! - Edges tombstoned by account deletion are skipped by every read.
//! - Reads touch only the `friendships` table; resolving users is the caller's
//!   second, id-list step.

use super::schema::ensure_connection_ready;
use super::{map_unique_violation, RepoResult};
use crate::model::friendship::FollowEdge;
use crate::model::user::UserId;
use rusqlite::{params, Connection, Row};

pub(crate) const FOLLOW_EDGE_CONSTRAINT: &str = "friendships.from_user_id_to_user_id";

pub trait FriendshipRepository {
    /// Inserts one edge. Returns `Conflict` when the edge already exists.
    fn insert_edge(&self, from: UserId, to: UserId, created_at: i64) -> RepoResult<FollowEdge>;
    /// Deletes the edge if present and returns the number of removed rows.
    fn delete_edge(&self, from: UserId, to: UserId) -> RepoResult<usize>;
    fn edge_exists(&self, from: UserId, to: UserId) -> RepoResult<bool>;
    /// Edges pointing at `user` (who follows `user`).
    fn follower_edges(&self, user: UserId) -> RepoResult<Vec<FollowEdge>>;
    /// Edges leaving `user` (whom `user` follows).
    fn following_edges(&self, user: UserId) -> RepoResult<Vec<FollowEdge>>;
    /// Follower ids of `user`, newest edge first, in one statement.
    fn follower_ids(&self, user: UserId) -> RepoResult<Vec<UserId>>;
}

#[derive(Clone, Copy)]
pub struct SqliteFriendshipRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFriendshipRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["friendships"])?;
        Ok(Self { conn })
    }
}

impl FriendshipRepository for SqliteFriendshipRepository<'_> {
    fn insert_edge(&self, from: UserId, to: UserId, created_at: i64) -> RepoResult<FollowEdge> {
        self.conn
            .execute(
                "INSERT INTO friendships (from_user_id, to_user_id, created_at)
                 VALUES (?1, ?2, ?3);",
                params![from, to, created_at],
            )
            .map_err(|err| map_unique_violation(err, FOLLOW_EDGE_CONSTRAINT))?;

        Ok(FollowEdge {
            id: self.conn.last_insert_rowid(),
            from_user_id: from,
            to_user_id: to,
            created_at,
        })
    }

    fn delete_edge(&self, from: UserId, to: UserId) -> RepoResult<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM friendships WHERE from_user_id = ?1 AND to_user_id = ?2;",
            params![from, to],
        )?;
        Ok(deleted)
    }

    fn edge_exists(&self, from: UserId, to: UserId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM friendships WHERE from_user_id = ?1 AND to_user_id = ?2
            );",
            params![from, to],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn follower_edges(&self, user: UserId) -> RepoResult<Vec<FollowEdge>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, from_user_id, to_user_id, created_at
             FROM friendships
             WHERE to_user_id = ?1
               AND from_user_id IS NOT NULL
             ORDER BY created_at DESC, id DESC;",
        )?;
        let edges = stmt
            .query_map([user], parse_edge_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(edges)
    }

    fn following_edges(&self, user: UserId) -> RepoResult<Vec<FollowEdge>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, from_user_id, to_user_id, created_at
             FROM friendships
             WHERE from_user_id = ?1
               AND to_user_id IS NOT NULL
             ORDER BY created_at DESC, id DESC;",
        )?;
        let edges = stmt
            .query_map([user], parse_edge_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(edges)
    }

    fn follower_ids(&self, user: UserId) -> RepoResult<Vec<UserId>> {
        let mut stmt = self.conn.prepare(
            "SELECT from_user_id
             FROM friendships
             WHERE to_user_id = ?1
               AND from_user_id IS NOT NULL
             ORDER BY created_at DESC, id DESC;",
        )?;
        let ids = stmt
            .query_map([user], |row| row.get(0))?
            .collect::<Result<Vec<UserId>, _>>()?;
        Ok(ids)
    }
}

fn parse_edge_row(row: &Row<'_>) -> rusqlite::Result<FollowEdge> {
    Ok(FollowEdge {
        id: row.get("id")?,
        from_user_id: row.get("from_user_id")?,
        to_user_id: row.get("to_user_id")?,
        created_at: row.get("created_at")?,
    })
}
