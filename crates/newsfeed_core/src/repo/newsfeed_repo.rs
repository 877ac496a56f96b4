//! Newsfeed store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist fan-out batches atomically.
//! - Serve one owner's timeline in recency order.
//!
//! # Invariants
//! - `bulk_insert` runs in one `IMMEDIATE` transaction: a batch is either
//!   fully visible or not visible at all. Owners of the same tweet go in with
//!   one `INSERT ... SELECT FROM rarray(?)` statement, so a fan-out batch is a
//!   single statement whatever its size.
//! - Re-inserting an existing `(owner_user_id, tweet_id)` pair is ignored, so
//!   a retried fan-out adds nothing.
//! - Reads filter on `owner_user_id` in SQL; no other owner's rows are loaded.
//! - Timeline order is `created_at DESC, id DESC`.
//! - Entries whose tweet was deleted or lost its author are filtered before
//!   `LIMIT/OFFSET`, so every page is full while older entries remain.

use super::schema::ensure_connection_ready;
use super::{id_array, PageQuery, RepoResult};
use crate::model::newsfeed::{NewNewsfeedEntry, NewsfeedEntry};
use crate::model::tweet::TweetId;
use crate::model::user::UserId;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

pub const NEWSFEED_DEFAULT_LIMIT: u32 = 20;
pub const NEWSFEED_LIMIT_MAX: u32 = 100;

pub trait NewsfeedRepository {
    /// Writes a whole batch atomically and returns the number of new rows.
    fn bulk_insert(&self, entries: &[NewNewsfeedEntry]) -> RepoResult<usize>;
    fn list_for_owner(&self, owner: UserId, page: &PageQuery) -> RepoResult<Vec<NewsfeedEntry>>;
    fn get_entry(&self, owner: UserId, tweet_id: TweetId) -> RepoResult<Option<NewsfeedEntry>>;
}

#[derive(Clone, Copy)]
pub struct SqliteNewsfeedRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNewsfeedRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["newsfeeds"])?;
        Ok(Self { conn })
    }
}

impl NewsfeedRepository for SqliteNewsfeedRepository<'_> {
    fn bulk_insert(&self, entries: &[NewNewsfeedEntry]) -> RepoResult<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO newsfeeds (owner_user_id, tweet_id, created_at)
                 SELECT value, ?2, ?3
                 FROM rarray(?1);",
            )?;
            for (tweet_id, created_at, owners) in group_by_tweet(entries) {
                inserted += stmt.execute(params![id_array(&owners), tweet_id, created_at])?;
            }
        }
        tx.commit()?;

        Ok(inserted)
    }

    fn list_for_owner(&self, owner: UserId, page: &PageQuery) -> RepoResult<Vec<NewsfeedEntry>> {
        let limit = page.effective_limit(NEWSFEED_DEFAULT_LIMIT, NEWSFEED_LIMIT_MAX);
        let mut stmt = self.conn.prepare(
            "SELECT id, owner_user_id, tweet_id, created_at
             FROM newsfeeds
             WHERE owner_user_id = ?1
               AND tweet_id IS NOT NULL
               AND tweet_id NOT IN (SELECT id FROM tweets WHERE author_id IS NULL)
             ORDER BY created_at DESC, id DESC
             LIMIT ?2 OFFSET ?3;",
        )?;
        let entries = stmt
            .query_map(params![owner, limit, page.offset], parse_entry_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn get_entry(&self, owner: UserId, tweet_id: TweetId) -> RepoResult<Option<NewsfeedEntry>> {
        let entry = self
            .conn
            .query_row(
                "SELECT id, owner_user_id, tweet_id, created_at
                 FROM newsfeeds
                 WHERE owner_user_id = ?1 AND tweet_id = ?2;",
                params![owner, tweet_id],
                parse_entry_row,
            )
            .optional()?;
        Ok(entry)
    }
}

/// Owners per `(tweet_id, created_at)`, in first-seen order.
fn group_by_tweet(entries: &[NewNewsfeedEntry]) -> Vec<(TweetId, i64, Vec<UserId>)> {
    let mut groups: Vec<(TweetId, i64, Vec<UserId>)> = Vec::new();
    for entry in entries {
        let existing = groups.iter_mut().find(|(tweet_id, created_at, _)| {
            *tweet_id == entry.tweet_id && *created_at == entry.created_at
        });
        match existing {
            Some((_, _, owners)) => owners.push(entry.owner_user_id),
            None => groups.push((entry.tweet_id, entry.created_at, vec![entry.owner_user_id])),
        }
    }
    groups
}

fn parse_entry_row(row: &Row<'_>) -> rusqlite::Result<NewsfeedEntry> {
    Ok(NewsfeedEntry {
        id: row.get("id")?,
        owner_user_id: row.get("owner_user_id")?,
        tweet_id: row.get("tweet_id")?,
        created_at: row.get("created_at")?,
    })
}
