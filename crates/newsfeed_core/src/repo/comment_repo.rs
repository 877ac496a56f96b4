//! Comment store contracts and SQLite implementation.
//!
//! # Invariants
//! - Comments per tweet are listed oldest first (`created_at ASC, id ASC`).
//! - Comments whose author or tweet was deleted are not returned.

use super::schema::ensure_connection_ready;
use super::{RepoError, RepoResult};
use crate::model::comment::{Comment, CommentId, NewComment};
use crate::model::tweet::TweetId;
use crate::model::validation::{validate_content, MIN_COMMENT_CHARS};
use rusqlite::{params, Connection, OptionalExtension, Row};

const COMMENT_SELECT_SQL: &str =
    "SELECT id, author_id, tweet_id, content, created_at, updated_at FROM comments";

pub trait CommentRepository {
    fn create_comment(&self, comment: &NewComment) -> RepoResult<Comment>;
    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>>;
    fn list_for_tweet(&self, tweet_id: TweetId) -> RepoResult<Vec<Comment>>;
    fn update_content(&self, id: CommentId, content: &str, updated_at: i64) -> RepoResult<()>;
    fn delete_comment(&self, id: CommentId) -> RepoResult<usize>;
}

#[derive(Clone, Copy)]
pub struct SqliteCommentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCommentRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["comments"])?;
        Ok(Self { conn })
    }
}

impl CommentRepository for SqliteCommentRepository<'_> {
    fn create_comment(&self, comment: &NewComment) -> RepoResult<Comment> {
        comment.validate()?;

        self.conn.execute(
            "INSERT INTO comments (author_id, tweet_id, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4);",
            params![
                comment.author_id,
                comment.tweet_id,
                comment.content,
                comment.created_at
            ],
        )?;

        Ok(Comment {
            id: self.conn.last_insert_rowid(),
            author_id: comment.author_id,
            tweet_id: comment.tweet_id,
            content: comment.content.clone(),
            created_at: comment.created_at,
            updated_at: comment.created_at,
        })
    }

    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        let comment = self
            .conn
            .query_row(
                &format!(
                    "{COMMENT_SELECT_SQL}
                     WHERE id = ?1
                       AND author_id IS NOT NULL
                       AND tweet_id IS NOT NULL;"
                ),
                [id],
                parse_comment_row,
            )
            .optional()?;
        Ok(comment)
    }

    fn list_for_tweet(&self, tweet_id: TweetId) -> RepoResult<Vec<Comment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COMMENT_SELECT_SQL}
             WHERE tweet_id = ?1
               AND author_id IS NOT NULL
             ORDER BY created_at ASC, id ASC;"
        ))?;
        let comments = stmt
            .query_map([tweet_id], parse_comment_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(comments)
    }

    fn update_content(&self, id: CommentId, content: &str, updated_at: i64) -> RepoResult<()> {
        let content = content.trim();
        validate_content(content, MIN_COMMENT_CHARS)?;

        let changed = self.conn.execute(
            "UPDATE comments
             SET content = ?2,
                 updated_at = ?3
             WHERE id = ?1
               AND author_id IS NOT NULL;",
            params![id, content, updated_at],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "comment",
                id,
            });
        }
        Ok(())
    }

    fn delete_comment(&self, id: CommentId) -> RepoResult<usize> {
        let deleted = self
            .conn
            .execute("DELETE FROM comments WHERE id = ?1;", [id])?;
        Ok(deleted)
    }
}

fn parse_comment_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get("id")?,
        author_id: row.get("author_id")?,
        tweet_id: row.get("tweet_id")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
