//! Tweet store contracts and SQLite implementation.
//!
//! # Invariants
//! - Tweets are append-only; there is no update path.
//! - Tweets whose author was deleted are not returned.
//! - Author listings are ordered `created_at DESC, id DESC`.

use super::schema::ensure_connection_ready;
use super::{id_array, PageQuery, RepoResult};
use crate::model::tweet::{NewTweet, Tweet, TweetId};
use crate::model::user::UserId;
use rusqlite::{params, Connection, OptionalExtension, Row};

const TWEET_SELECT_SQL: &str = "SELECT id, author_id, content, created_at FROM tweets";
const TWEETS_DEFAULT_LIMIT: u32 = 20;
const TWEETS_LIMIT_MAX: u32 = 100;

pub trait TweetRepository {
    fn create_tweet(&self, tweet: &NewTweet) -> RepoResult<Tweet>;
    fn get_tweet(&self, id: TweetId) -> RepoResult<Option<Tweet>>;
    /// Bulk lookup in one statement. Unknown ids are skipped; order is by id.
    fn tweets_by_ids(&self, ids: &[TweetId]) -> RepoResult<Vec<Tweet>>;
    fn list_by_author(&self, author_id: UserId, page: &PageQuery) -> RepoResult<Vec<Tweet>>;
}

#[derive(Clone, Copy)]
pub struct SqliteTweetRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTweetRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["tweets"])?;
        Ok(Self { conn })
    }
}

impl TweetRepository for SqliteTweetRepository<'_> {
    fn create_tweet(&self, tweet: &NewTweet) -> RepoResult<Tweet> {
        tweet.validate()?;

        self.conn.execute(
            "INSERT INTO tweets (author_id, content, created_at) VALUES (?1, ?2, ?3);",
            params![tweet.author_id, tweet.content, tweet.created_at],
        )?;

        Ok(Tweet {
            id: self.conn.last_insert_rowid(),
            author_id: tweet.author_id,
            content: tweet.content.clone(),
            created_at: tweet.created_at,
        })
    }

    fn get_tweet(&self, id: TweetId) -> RepoResult<Option<Tweet>> {
        let tweet = self
            .conn
            .query_row(
                &format!("{TWEET_SELECT_SQL} WHERE id = ?1 AND author_id IS NOT NULL;"),
                [id],
                parse_tweet_row,
            )
            .optional()?;
        Ok(tweet)
    }

    fn tweets_by_ids(&self, ids: &[TweetId]) -> RepoResult<Vec<Tweet>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            "{TWEET_SELECT_SQL}
             WHERE id IN rarray(?1)
               AND author_id IS NOT NULL
             ORDER BY id ASC;"
        ))?;
        let tweets = stmt
            .query_map([id_array(ids)], parse_tweet_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tweets)
    }

    fn list_by_author(&self, author_id: UserId, page: &PageQuery) -> RepoResult<Vec<Tweet>> {
        let limit = page.effective_limit(TWEETS_DEFAULT_LIMIT, TWEETS_LIMIT_MAX);
        let mut stmt = self.conn.prepare(&format!(
            "{TWEET_SELECT_SQL}
             WHERE author_id = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2 OFFSET ?3;"
        ))?;
        let tweets = stmt
            .query_map(params![author_id, limit, page.offset], parse_tweet_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tweets)
    }
}

fn parse_tweet_row(row: &Row<'_>) -> rusqlite::Result<Tweet> {
    Ok(Tweet {
        id: row.get("id")?,
        author_id: row.get("author_id")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
    })
}
