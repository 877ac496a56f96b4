//! Comments on tweets. A comment always targets a tweet, never another comment.

use super::now_epoch_ms;
use super::tweet::TweetId;
use super::user::UserId;
use super::validation::{normalize_content, validate_content, ValidationError, MIN_COMMENT_CHARS};
use serde::{Deserialize, Serialize};

pub type CommentId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub author_id: UserId,
    pub tweet_id: TweetId,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub author_id: UserId,
    pub tweet_id: TweetId,
    pub content: String,
    pub created_at: i64,
}

impl NewComment {
    pub fn new(author_id: UserId, tweet_id: TweetId, content: impl Into<String>) -> Self {
        Self {
            author_id,
            tweet_id,
            content: normalize_content(content),
            created_at: now_epoch_ms(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_content(&self.content, MIN_COMMENT_CHARS)
    }
}
