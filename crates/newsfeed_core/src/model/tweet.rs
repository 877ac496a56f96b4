//! Tweet records. Immutable once stored.

use super::now_epoch_ms;
use super::user::UserId;
use super::validation::{normalize_content, validate_content, ValidationError, MIN_TWEET_CHARS};
use serde::{Deserialize, Serialize};

pub type TweetId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: TweetId,
    pub author_id: UserId,
    pub content: String,
    /// Unix epoch milliseconds. Copied into every fanned-out feed entry.
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTweet {
    pub author_id: UserId,
    pub content: String,
    pub created_at: i64,
}

impl NewTweet {
    pub fn new(author_id: UserId, content: impl Into<String>) -> Self {
        Self {
            author_id,
            content: normalize_content(content),
            created_at: now_epoch_ms(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_content(&self.content, MIN_TWEET_CHARS)
    }
}
