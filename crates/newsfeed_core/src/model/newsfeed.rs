//! Materialized home-timeline entries.
//!
//! # Invariants
//! - At most one entry exists per `(owner_user_id, tweet_id)`.
//! - `created_at` equals the referenced tweet's `created_at`.
//! - Entries hold ids only; tweet content is resolved through the tweet store.

use super::tweet::{Tweet, TweetId};
use super::user::UserId;
use serde::{Deserialize, Serialize};

pub type NewsfeedEntryId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsfeedEntry {
    pub id: NewsfeedEntryId,
    pub owner_user_id: UserId,
    pub tweet_id: TweetId,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewNewsfeedEntry {
    pub owner_user_id: UserId,
    pub tweet_id: TweetId,
    pub created_at: i64,
}

impl NewNewsfeedEntry {
    /// Entry placing `tweet` into `owner`'s timeline.
    pub fn for_tweet(owner_user_id: UserId, tweet: &Tweet) -> Self {
        Self {
            owner_user_id,
            tweet_id: tweet.id,
            created_at: tweet.created_at,
        }
    }
}

/// Feed entry joined in memory with its tweet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsfeedItem {
    pub entry: NewsfeedEntry,
    pub tweet: Tweet,
}
