//! Fan-out engine and newsfeed reader.
//!
//! # Responsibility
//! - Push a new tweet into the author's and every follower's timeline.
//! - Serve one user's materialized timeline, newest first.
//!
//! # Invariants
//! - Fan-out costs one follower lookup plus one bulk insert, independent of
//!   follower count.
//! - The author always receives an entry, even with zero followers.
//! - Fan-out is idempotent: running it again for the same tweet inserts
//!   nothing new.
//! - A failed batch leaves no entries behind; the error is returned, never
//!   retried here.
//! - Readers only ever see the requesting owner's entries.

use crate::model::newsfeed::{NewNewsfeedEntry, NewsfeedEntry, NewsfeedItem};
use crate::model::tweet::{Tweet, TweetId};
use crate::model::user::UserId;
use crate::repo::friendship_repo::FriendshipRepository;
use crate::repo::newsfeed_repo::NewsfeedRepository;
use crate::repo::tweet_repo::TweetRepository;
use crate::repo::{PageQuery, RepoError};
use crate::service::hooks::TweetCreatedHook;
use log::{error, info};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

#[derive(Debug)]
pub enum NewsfeedServiceError {
    /// Follower lookup, batch write or feed read failed.
    Storage(RepoError),
}

impl Display for NewsfeedServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "newsfeed storage failure: {err}"),
        }
    }
}

impl Error for NewsfeedServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<RepoError> for NewsfeedServiceError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

pub type NewsfeedServiceResult<T> = Result<T, NewsfeedServiceError>;

/// Outcome of one fan-out call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanoutReport {
    pub tweet_id: TweetId,
    /// Timelines targeted, author included.
    pub recipients: usize,
    /// Rows actually written; 0 when the fan-out was already applied.
    pub inserted: usize,
}

pub struct NewsfeedService<G: FriendshipRepository, N: NewsfeedRepository, T: TweetRepository> {
    graph: G,
    feeds: N,
    tweets: T,
}

impl<G, N, T> NewsfeedService<G, N, T>
where
    G: FriendshipRepository,
    N: NewsfeedRepository,
    T: TweetRepository,
{
    pub fn new(graph: G, feeds: N, tweets: T) -> Self {
        Self {
            graph,
            feeds,
            tweets,
        }
    }

    /// Materializes `tweet` into its author's and followers' timelines.
    ///
    /// # Errors
    /// - `Storage` when the follower lookup or the batch write fails. No
    ///   partial batch is visible in that case.
    pub fn fanout_to_followers(&self, tweet: &Tweet) -> NewsfeedServiceResult<FanoutReport> {
        let started_at = Instant::now();

        let follower_ids = self.graph.follower_ids(tweet.author_id).map_err(|err| {
            error!(
                "event=newsfeed_fanout module=newsfeed status=error tweet_id={} stage=followers error={}",
                tweet.id, err
            );
            err
        })?;

        let entries = build_fanout_batch(tweet, &follower_ids);
        let inserted = self.feeds.bulk_insert(&entries).map_err(|err| {
            error!(
                "event=newsfeed_fanout module=newsfeed status=error tweet_id={} stage=bulk_insert recipients={} error={}",
                tweet.id,
                entries.len(),
                err
            );
            err
        })?;

        info!(
            "event=newsfeed_fanout module=newsfeed status=ok tweet_id={} author_id={} recipients={} inserted={} duration_ms={}",
            tweet.id,
            tweet.author_id,
            entries.len(),
            inserted,
            started_at.elapsed().as_millis()
        );

        Ok(FanoutReport {
            tweet_id: tweet.id,
            recipients: entries.len(),
            inserted,
        })
    }

    /// Returns `owner`'s timeline, newest first.
    pub fn list_newsfeed(
        &self,
        owner: UserId,
        page: &PageQuery,
    ) -> NewsfeedServiceResult<Vec<NewsfeedEntry>> {
        Ok(self.feeds.list_for_owner(owner, page)?)
    }

    /// Returns `owner`'s timeline with tweets resolved by one bulk lookup.
    ///
    /// The store already drops entries of deleted or orphaned tweets before
    /// paging, so this page has the same entries as [`Self::list_newsfeed`].
    pub fn list_newsfeed_with_tweets(
        &self,
        owner: UserId,
        page: &PageQuery,
    ) -> NewsfeedServiceResult<Vec<NewsfeedItem>> {
        let entries = self.feeds.list_for_owner(owner, page)?;
        let tweet_ids: Vec<TweetId> = entries.iter().map(|entry| entry.tweet_id).collect();
        let mut tweets: HashMap<TweetId, Tweet> = self
            .tweets
            .tweets_by_ids(&tweet_ids)?
            .into_iter()
            .map(|tweet| (tweet.id, tweet))
            .collect();

        Ok(entries
            .into_iter()
            .filter_map(|entry| {
                tweets
                    .remove(&entry.tweet_id)
                    .map(|tweet| NewsfeedItem { entry, tweet })
            })
            .collect())
    }
}

impl<G, N, T> TweetCreatedHook for NewsfeedService<G, N, T>
where
    G: FriendshipRepository,
    N: NewsfeedRepository,
    T: TweetRepository,
{
    fn on_tweet_created(&self, tweet: &Tweet) -> NewsfeedServiceResult<FanoutReport> {
        self.fanout_to_followers(tweet)
    }
}

/// One entry per distinct follower plus the author's own entry.
fn build_fanout_batch(tweet: &Tweet, follower_ids: &[UserId]) -> Vec<NewNewsfeedEntry> {
    let mut seen = HashSet::with_capacity(follower_ids.len() + 1);
    let mut entries = Vec::with_capacity(follower_ids.len() + 1);

    for owner in std::iter::once(tweet.author_id).chain(follower_ids.iter().copied()) {
        if seen.insert(owner) {
            entries.push(NewNewsfeedEntry::for_tweet(owner, tweet));
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::build_fanout_batch;
    use crate::model::tweet::Tweet;

    fn tweet(author_id: i64) -> Tweet {
        Tweet {
            id: 42,
            author_id,
            content: "hello".to_string(),
            created_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn batch_includes_author_when_no_followers() {
        let batch = build_fanout_batch(&tweet(1), &[]);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].owner_user_id, 1);
        assert_eq!(batch[0].tweet_id, 42);
        assert_eq!(batch[0].created_at, 1_700_000_000_000);
    }

    #[test]
    fn batch_collapses_duplicate_owners() {
        let batch = build_fanout_batch(&tweet(1), &[2, 3, 2, 1]);
        let owners: Vec<i64> = batch.iter().map(|entry| entry.owner_user_id).collect();
        assert_eq!(owners, vec![1, 2, 3]);
    }
}
