//! Tweet use-case service.
//!
//! # Invariants
//! - A tweet is stored before fan-out starts. When fan-out fails the tweet
//!   stays durable and the error names it so the caller can retry fan-out.

use crate::model::tweet::{NewTweet, Tweet, TweetId};
use crate::model::user::UserId;
use crate::model::validation::ValidationError;
use crate::repo::tweet_repo::TweetRepository;
use crate::repo::{PageQuery, RepoError};
use crate::service::hooks::TweetCreatedHook;
use crate::service::newsfeed_service::{FanoutReport, NewsfeedServiceError};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum TweetServiceError {
    Validation(ValidationError),
    Storage(RepoError),
    /// The tweet was stored but pushing it into timelines failed.
    Fanout {
        tweet_id: TweetId,
        source: NewsfeedServiceError,
    },
}

impl Display for TweetServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Fanout { tweet_id, source } => {
                write!(f, "fan-out failed for tweet {tweet_id}: {source}")
            }
        }
    }
}

impl Error for TweetServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Fanout { source, .. } => Some(source),
        }
    }
}

impl From<RepoError> for TweetServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Storage(other),
        }
    }
}

/// Stored tweet plus the fan-out it triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweetCreated {
    pub tweet: Tweet,
    pub fanout: FanoutReport,
}

pub struct TweetService<T: TweetRepository, H: TweetCreatedHook> {
    repo: T,
    hook: H,
}

impl<T: TweetRepository, H: TweetCreatedHook> TweetService<T, H> {
    pub fn new(repo: T, hook: H) -> Self {
        Self { repo, hook }
    }

    /// Stores a tweet and fans it out to the author's followers.
    pub fn create_tweet(
        &self,
        author_id: UserId,
        content: impl Into<String>,
    ) -> Result<TweetCreated, TweetServiceError> {
        let new_tweet = NewTweet::new(author_id, content);
        new_tweet.validate().map_err(TweetServiceError::Validation)?;

        let tweet = self.repo.create_tweet(&new_tweet)?;
        let fanout = self
            .hook
            .on_tweet_created(&tweet)
            .map_err(|source| TweetServiceError::Fanout {
                tweet_id: tweet.id,
                source,
            })?;

        Ok(TweetCreated { tweet, fanout })
    }

    pub fn get_tweet(&self, id: TweetId) -> Result<Option<Tweet>, TweetServiceError> {
        Ok(self.repo.get_tweet(id)?)
    }

    /// Author's tweets, newest first.
    pub fn list_tweets(
        &self,
        author_id: UserId,
        page: &PageQuery,
    ) -> Result<Vec<Tweet>, TweetServiceError> {
        Ok(self.repo.list_by_author(author_id, page)?)
    }
}
