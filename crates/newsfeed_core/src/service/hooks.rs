//! Inbound event seams between content use-cases and the fan-out/notification
//! pipelines.
//!
//! Content services only know these traits, so tests can swap in recording or
//! failing hooks without touching storage.

use crate::model::comment::Comment;
use crate::model::like::Like;
use crate::model::tweet::Tweet;
use crate::service::newsfeed_service::{FanoutReport, NewsfeedServiceError};

/// Invoked right after a tweet is durably stored.
pub trait TweetCreatedHook {
    fn on_tweet_created(&self, tweet: &Tweet) -> Result<FanoutReport, NewsfeedServiceError>;
}

/// Invoked right after a comment is stored. Must not fail the caller.
pub trait CommentCreatedHook {
    fn on_comment_created(&self, comment: &Comment);
}

/// Invoked right after a like is newly stored. Must not fail the caller.
pub trait LikeCreatedHook {
    fn on_like_created(&self, like: &Like);
}

impl<H: TweetCreatedHook + ?Sized> TweetCreatedHook for &H {
    fn on_tweet_created(&self, tweet: &Tweet) -> Result<FanoutReport, NewsfeedServiceError> {
        (**self).on_tweet_created(tweet)
    }
}

impl<H: CommentCreatedHook + ?Sized> CommentCreatedHook for &H {
    fn on_comment_created(&self, comment: &Comment) {
        (**self).on_comment_created(comment)
    }
}

impl<H: LikeCreatedHook + ?Sized> LikeCreatedHook for &H {
    fn on_like_created(&self, like: &Like) {
        (**self).on_like_created(like)
    }
}

/// Hook that does nothing; for callers that dispatch notifications elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl CommentCreatedHook for NoopHook {
    fn on_comment_created(&self, _comment: &Comment) {}
}

impl LikeCreatedHook for NoopHook {
    fn on_like_created(&self, _like: &Like) {}
}
