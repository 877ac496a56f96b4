//! Comment use-case service.
//!
//! # Invariants
//! - Comments can only target an existing tweet.
//! - Only the author may edit or delete a comment.
//! - The comment is stored before the notification hook runs.

use crate::model::comment::{Comment, CommentId, NewComment};
use crate::model::now_epoch_ms;
use crate::model::tweet::TweetId;
use crate::model::user::UserId;
use crate::model::validation::{
    normalize_content, validate_content, ValidationError, MIN_COMMENT_CHARS,
};
use crate::repo::comment_repo::CommentRepository;
use crate::repo::tweet_repo::TweetRepository;
use crate::repo::RepoError;
use crate::service::hooks::CommentCreatedHook;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum CommentServiceError {
    TweetNotFound(TweetId),
    CommentNotFound(CommentId),
    /// Actor is not the comment author.
    NotOwner {
        comment_id: CommentId,
        actor: UserId,
    },
    Validation(ValidationError),
    Storage(RepoError),
}

impl Display for CommentServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TweetNotFound(id) => write!(f, "tweet not found: {id}"),
            Self::CommentNotFound(id) => write!(f, "comment not found: {id}"),
            Self::NotOwner { comment_id, actor } => {
                write!(f, "user {actor} does not own comment {comment_id}")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CommentServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CommentServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound {
                entity: "comment",
                id,
            } => Self::CommentNotFound(id),
            other => Self::Storage(other),
        }
    }
}

pub type CommentServiceResult<T> = Result<T, CommentServiceError>;

pub struct CommentService<C: CommentRepository, T: TweetRepository, H: CommentCreatedHook> {
    comments: C,
    tweets: T,
    hook: H,
}

impl<C, T, H> CommentService<C, T, H>
where
    C: CommentRepository,
    T: TweetRepository,
    H: CommentCreatedHook,
{
    pub fn new(comments: C, tweets: T, hook: H) -> Self {
        Self {
            comments,
            tweets,
            hook,
        }
    }

    pub fn create_comment(
        &self,
        author_id: UserId,
        tweet_id: TweetId,
        content: impl Into<String>,
    ) -> CommentServiceResult<Comment> {
        let new_comment = NewComment::new(author_id, tweet_id, content);
        new_comment
            .validate()
            .map_err(CommentServiceError::Validation)?;
        if self.tweets.get_tweet(tweet_id)?.is_none() {
            return Err(CommentServiceError::TweetNotFound(tweet_id));
        }

        let comment = self.comments.create_comment(&new_comment)?;
        self.hook.on_comment_created(&comment);
        Ok(comment)
    }

    /// Comments on `tweet_id`, oldest first.
    pub fn list_comments(&self, tweet_id: TweetId) -> CommentServiceResult<Vec<Comment>> {
        Ok(self.comments.list_for_tweet(tweet_id)?)
    }

    pub fn update_comment(
        &self,
        actor: UserId,
        comment_id: CommentId,
        content: &str,
    ) -> CommentServiceResult<Comment> {
        let content = normalize_content(content);
        validate_content(&content, MIN_COMMENT_CHARS).map_err(CommentServiceError::Validation)?;
        self.require_owned(actor, comment_id)?;
        self.comments
            .update_content(comment_id, &content, now_epoch_ms())?;
        self.comments
            .get_comment(comment_id)?
            .ok_or(CommentServiceError::CommentNotFound(comment_id))
    }

    pub fn delete_comment(&self, actor: UserId, comment_id: CommentId) -> CommentServiceResult<()> {
        self.require_owned(actor, comment_id)?;
        self.comments.delete_comment(comment_id)?;
        Ok(())
    }

    fn require_owned(&self, actor: UserId, comment_id: CommentId) -> CommentServiceResult<Comment> {
        let comment = self
            .comments
            .get_comment(comment_id)?
            .ok_or(CommentServiceError::CommentNotFound(comment_id))?;
        if comment.author_id != actor {
            return Err(CommentServiceError::NotOwner { comment_id, actor });
        }
        Ok(comment)
    }
}
