//! Like use-case service.
//!
//! # Invariants
//! - Liking the same target twice keeps one like and dispatches one
//!   notification.
//! - Likes can only target an existing tweet or comment.

use crate::model::content::ContentRef;
use crate::model::like::Like;
use crate::model::now_epoch_ms;
use crate::model::user::UserId;
use crate::repo::comment_repo::CommentRepository;
use crate::repo::like_repo::LikeRepository;
use crate::repo::tweet_repo::TweetRepository;
use crate::repo::RepoError;
use crate::service::hooks::LikeCreatedHook;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum LikeServiceError {
    TargetNotFound(ContentRef),
    Storage(RepoError),
}

impl Display for LikeServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TargetNotFound(target) => {
                write!(f, "{} not found: {}", target.kind_str(), target.id())
            }
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LikeServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::TargetNotFound(_) => None,
        }
    }
}

impl From<RepoError> for LikeServiceError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

pub type LikeServiceResult<T> = Result<T, LikeServiceError>;

/// Result of a like request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeOutcome {
    pub like: Like,
    /// `false` when the user had already liked the target.
    pub created: bool,
}

pub struct LikeService<L, T, C, H>
where
    L: LikeRepository,
    T: TweetRepository,
    C: CommentRepository,
    H: LikeCreatedHook,
{
    likes: L,
    tweets: T,
    comments: C,
    hook: H,
}

impl<L, T, C, H> LikeService<L, T, C, H>
where
    L: LikeRepository,
    T: TweetRepository,
    C: CommentRepository,
    H: LikeCreatedHook,
{
    pub fn new(likes: L, tweets: T, comments: C, hook: H) -> Self {
        Self {
            likes,
            tweets,
            comments,
            hook,
        }
    }

    pub fn like(&self, user: UserId, target: ContentRef) -> LikeServiceResult<LikeOutcome> {
        self.require_target(target)?;

        let (like, created) = self.likes.insert_like(user, target, now_epoch_ms())?;
        if created {
            self.hook.on_like_created(&like);
        }
        Ok(LikeOutcome { like, created })
    }

    /// Removes the like if present; returns 0 or 1.
    pub fn cancel_like(&self, user: UserId, target: ContentRef) -> LikeServiceResult<usize> {
        self.require_target(target)?;
        Ok(self.likes.delete_like(user, target)?)
    }

    pub fn has_liked(&self, user: UserId, target: ContentRef) -> LikeServiceResult<bool> {
        Ok(self.likes.get_like(user, target)?.is_some())
    }

    pub fn like_count(&self, target: ContentRef) -> LikeServiceResult<u64> {
        Ok(self.likes.count_for_target(target)?)
    }

    fn require_target(&self, target: ContentRef) -> LikeServiceResult<()> {
        let exists = match target {
            ContentRef::Tweet(id) => self.tweets.get_tweet(id)?.is_some(),
            ContentRef::Comment(id) => self.comments.get_comment(id)?.is_some(),
        };
        if exists {
            Ok(())
        } else {
            Err(LikeServiceError::TargetNotFound(target))
        }
    }
}
