//! Notification dispatcher and inbox reads.
//!
//! # Responsibility
//! - Notify content owners about comments and likes by other users.
//! - Expose the recipient's inbox (list, unread count, mark read).
//!
//! # Invariants
//! - Exactly one notification per dispatched event when actor != owner,
//!   none when they are equal.
//! - Hook entry points swallow and log failures; the triggering comment or
//!   like is never rolled back because of them.

use crate::model::comment::Comment;
use crate::model::content::ContentRef;
use crate::model::like::Like;
use crate::model::now_epoch_ms;
use crate::model::notification::{Notification, NotificationRequest, SubjectKind};
use crate::model::user::UserId;
use crate::repo::comment_repo::CommentRepository;
use crate::repo::notification_repo::NotificationRepository;
use crate::repo::tweet_repo::TweetRepository;
use crate::repo::{PageQuery, RepoError};
use crate::service::hooks::{CommentCreatedHook, LikeCreatedHook};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum NotificationServiceError {
    /// The content that was commented on or liked no longer exists.
    SubjectNotFound(ContentRef),
    Storage(RepoError),
}

impl Display for NotificationServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SubjectNotFound(target) => {
                write!(f, "{} not found: {}", target.kind_str(), target.id())
            }
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NotificationServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::SubjectNotFound(_) => None,
        }
    }
}

impl From<RepoError> for NotificationServiceError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

pub type NotificationServiceResult<T> = Result<T, NotificationServiceError>;

pub struct NotificationService<T, C, N>
where
    T: TweetRepository,
    C: CommentRepository,
    N: NotificationRepository,
{
    tweets: T,
    comments: C,
    notifications: N,
}

impl<T, C, N> NotificationService<T, C, N>
where
    T: TweetRepository,
    C: CommentRepository,
    N: NotificationRepository,
{
    pub fn new(tweets: T, comments: C, notifications: N) -> Self {
        Self {
            tweets,
            comments,
            notifications,
        }
    }

    /// Notifies the author of the commented tweet.
    ///
    /// Returns `Ok(None)` for a comment on one's own tweet.
    pub fn send_comment_notification(
        &self,
        comment: &Comment,
    ) -> NotificationServiceResult<Option<Notification>> {
        let target = ContentRef::Tweet(comment.tweet_id);
        let owner = self.owner_of(target)?;
        self.dispatch(owner, comment.author_id, SubjectKind::Comment, comment.id, target)
    }

    /// Notifies the owner of the liked tweet or comment.
    ///
    /// Returns `Ok(None)` for a like on one's own content.
    pub fn send_like_notification(
        &self,
        like: &Like,
    ) -> NotificationServiceResult<Option<Notification>> {
        let owner = self.owner_of(like.target)?;
        self.dispatch(owner, like.user_id, SubjectKind::Like, like.id, like.target)
    }

    /// Recipient inbox, newest first.
    pub fn list_notifications(
        &self,
        recipient: UserId,
        page: &PageQuery,
    ) -> NotificationServiceResult<Vec<Notification>> {
        Ok(self.notifications.list_for_recipient(recipient, page)?)
    }

    pub fn unread_count(&self, recipient: UserId) -> NotificationServiceResult<u64> {
        Ok(self.notifications.unread_count(recipient)?)
    }

    pub fn mark_all_read(&self, recipient: UserId) -> NotificationServiceResult<usize> {
        Ok(self.notifications.mark_all_read(recipient)?)
    }

    fn owner_of(&self, target: ContentRef) -> NotificationServiceResult<UserId> {
        let owner = match target {
            ContentRef::Tweet(id) => self.tweets.get_tweet(id)?.map(|tweet| tweet.author_id),
            ContentRef::Comment(id) => self
                .comments
                .get_comment(id)?
                .map(|comment| comment.author_id),
        };
        owner.ok_or(NotificationServiceError::SubjectNotFound(target))
    }

    fn dispatch(
        &self,
        recipient: UserId,
        actor: UserId,
        subject_kind: SubjectKind,
        subject_id: i64,
        target: ContentRef,
    ) -> NotificationServiceResult<Option<Notification>> {
        if recipient == actor {
            debug!(
                "event=notification_dispatch module=notification status=skipped reason=self subject={} subject_id={subject_id}",
                subject_kind.as_str()
            );
            return Ok(None);
        }

        let notification = self.notifications.create_notification(&NotificationRequest {
            recipient_user_id: recipient,
            actor_user_id: actor,
            subject_kind,
            subject_id,
            target,
            created_at: now_epoch_ms(),
        })?;
        debug!(
            "event=notification_dispatch module=notification status=ok subject={} subject_id={subject_id} recipient={recipient}",
            subject_kind.as_str()
        );
        Ok(Some(notification))
    }
}

impl<T, C, N> CommentCreatedHook for NotificationService<T, C, N>
where
    T: TweetRepository,
    C: CommentRepository,
    N: NotificationRepository,
{
    fn on_comment_created(&self, comment: &Comment) {
        if let Err(err) = self.send_comment_notification(comment) {
            warn!(
                "event=notification_dispatch module=notification status=error subject=comment subject_id={} error={}",
                comment.id, err
            );
        }
    }
}

impl<T, C, N> LikeCreatedHook for NotificationService<T, C, N>
where
    T: TweetRepository,
    C: CommentRepository,
    N: NotificationRepository,
{
    fn on_like_created(&self, like: &Like) {
        if let Err(err) = self.send_like_notification(like) {
            warn!(
                "event=notification_dispatch module=notification status=error subject=like subject_id={} error={}",
                like.id, err
            );
        }
    }
}
