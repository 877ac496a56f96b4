//! Core of the social newsfeed backend.
//!
//! Owns the push-based fan-out pipeline (tweet -> follower timelines), the
//! social graph queries it depends on, timeline reads and comment/like
//! notifications. Storage is SQLite behind repository traits.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{report_fallbacks, ConfigFallback, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::comment::{Comment, CommentId, NewComment};
pub use model::content::ContentRef;
pub use model::friendship::{FollowEdge, FollowListing};
pub use model::like::Like;
pub use model::newsfeed::{NewNewsfeedEntry, NewsfeedEntry, NewsfeedItem};
pub use model::notification::{Notification, NotificationRequest, SubjectKind};
pub use model::tweet::{NewTweet, Tweet, TweetId};
pub use model::user::{NewUser, User, UserId};
pub use model::validation::ValidationError;
pub use repo::comment_repo::{CommentRepository, SqliteCommentRepository};
pub use repo::friendship_repo::{FriendshipRepository, SqliteFriendshipRepository};
pub use repo::like_repo::{LikeRepository, SqliteLikeRepository};
pub use repo::newsfeed_repo::{NewsfeedRepository, SqliteNewsfeedRepository};
pub use repo::notification_repo::{NotificationRepository, SqliteNotificationRepository};
pub use repo::tweet_repo::{SqliteTweetRepository, TweetRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{PageQuery, RepoError, RepoResult};
pub use service::comment_service::{CommentService, CommentServiceError};
pub use service::friendship_service::{FriendshipService, FriendshipServiceError};
pub use service::hooks::{CommentCreatedHook, LikeCreatedHook, NoopHook, TweetCreatedHook};
pub use service::like_service::{LikeOutcome, LikeService, LikeServiceError};
pub use service::newsfeed_service::{FanoutReport, NewsfeedService, NewsfeedServiceError};
pub use service::notification_service::{NotificationService, NotificationServiceError};
pub use service::tweet_service::{TweetCreated, TweetService, TweetServiceError};
pub use service::user_service::{UserService, UserServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
