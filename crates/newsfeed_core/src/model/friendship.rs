//! Directed follow edges of the social graph.

use super::user::{User, UserId};
use serde::{Deserialize, Serialize};

pub type FriendshipId = i64;

/// `from_user_id` receives `to_user_id`'s tweets in their newsfeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowEdge {
    pub id: FriendshipId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub created_at: i64,
}

/// One row of a follower/following listing: the user on the far side of the
/// edge and when the edge was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowListing {
    pub user: User,
    pub created_at: i64,
}
