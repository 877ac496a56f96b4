//! Likes on tweets or comments. One like per user and target.

use super::content::ContentRef;
use super::user::UserId;
use serde::{Deserialize, Serialize};

pub type LikeId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub id: LikeId,
    pub user_id: UserId,
    pub target: ContentRef,
    pub created_at: i64,
}
