//! Inbox notifications produced by comments and likes.
//!
//! # Invariants
//! - A notification is never addressed to the user who caused it.

use super::content::ContentRef;
use super::user::UserId;
use serde::{Deserialize, Serialize};

pub type NotificationId = i64;

/// What happened to the recipient's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Comment,
    Like,
}

impl SubjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Like => "like",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "comment" => Some(Self::Comment),
            "like" => Some(Self::Like),
            _ => None,
        }
    }
}

/// Write payload handed to the notification store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub recipient_user_id: UserId,
    pub actor_user_id: UserId,
    pub subject_kind: SubjectKind,
    /// Id of the comment or like that triggered the notification.
    pub subject_id: i64,
    /// Content owned by the recipient that was acted upon.
    pub target: ContentRef,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_user_id: UserId,
    pub actor_user_id: UserId,
    pub subject_kind: SubjectKind,
    pub subject_id: i64,
    pub target: ContentRef,
    pub unread: bool,
    pub created_at: i64,
}
