//! References to likeable/notifiable content.

use super::comment::CommentId;
use super::tweet::TweetId;
use serde::{Deserialize, Serialize};

/// Id of a tweet or comment, tagged by kind.
///
/// Serialized as `{"content_type": "tweet", "object_id": 7}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "content_type", content = "object_id", rename_all = "snake_case")]
pub enum ContentRef {
    Tweet(TweetId),
    Comment(CommentId),
}

impl ContentRef {
    /// Storage discriminator stored in `*_kind` columns.
    pub fn kind_str(self) -> &'static str {
        match self {
            Self::Tweet(_) => "tweet",
            Self::Comment(_) => "comment",
        }
    }

    pub fn id(self) -> i64 {
        match self {
            Self::Tweet(id) | Self::Comment(id) => id,
        }
    }

    /// Rebuilds a reference from its storage columns.
    pub fn from_parts(kind: &str, id: i64) -> Option<Self> {
        match kind {
            "tweet" => Some(Self::Tweet(id)),
            "comment" => Some(Self::Comment(id)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ContentRef;

    #[test]
    fn storage_parts_are_symmetric() {
        for reference in [ContentRef::Tweet(3), ContentRef::Comment(9)] {
            let rebuilt = ContentRef::from_parts(reference.kind_str(), reference.id());
            assert_eq!(rebuilt, Some(reference));
        }
        assert_eq!(ContentRef::from_parts("twet", 1), None);
    }
}
