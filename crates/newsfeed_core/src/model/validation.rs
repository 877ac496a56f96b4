//! Validation errors shared by user, tweet and comment payloads.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum characters for tweet and comment bodies, counted after trimming.
pub const MAX_CONTENT_CHARS: usize = 140;
/// Minimum characters for a tweet body, counted after trimming.
pub const MIN_TWEET_CHARS: usize = 6;
/// Minimum characters for a comment body, counted after trimming.
pub const MIN_COMMENT_CHARS: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Username is empty, too long or uses unsupported characters.
    InvalidUsername(String),
    /// Body is blank after trimming.
    EmptyContent,
    /// Trimmed body is shorter than the kind's minimum.
    ContentTooShort { min_chars: usize, actual_chars: usize },
    /// Trimmed body exceeds `MAX_CONTENT_CHARS`.
    ContentTooLong { max_chars: usize, actual_chars: usize },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUsername(value) => write!(f, "invalid username `{value}`"),
            Self::EmptyContent => write!(f, "content must not be blank"),
            Self::ContentTooShort {
                min_chars,
                actual_chars,
            } => write!(
                f,
                "content has {actual_chars} characters, minimum is {min_chars}"
            ),
            Self::ContentTooLong {
                max_chars,
                actual_chars,
            } => write!(
                f,
                "content has {actual_chars} characters, limit is {max_chars}"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Checks a body against `min_chars..=MAX_CONTENT_CHARS`.
///
/// Lengths are counted in chars on the trimmed text; callers store the
/// trimmed text (see [`normalize_content`]).
pub fn validate_content(content: &str, min_chars: usize) -> Result<(), ValidationError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    let actual_chars = trimmed.chars().count();
    if actual_chars < min_chars {
        return Err(ValidationError::ContentTooShort {
            min_chars,
            actual_chars,
        });
    }
    if actual_chars > MAX_CONTENT_CHARS {
        return Err(ValidationError::ContentTooLong {
            max_chars: MAX_CONTENT_CHARS,
            actual_chars,
        });
    }
    Ok(())
}

/// Body as it is stored: surrounding whitespace removed.
pub fn normalize_content(content: impl Into<String>) -> String {
    let content = content.into();
    let trimmed = content.trim();
    if trimmed.len() == content.len() {
        content
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_content_is_rejected() {
        assert_eq!(
            validate_content("  \n", MIN_COMMENT_CHARS),
            Err(ValidationError::EmptyContent)
        );
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        let at_limit = "é".repeat(MAX_CONTENT_CHARS);
        assert!(validate_content(&at_limit, MIN_TWEET_CHARS).is_ok());

        let over = "x".repeat(MAX_CONTENT_CHARS + 1);
        assert_eq!(
            validate_content(&over, MIN_TWEET_CHARS),
            Err(ValidationError::ContentTooLong {
                max_chars: MAX_CONTENT_CHARS,
                actual_chars: MAX_CONTENT_CHARS + 1,
            })
        );
    }

    #[test]
    fn surrounding_whitespace_does_not_count() {
        let padded = format!("  {}  \n", "x".repeat(MAX_CONTENT_CHARS));
        assert!(validate_content(&padded, MIN_TWEET_CHARS).is_ok());

        assert_eq!(
            validate_content("  hello  ", MIN_TWEET_CHARS),
            Err(ValidationError::ContentTooShort {
                min_chars: MIN_TWEET_CHARS,
                actual_chars: 5,
            })
        );
        assert!(validate_content("  hello!  ", MIN_TWEET_CHARS).is_ok());
        assert!(validate_content(" k ", MIN_COMMENT_CHARS).is_ok());
    }

    #[test]
    fn normalize_trims_both_ends() {
        assert_eq!(normalize_content("  hi there \n"), "hi there");
        assert_eq!(normalize_content("as is"), "as is");
    }
}
