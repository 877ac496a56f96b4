//! Account directory records.

use super::now_epoch_ms;
use super::validation::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub type UserId = i64;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.@+\-]{1,150}$").expect("valid username regex"));

/// Persisted account row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Payload for account creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub created_at: i64,
}

impl NewUser {
    /// Builds a payload stamped with the current time.
    pub fn new(username: impl Into<String>, email: Option<String>) -> Self {
        Self {
            username: username.into(),
            email,
            created_at: now_epoch_ms(),
        }
    }

    /// Usernames are 1-150 chars of letters, digits and `_ . @ + -`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if USERNAME_RE.is_match(&self.username) {
            Ok(())
        } else {
            Err(ValidationError::InvalidUsername(self.username.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NewUser;

    #[test]
    fn username_rules() {
        assert!(NewUser::new("lucky", None).validate().is_ok());
        assert!(NewUser::new("a.b+c@d-e_f", None).validate().is_ok());
        assert!(NewUser::new("", None).validate().is_err());
        assert!(NewUser::new("has space", None).validate().is_err());
        assert!(NewUser::new("x".repeat(151), None).validate().is_err());
    }
}
