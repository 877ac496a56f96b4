//! Repository layer: storage contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access traits for every store the core
//!   talks to (accounts, tweets, social graph, newsfeeds, comments, likes,
//!   notifications).
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - Multi-row reads are issued as one statement. Id lists are bound through
//!   `rarray(?)`; nothing loops over single-row fetches and nothing joins the
//!   edge table with the user table.
//! - UNIQUE constraint violations surface as `RepoError::Conflict`, never as
//!   raw transport errors.
//! - Tombstoned rows (nulled user/tweet references) are filtered out of reads.

pub mod comment_repo;
pub mod friendship_repo;
pub mod like_repo;
pub mod newsfeed_repo;
pub mod notification_repo;
mod schema;
pub mod tweet_repo;
pub mod user_repo;

use crate::db::DbError;
use crate::model::validation::ValidationError;
use rusqlite::types::Value;
use rusqlite::{ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by every store.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Validation(ValidationError),
    NotFound {
        entity: &'static str,
        id: i64,
    },
    /// A UNIQUE constraint rejected the write. Carries the constraint name.
    Conflict(&'static str),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Conflict(constraint) => write!(f, "unique constraint violated: {constraint}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "repository requires table `{table}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Offset pagination shared by list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageQuery {
    /// Maximum rows to return. `None` or `Some(0)` selects the store default.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
}

impl PageQuery {
    pub fn first(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            offset: 0,
        }
    }

    /// Effective limit after applying `default` and clamping to `max`.
    pub fn effective_limit(&self, default: u32, max: u32) -> u32 {
        match self.limit {
            None | Some(0) => default,
            Some(value) => value.min(max),
        }
    }
}

/// Maps a UNIQUE violation to `Conflict(constraint)`; passes other errors through.
pub(crate) fn map_unique_violation(err: rusqlite::Error, constraint: &'static str) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepoError::Conflict(constraint)
        }
        _ => err.into(),
    }
}

/// Packs ids into a value bound to a single `rarray(?)` parameter.
pub(crate) fn id_array(ids: &[i64]) -> Rc<Vec<Value>> {
    Rc::new(ids.iter().copied().map(Value::from).collect())
}

pub(crate) fn bool_from_db(row: &Row<'_>, column: &str, table: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean `{other}` in {table}.{column}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::PageQuery;

    #[test]
    fn effective_limit_defaults_and_clamps() {
        assert_eq!(PageQuery::default().effective_limit(20, 100), 20);
        assert_eq!(PageQuery::first(0).effective_limit(20, 100), 20);
        assert_eq!(PageQuery::first(7).effective_limit(20, 100), 7);
        assert_eq!(PageQuery::first(500).effective_limit(20, 100), 100);
    }
}
