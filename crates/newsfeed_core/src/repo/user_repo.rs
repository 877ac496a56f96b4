//! Account directory contracts and SQLite implementation.
//!
//! # Invariants
//! - Usernames are unique case-insensitively.
//! - Deleting a user nulls every reference to it (`ON DELETE SET NULL`); rows
//!   owned by other users are never removed.

use super::schema::ensure_connection_ready;
use super::{id_array, map_unique_violation, RepoError, RepoResult};
use crate::model::user::{NewUser, User, UserId};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT id, username, email, created_at FROM users";

pub trait UserRepository {
    fn create_user(&self, user: &NewUser) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Bulk lookup in one statement. Unknown ids are skipped; order is by id.
    fn users_by_ids(&self, ids: &[UserId]) -> RepoResult<Vec<User>>;
    fn user_exists(&self, id: UserId) -> RepoResult<bool>;
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
}

/// SQLite-backed account directory.
#[derive(Clone, Copy)]
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["users"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        user.validate()?;

        self.conn
            .execute(
                "INSERT INTO users (username, email, created_at) VALUES (?1, ?2, ?3);",
                params![user.username, user.email, user.created_at],
            )
            .map_err(|err| map_unique_violation(err, "users.username"))?;

        Ok(User {
            id: self.conn.last_insert_rowid(),
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        })
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn users_by_ids(&self, ids: &[UserId]) -> RepoResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL} WHERE id IN rarray(?1) ORDER BY id ASC;"
        ))?;
        let users = stmt
            .query_map([id_array(ids)], parse_user_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn user_exists(&self, id: UserId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM users WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }
        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        created_at: row.get("created_at")?,
    })
}
