//! Account directory use-case service.

use crate::model::user::{NewUser, User, UserId};
use crate::model::validation::ValidationError;
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum UserServiceError {
    UsernameTaken(String),
    UserNotFound(UserId),
    Validation(ValidationError),
    Storage(RepoError),
}

impl Display for UserServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UsernameTaken(name) => write!(f, "username already taken: `{name}`"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UserServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for UserServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound { entity: "user", id } => Self::UserNotFound(id),
            other => Self::Storage(other),
        }
    }
}

pub struct UserService<U: UserRepository> {
    repo: U,
}

impl<U: UserRepository> UserService<U> {
    pub fn new(repo: U) -> Self {
        Self { repo }
    }

    pub fn create_user(
        &self,
        username: &str,
        email: Option<String>,
    ) -> Result<User, UserServiceError> {
        let new_user = NewUser::new(username.trim(), email);
        match self.repo.create_user(&new_user) {
            Ok(user) => Ok(user),
            Err(RepoError::Conflict(_)) => Err(UserServiceError::UsernameTaken(new_user.username)),
            Err(err) => Err(err.into()),
        }
    }

    pub fn get_user(&self, id: UserId) -> Result<Option<User>, UserServiceError> {
        Ok(self.repo.get_user(id)?)
    }

    /// Deletes the account. Edges, feed entries and tweets referencing it are
    /// tombstoned by the schema rather than removed.
    pub fn delete_user(&self, id: UserId) -> Result<(), UserServiceError> {
        self.repo.delete_user(id)?;
        info!("event=user_delete module=user status=ok user_id={id}");
        Ok(())
    }
}
