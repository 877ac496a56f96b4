//! Social graph use-case service.
//!
//! # Responsibility
//! - Follow/unfollow with typed rejection of self-follows and duplicates.
//! - Resolve follower/following listings with the two-step id-list strategy:
//!   edge rows first, then one bulk user fetch.
//!
//! # Invariants
//! - A listing costs exactly two repository reads regardless of its size.
//! - Listing order is the edge order (`created_at DESC`), not the user order.
//! - `unfollow` on a missing edge reports 0 instead of failing.

use crate::model::friendship::{FollowEdge, FollowListing};
use crate::model::now_epoch_ms;
use crate::model::user::{User, UserId};
use crate::repo::friendship_repo::FriendshipRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use log::{debug, info};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum FriendshipServiceError {
    /// `from` and `to` are the same user.
    SelfFollow(UserId),
    /// The edge already exists, possibly created by a concurrent request.
    DuplicateEdge { from: UserId, to: UserId },
    /// Referenced user does not exist.
    NotFoundTarget(UserId),
    Storage(RepoError),
}

impl Display for FriendshipServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfFollow(id) => write!(f, "user {id} cannot follow or unfollow itself"),
            Self::DuplicateEdge { from, to } => {
                write!(f, "user {from} already follows user {to}")
            }
            Self::NotFoundTarget(id) => write!(f, "user not found: {id}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FriendshipServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for FriendshipServiceError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

pub type FriendshipServiceResult<T> = Result<T, FriendshipServiceError>;

/// Social graph facade over the account directory and edge store.
pub struct FriendshipService<U: UserRepository, G: FriendshipRepository> {
    users: U,
    graph: G,
}

impl<U: UserRepository, G: FriendshipRepository> FriendshipService<U, G> {
    pub fn new(users: U, graph: G) -> Self {
        Self { users, graph }
    }

    /// Creates the edge `from -> to`.
    ///
    /// # Errors
    /// - `SelfFollow` when `from == to`; nothing is read or written.
    /// - `NotFoundTarget` when either user is missing; nothing is written.
    /// - `DuplicateEdge` when the edge exists. The UNIQUE index decides races,
    ///   so of two concurrent identical follows exactly one succeeds.
    pub fn follow(&self, from: UserId, to: UserId) -> FriendshipServiceResult<FollowEdge> {
        if from == to {
            return Err(FriendshipServiceError::SelfFollow(from));
        }
        self.require_user(from)?;
        self.require_user(to)?;

        match self.graph.insert_edge(from, to, now_epoch_ms()) {
            Ok(edge) => {
                info!("event=follow module=friendship status=ok from={from} to={to}");
                Ok(edge)
            }
            Err(RepoError::Conflict(_)) => {
                debug!("event=follow module=friendship status=duplicate from={from} to={to}");
                Err(FriendshipServiceError::DuplicateEdge { from, to })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Removes the edge `from -> to` and returns the number of deleted edges
    /// (0 or 1). Existing newsfeed entries are left untouched.
    pub fn unfollow(&self, from: UserId, to: UserId) -> FriendshipServiceResult<usize> {
        if from == to {
            return Err(FriendshipServiceError::SelfFollow(from));
        }
        self.require_user(to)?;

        let deleted = self.graph.delete_edge(from, to)?;
        info!("event=unfollow module=friendship status=ok from={from} to={to} deleted={deleted}");
        Ok(deleted)
    }

    pub fn has_followed(&self, from: UserId, to: UserId) -> FriendshipServiceResult<bool> {
        Ok(self.graph.edge_exists(from, to)?)
    }

    /// Follower ids of `user`, newest edge first. One repository read.
    pub fn follower_ids(&self, user: UserId) -> FriendshipServiceResult<Vec<UserId>> {
        Ok(self.graph.follower_ids(user)?)
    }

    /// Users following `user`, newest edge first.
    pub fn followers_of(&self, user: UserId) -> FriendshipServiceResult<Vec<FollowListing>> {
        let edges = self.graph.follower_edges(user)?;
        let sides: Vec<(UserId, i64)> = edges
            .iter()
            .map(|edge| (edge.from_user_id, edge.created_at))
            .collect();
        self.resolve_listing(&sides)
    }

    /// Users followed by `user`, newest edge first.
    pub fn followings_of(&self, user: UserId) -> FriendshipServiceResult<Vec<FollowListing>> {
        let edges = self.graph.following_edges(user)?;
        let sides: Vec<(UserId, i64)> = edges
            .iter()
            .map(|edge| (edge.to_user_id, edge.created_at))
            .collect();
        self.resolve_listing(&sides)
    }

    fn resolve_listing(
        &self,
        sides: &[(UserId, i64)],
    ) -> FriendshipServiceResult<Vec<FollowListing>> {
        let ids: Vec<UserId> = sides.iter().map(|(id, _)| *id).collect();
        let mut by_id: HashMap<UserId, User> = self
            .users
            .users_by_ids(&ids)?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        // Edge order wins; a user that vanished between the two reads is dropped.
        Ok(sides
            .iter()
            .filter_map(|(id, created_at)| {
                by_id.remove(id).map(|user| FollowListing {
                    user,
                    created_at: *created_at,
                })
            })
            .collect())
    }

    fn require_user(&self, id: UserId) -> FriendshipServiceResult<()> {
        if self.users.user_exists(id)? {
            Ok(())
        } else {
            Err(FriendshipServiceError::NotFoundTarget(id))
        }
    }
}
