//! Domain model for the social graph, tweets and materialized newsfeeds.
//!
//! # Responsibility
//! - Define plain data-owning records shared by repositories and services.
//! - Keep creation payloads (`New*`) separate from persisted rows.
//!
//! # Invariants
//! - Every persisted record is identified by a storage-assigned integer id.
//! - Records reference each other by id only; nothing embeds another record's
//!   mutable content.
//! - Rows whose user reference was nulled by account deletion are tombstones
//!   and never surface through repository reads.

pub mod comment;
pub mod content;
pub mod friendship;
pub mod like;
pub mod newsfeed;
pub mod notification;
pub mod tweet;
pub mod user;
pub mod validation;

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
