//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep callers decoupled from storage details: every service is generic over
//!   repository traits and can run against in-memory fakes.
//!
//! # Invariants
//! - Services never issue SQL directly.
//! - Validation-style failures are typed errors; storage failures are wrapped,
//!   never retried here.

pub mod comment_service;
pub mod friendship_service;
pub mod hooks;
pub mod like_service;
pub mod newsfeed_service;
pub mod notification_service;
pub mod tweet_service;
pub mod user_service;
