//! Data access for the feed ranker.
//!
//! The ranker only ever reads: it consumes a point-in-time snapshot of
//! profiles, interactions, and candidate posts. Keeping the capability
//! behind a trait lets the ranking service be exercised against
//! in-memory fixtures and mocks without a running store.

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Interaction, Post, UserProfile},
};

pub mod memory;

pub use memory::MemoryStore;

/// Read capabilities consumed by the ranking service
///
/// Implementations must return consistent-enough snapshots; no
/// transaction spans the individual reads. `candidate_posts` must be
/// deterministically ordered so that score ties resolve the same way
/// on every invocation.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FeedStore: Send + Sync {
    /// Fetch the profile declared by a user, if any
    async fn profile_for(&self, user_id: Uuid) -> AppResult<Option<UserProfile>>;

    /// Fetch every interaction recorded for a user
    async fn interactions_for(&self, user_id: Uuid) -> AppResult<Vec<Interaction>>;

    /// Fetch posts eligible for recommendation: everything except the
    /// user's own posts and the explicitly excluded ids
    async fn candidate_posts(
        &self,
        exclude_author: Uuid,
        exclude_ids: HashSet<Uuid>,
    ) -> AppResult<Vec<Post>>;

    /// Fetch a single post by id
    async fn post_by_id(&self, post_id: Uuid) -> AppResult<Option<Post>>;
}
