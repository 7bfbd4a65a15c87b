//! Store traits.
//!
//! Services depend on these capabilities instead of a concrete connection, so
//! the same service code runs against `PostgreSQL` (the repositories in
//! [`crate::repositories`]) or the [`crate::memory::InMemoryStore`] double.

use std::sync::Arc;

use async_trait::async_trait;
use posts_common::AppResult;

use crate::entities::{Polarity, comment, like, post};

/// Fields of a post that is about to be inserted.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: i64,
    pub description: String,
    pub media_id: i64,
}

/// Fields of a like that is about to be inserted.
#[derive(Debug, Clone, Copy)]
pub struct NewLike {
    pub user_id: i64,
    pub post_id: i64,
    pub polarity: Polarity,
}

/// Fields of a comment that is about to be inserted.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub user_id: i64,
    pub post_id: i64,
    pub content: String,
}

/// Post persistence.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert a post with zeroed counters.
    async fn insert(&self, post: NewPost) -> AppResult<post::Model>;

    /// Find a post by ID.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<post::Model>>;

    /// Posts of a user, newest first.
    async fn find_by_user_id(&self, user_id: i64) -> AppResult<Vec<post::Model>>;

    /// Posts of several users, newest first.
    async fn find_by_user_ids(&self, user_ids: &[i64]) -> AppResult<Vec<post::Model>>;

    /// Overwrite both like counters. Fails with `PostNotFound` if the row is gone.
    async fn update_counters(
        &self,
        id: i64,
        total_likes: i32,
        total_unlikes: i32,
    ) -> AppResult<post::Model>;

    /// Hard-delete the post row together with any rows still referencing it.
    async fn delete_with_associations(&self, id: i64) -> AppResult<()>;
}

/// Like persistence.
#[async_trait]
pub trait LikeStore: Send + Sync {
    /// Insert a new like row.
    async fn insert(&self, like: NewLike) -> AppResult<like::Model>;

    /// Find the like a user left on a post.
    async fn find_by_user_and_post(
        &self,
        user_id: i64,
        post_id: i64,
    ) -> AppResult<Option<like::Model>>;

    /// Change the polarity of an existing like in place.
    async fn update_polarity(&self, id: i64, polarity: Polarity) -> AppResult<like::Model>;

    /// All likes on a post, in insertion order.
    async fn find_by_post(&self, post_id: i64) -> AppResult<Vec<like::Model>>;

    /// Hard-delete a like. Returns the number of rows removed.
    async fn delete(&self, id: i64) -> AppResult<u64>;

    /// Hard-delete every like on a post. Returns the number of rows removed.
    async fn delete_by_post(&self, post_id: i64) -> AppResult<u64>;
}

/// Comment persistence.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Insert a new comment row.
    async fn insert(&self, comment: NewComment) -> AppResult<comment::Model>;

    /// Find a comment by ID.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<comment::Model>>;

    /// Comments on a post, oldest first.
    async fn find_by_post(&self, post_id: i64) -> AppResult<Vec<comment::Model>>;

    /// Hard-delete a comment. Returns the number of rows removed.
    async fn delete(&self, id: i64) -> AppResult<u64>;

    /// Hard-delete every comment on a post. Returns the number of rows removed.
    async fn delete_by_post(&self, post_id: i64) -> AppResult<u64>;
}

/// Shared post store handle.
pub type PostStoreRef = Arc<dyn PostStore>;
/// Shared like store handle.
pub type LikeStoreRef = Arc<dyn LikeStore>;
/// Shared comment store handle.
pub type CommentStoreRef = Arc<dyn CommentStore>;
