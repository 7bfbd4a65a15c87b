//! In-memory store.
//!
//! Implements every store trait over plain maps. Used by service and API
//! tests, and handy for running the server without `PostgreSQL`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use posts_common::{AppError, AppResult};
use tokio::sync::RwLock;

use crate::entities::{Polarity, comment, like, post};
use crate::store::{CommentStore, LikeStore, NewComment, NewLike, NewPost, PostStore};

#[derive(Default)]
struct Tables {
    posts: BTreeMap<i64, post::Model>,
    likes: BTreeMap<i64, like::Model>,
    comments: BTreeMap<i64, comment::Model>,
    last_id: i64,
}

impl Tables {
    const fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// Map-backed implementation of [`PostStore`], [`LikeStore`] and [`CommentStore`].
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with a storage error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Storage("store unavailable".to_string()));
        }
        Ok(())
    }

    /// Number of like rows for a (user, post) pair.
    pub async fn like_rows(&self, user_id: i64, post_id: i64) -> usize {
        self.tables
            .read()
            .await
            .likes
            .values()
            .filter(|l| l.user_id == user_id && l.post_id == post_id)
            .count()
    }
}

fn newest_first(posts: &mut [post::Model]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl PostStore for InMemoryStore {
    async fn insert(&self, new: NewPost) -> AppResult<post::Model> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let model = post::Model {
            id: tables.next_id(),
            user_id: new.user_id,
            description: new.description,
            media_id: new.media_id,
            total_likes: 0,
            total_unlikes: 0,
            created_at: now.into(),
            updated_at: now.into(),
        };
        tables.posts.insert(model.id, model.clone());
        Ok(model)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<post::Model>> {
        self.ensure_available()?;
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn find_by_user_id(&self, user_id: i64) -> AppResult<Vec<post::Model>> {
        self.find_by_user_ids(&[user_id]).await
    }

    async fn find_by_user_ids(&self, user_ids: &[i64]) -> AppResult<Vec<post::Model>> {
        self.ensure_available()?;
        let mut posts: Vec<_> = self
            .tables
            .read()
            .await
            .posts
            .values()
            .filter(|p| user_ids.contains(&p.user_id))
            .cloned()
            .collect();
        newest_first(&mut posts);
        Ok(posts)
    }

    async fn update_counters(
        &self,
        id: i64,
        total_likes: i32,
        total_unlikes: i32,
    ) -> AppResult<post::Model> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        let post = tables.posts.get_mut(&id).ok_or(AppError::PostNotFound(id))?;
        post.total_likes = total_likes;
        post.total_unlikes = total_unlikes;
        post.updated_at = Utc::now().into();
        Ok(post.clone())
    }

    async fn delete_with_associations(&self, id: i64) -> AppResult<()> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        tables.likes.retain(|_, l| l.post_id != id);
        tables.comments.retain(|_, c| c.post_id != id);
        tables.posts.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl LikeStore for InMemoryStore {
    async fn insert(&self, new: NewLike) -> AppResult<like::Model> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let model = like::Model {
            id: tables.next_id(),
            user_id: new.user_id,
            post_id: new.post_id,
            polarity: new.polarity,
            created_at: now.into(),
            updated_at: now.into(),
        };
        tables.likes.insert(model.id, model.clone());
        Ok(model)
    }

    async fn find_by_user_and_post(
        &self,
        user_id: i64,
        post_id: i64,
    ) -> AppResult<Option<like::Model>> {
        self.ensure_available()?;
        Ok(self
            .tables
            .read()
            .await
            .likes
            .values()
            .find(|l| l.user_id == user_id && l.post_id == post_id)
            .cloned())
    }

    async fn update_polarity(&self, id: i64, polarity: Polarity) -> AppResult<like::Model> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        let like = tables
            .likes
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Like {id}")))?;
        like.polarity = polarity;
        like.updated_at = Utc::now().into();
        Ok(like.clone())
    }

    async fn find_by_post(&self, post_id: i64) -> AppResult<Vec<like::Model>> {
        self.ensure_available()?;
        Ok(self
            .tables
            .read()
            .await
            .likes
            .values()
            .filter(|l| l.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: i64) -> AppResult<u64> {
        self.ensure_available()?;
        Ok(u64::from(self.tables.write().await.likes.remove(&id).is_some()))
    }

    async fn delete_by_post(&self, post_id: i64) -> AppResult<u64> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        let before = tables.likes.len();
        tables.likes.retain(|_, l| l.post_id != post_id);
        Ok((before - tables.likes.len()) as u64)
    }
}

#[async_trait]
impl CommentStore for InMemoryStore {
    async fn insert(&self, new: NewComment) -> AppResult<comment::Model> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let model = comment::Model {
            id: tables.next_id(),
            user_id: new.user_id,
            post_id: new.post_id,
            content: new.content,
            created_at: now.into(),
            updated_at: now.into(),
        };
        tables.comments.insert(model.id, model.clone());
        Ok(model)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<comment::Model>> {
        self.ensure_available()?;
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn find_by_post(&self, post_id: i64) -> AppResult<Vec<comment::Model>> {
        self.ensure_available()?;
        let mut comments: Vec<_> = self
            .tables
            .read()
            .await
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn delete(&self, id: i64) -> AppResult<u64> {
        self.ensure_available()?;
        Ok(u64::from(
            self.tables.write().await.comments.remove(&id).is_some(),
        ))
    }

    async fn delete_by_post(&self, post_id: i64) -> AppResult<u64> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        let before = tables.comments.len();
        tables.comments.retain(|_, c| c.post_id != post_id);
        Ok((before - tables.comments.len()) as u64)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_post(user_id: i64) -> NewPost {
        NewPost {
            user_id,
            description: "Morning run".to_string(),
            media_id: 1,
        }
    }

    #[tokio::test]
    async fn test_ids_are_unique_across_tables() {
        let store = InMemoryStore::new();
        let post = PostStore::insert(&store, new_post(1)).await.unwrap();
        let like = LikeStore::insert(
            &store,
            NewLike {
                user_id: 2,
                post_id: post.id,
                polarity: Polarity::Positive,
            },
        )
        .await
        .unwrap();

        assert_ne!(post.id, like.id);
    }

    #[tokio::test]
    async fn test_posts_newest_first() {
        let store = InMemoryStore::new();
        let first = PostStore::insert(&store, new_post(1)).await.unwrap();
        let second = PostStore::insert(&store, new_post(1)).await.unwrap();
        PostStore::insert(&store, new_post(2)).await.unwrap();

        let posts = store.find_by_user_id(1).await.unwrap();
        let ids: Vec<_> = posts.iter().map(|p| p.id).collect();

        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_update_counters_missing_post() {
        let store = InMemoryStore::new();
        let result = store.update_counters(42, 1, 0).await;
        assert!(matches!(result, Err(AppError::PostNotFound(42))));
    }

    #[tokio::test]
    async fn test_delete_with_associations_removes_dependents() {
        let store = InMemoryStore::new();
        let post = PostStore::insert(&store, new_post(1)).await.unwrap();
        LikeStore::insert(
            &store,
            NewLike {
                user_id: 2,
                post_id: post.id,
                polarity: Polarity::Negative,
            },
        )
        .await
        .unwrap();
        CommentStore::insert(
            &store,
            NewComment {
                user_id: 2,
                post_id: post.id,
                content: "hi".to_string(),
            },
        )
        .await
        .unwrap();

        store.delete_with_associations(post.id).await.unwrap();

        assert!(PostStore::find_by_id(&store, post.id).await.unwrap().is_none());
        assert!(LikeStore::find_by_post(&store, post.id).await.unwrap().is_empty());
        assert!(CommentStore::find_by_post(&store, post.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = InMemoryStore::new();
        store.set_unavailable(true);

        let result = PostStore::insert(&store, new_post(1)).await;
        assert!(matches!(result, Err(AppError::Storage(_))));
    }
}
