//! Post repository.

use std::sync::Arc;

use crate::entities::{Comment, Like, Post, comment, like, post};
use crate::store::{NewPost, PostStore};
use async_trait::async_trait;
use chrono::Utc;
use posts_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i64) -> AppResult<post::Model> {
        PostStore::find_by_id(self, id)
            .await?
            .ok_or(AppError::PostNotFound(id))
    }
}

#[async_trait]
impl PostStore for PostRepository {
    async fn insert(&self, new: NewPost) -> AppResult<post::Model> {
        let now = Utc::now();
        let model = post::ActiveModel {
            user_id: Set(new.user_id),
            description: Set(new.description),
            media_id: Set(new.media_id),
            total_likes: Set(0),
            total_unlikes: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    async fn find_by_user_id(&self, user_id: i64) -> AppResult<Vec<post::Model>> {
        Post::find()
            .filter(post::Column::UserId.eq(user_id))
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    async fn find_by_user_ids(&self, user_ids: &[i64]) -> AppResult<Vec<post::Model>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        Post::find()
            .filter(post::Column::UserId.is_in(user_ids.to_vec()))
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    async fn update_counters(
        &self,
        id: i64,
        total_likes: i32,
        total_unlikes: i32,
    ) -> AppResult<post::Model> {
        let post = self.get_by_id(id).await?;

        let mut active: post::ActiveModel = post.into();
        active.total_likes = Set(total_likes);
        active.total_unlikes = Set(total_unlikes);
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    async fn delete_with_associations(&self, id: i64) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Like::delete_many()
            .filter(like::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Comment::delete_many()
            .filter(comment::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Post::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_post(id: i64, user_id: i64) -> post::Model {
        post::Model {
            id,
            user_id,
            description: "Sunset".to_string(),
            media_id: 10,
            total_likes: 0,
            total_unlikes: 0,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let post = create_test_post(1, 7);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post.clone()]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = PostStore::find_by_id(&repo, 1).await.unwrap();

        assert_eq!(result, Some(post));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.get_by_id(404).await;

        assert!(matches!(result, Err(AppError::PostNotFound(404))));
    }

    #[tokio::test]
    async fn test_insert_returns_model() {
        let post = create_test_post(3, 7);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post.clone()]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let created = PostStore::insert(
            &repo,
            NewPost {
                user_id: 7,
                description: "Sunset".to_string(),
                media_id: 10,
            },
        )
        .await
        .unwrap();

        assert_eq!(created.id, 3);
        assert_eq!(created.total_likes, 0);
        assert_eq!(created.total_unlikes, 0);
    }

    #[tokio::test]
    async fn test_find_by_user_ids_empty_skips_query() {
        // No query results appended: hitting the database would error.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = PostRepository::new(db);
        let result = repo.find_by_user_ids(&[]).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_update_counters() {
        let post = create_test_post(1, 7);
        let updated = post::Model {
            total_likes: 2,
            total_unlikes: 1,
            ..post.clone()
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .append_query_results([[updated]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.update_counters(1, 2, 1).await.unwrap();

        assert_eq!(result.total_likes, 2);
        assert_eq!(result.total_unlikes, 1);
    }

    #[tokio::test]
    async fn test_update_counters_missing_post() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.update_counters(9, 1, 0).await;

        assert!(matches!(result, Err(AppError::PostNotFound(9))));
    }

    #[tokio::test]
    async fn test_delete_with_associations() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 2, // likes
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1, // comments
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1, // post
                    },
                ])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.delete_with_associations(1).await;

        assert!(result.is_ok());
    }
}
