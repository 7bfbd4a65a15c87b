//! Comment repository.

use std::sync::Arc;

use crate::entities::{Comment, comment};
use crate::store::{CommentStore, NewComment};
use async_trait::async_trait;
use chrono::Utc;
use posts_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentStore for CommentRepository {
    async fn insert(&self, new: NewComment) -> AppResult<comment::Model> {
        let now = Utc::now();
        let model = comment::ActiveModel {
            user_id: Set(new.user_id),
            post_id: Set(new.post_id),
            content: Set(new.content),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    async fn find_by_post(&self, post_id: i64) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    async fn delete(&self, id: i64) -> AppResult<u64> {
        Comment::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map(|res| res.rows_affected)
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    async fn delete_by_post(&self, post_id: i64) -> AppResult<u64> {
        Comment::delete_many()
            .filter(comment::Column::PostId.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map(|res| res.rows_affected)
            .map_err(|e| AppError::Storage(e.to_string()))
    }
}
