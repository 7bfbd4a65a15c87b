//! Like repository.

use std::sync::Arc;

use crate::entities::{Like, Polarity, like};
use crate::store::{LikeStore, NewLike};
use async_trait::async_trait;
use chrono::Utc;
use posts_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

/// Like repository for database operations.
#[derive(Clone)]
pub struct LikeRepository {
    db: Arc<DatabaseConnection>,
}

impl LikeRepository {
    /// Create a new like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LikeStore for LikeRepository {
    async fn insert(&self, new: NewLike) -> AppResult<like::Model> {
        let now = Utc::now();
        let model = like::ActiveModel {
            user_id: Set(new.user_id),
            post_id: Set(new.post_id),
            polarity: Set(new.polarity),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    async fn find_by_user_and_post(
        &self,
        user_id: i64,
        post_id: i64,
    ) -> AppResult<Option<like::Model>> {
        Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::PostId.eq(post_id))
            .order_by_asc(like::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    async fn update_polarity(&self, id: i64, polarity: Polarity) -> AppResult<like::Model> {
        let model = like::ActiveModel {
            id: Set(id),
            polarity: Set(polarity),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        model.update(self.db.as_ref()).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => AppError::NotFound(format!("Like {id}")),
            other => AppError::Storage(other.to_string()),
        })
    }

    async fn find_by_post(&self, post_id: i64) -> AppResult<Vec<like::Model>> {
        Like::find()
            .filter(like::Column::PostId.eq(post_id))
            .order_by_asc(like::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    async fn delete(&self, id: i64) -> AppResult<u64> {
        Like::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map(|res| res.rows_affected)
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    async fn delete_by_post(&self, post_id: i64) -> AppResult<u64> {
        Like::delete_many()
            .filter(like::Column::PostId.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map(|res| res.rows_affected)
            .map_err(|e| AppError::Storage(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_like(id: i64, user_id: i64, post_id: i64, polarity: Polarity) -> like::Model {
        like::Model {
            id,
            user_id,
            post_id,
            polarity,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_user_and_post_found() {
        let like = create_test_like(1, 7, 3, Polarity::Positive);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[like.clone()]])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        let result = repo.find_by_user_and_post(7, 3).await.unwrap();

        assert_eq!(result, Some(like));
    }

    #[tokio::test]
    async fn test_find_by_user_and_post_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<like::Model>::new()])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        let result = repo.find_by_user_and_post(7, 3).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_polarity() {
        let updated = create_test_like(1, 7, 3, Polarity::Negative);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[updated]])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        let result = repo.update_polarity(1, Polarity::Negative).await.unwrap();

        assert_eq!(result.id, 1);
        assert_eq!(result.polarity, Polarity::Negative);
    }

    #[tokio::test]
    async fn test_find_by_post() {
        let l1 = create_test_like(1, 7, 3, Polarity::Positive);
        let l2 = create_test_like(2, 8, 3, Polarity::Negative);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[l1, l2]])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        let result = repo.find_by_post(3).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_by_post_reports_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 4,
                }])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        let removed = repo.delete_by_post(3).await.unwrap();

        assert_eq!(removed, 4);
    }

    #[tokio::test]
    async fn test_storage_error_is_mapped() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Custom("connection reset".to_string())])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        let result = repo.find_by_post(3).await;

        assert!(matches!(result, Err(AppError::Storage(msg)) if msg.contains("connection reset")));
    }
}
