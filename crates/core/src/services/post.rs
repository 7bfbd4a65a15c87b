//! Post service.
//!
//! Creation uploads the media before anything is stored. Deletion removes
//! likes, then comments, then the post row, and hands the media delete to
//! the job queue.

use posts_common::{AppError, AppResult, RequestContext};
use posts_db::entities::post;
use posts_db::{CommentStoreRef, LikeStoreRef, NewPost, PostStoreRef};
use tracing::{debug, info};

use crate::services::jobs::JobSender;
use crate::services::locks::PostLocks;
use crate::services::media::{MediaServiceRef, MediaUpload};

/// Input for creating a post.
#[derive(Debug, Clone)]
pub struct CreatePostInput {
    pub user_id: i64,
    pub description: String,
    pub media: MediaUpload,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_store: PostStoreRef,
    like_store: LikeStoreRef,
    comment_store: CommentStoreRef,
    media: MediaServiceRef,
    locks: PostLocks,
    jobs: JobSender,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_store: PostStoreRef,
        like_store: LikeStoreRef,
        comment_store: CommentStoreRef,
        media: MediaServiceRef,
        locks: PostLocks,
        jobs: JobSender,
    ) -> Self {
        Self {
            post_store,
            like_store,
            comment_store,
            media,
            locks,
            jobs,
        }
    }

    /// Upload the media, then store the post. Nothing is stored if the
    /// upload fails.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreatePostInput,
    ) -> AppResult<post::Model> {
        ctx.check()?;

        let media_id = self.media.upload(ctx, input.media).await?;

        let post = self
            .post_store
            .insert(NewPost {
                user_id: input.user_id,
                description: input.description,
                media_id,
            })
            .await?;

        info!(
            request_id = %ctx.request_id(),
            post_id = post.id,
            user_id = post.user_id,
            media_id,
            "Post created"
        );
        Ok(post)
    }

    /// Get a post by ID.
    pub async fn get(&self, ctx: &RequestContext, id: i64) -> AppResult<post::Model> {
        ctx.check()?;
        self.post_store
            .find_by_id(id)
            .await?
            .ok_or(AppError::PostNotFound(id))
    }

    /// Posts of a user, newest first.
    pub async fn list_by_user(
        &self,
        ctx: &RequestContext,
        user_id: i64,
    ) -> AppResult<Vec<post::Model>> {
        ctx.check()?;
        self.post_store.find_by_user_id(user_id).await
    }

    /// Posts of several users, newest first.
    pub async fn list_by_users(
        &self,
        ctx: &RequestContext,
        user_ids: &[i64],
    ) -> AppResult<Vec<post::Model>> {
        ctx.check()?;
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.post_store.find_by_user_ids(user_ids).await
    }

    /// Delete a post and everything attached to it. Deleting a missing post
    /// succeeds.
    pub async fn delete(&self, ctx: &RequestContext, id: i64) -> AppResult<()> {
        ctx.check()?;
        let _guard = self.locks.lock(id).await;

        let Some(post) = self.post_store.find_by_id(id).await? else {
            debug!(post_id = id, "No post to delete");
            return Ok(());
        };

        self.jobs.delete_media(ctx, post.id, post.media_id);

        let likes = self.like_store.delete_by_post(post.id).await?;
        let comments = self.comment_store.delete_by_post(post.id).await?;
        self.post_store.delete_with_associations(post.id).await?;

        info!(
            request_id = %ctx.request_id(),
            post_id = post.id,
            likes,
            comments,
            "Post deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::jobs::{JobHandle, JobService, JobWorkerContext};
    use crate::services::notification::NotificationDispatcher;
    use crate::testing::{RecordingEventPublisher, RecordingMediaService, StaticUserDirectory};
    use bytes::Bytes;
    use posts_common::config::JobsConfig;
    use posts_db::entities::Polarity;
    use posts_db::{CommentStore, InMemoryStore, LikeStore, NewComment, NewLike, PostStore};
    use std::sync::Arc;

    struct Fixture {
        store: Arc<InMemoryStore>,
        media: Arc<RecordingMediaService>,
        service: PostService,
        jobs: JobHandle,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let media = Arc::new(RecordingMediaService::new());
        let job_service = JobService::new(&JobsConfig::default());
        let service = PostService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            media.clone(),
            PostLocks::new(),
            job_service.sender(),
        );
        let jobs = job_service.start(JobWorkerContext {
            notifications: NotificationDispatcher::new(
                Arc::new(StaticUserDirectory::new()),
                Arc::new(RecordingEventPublisher::new()),
                "notifications",
            ),
            media: media.clone(),
        });

        Fixture {
            store,
            media,
            service,
            jobs,
        }
    }

    fn input(user_id: i64) -> CreatePostInput {
        CreatePostInput {
            user_id,
            description: "Rainy street".to_string(),
            media: MediaUpload {
                file_name: "street.jpg".to_string(),
                content_type: Some("image/jpeg".to_string()),
                bytes: Bytes::from_static(b"\xff\xd8\xff"),
            },
        }
    }

    #[tokio::test]
    async fn test_create_uploads_then_stores() {
        let f = fixture();
        let ctx = RequestContext::new();

        let post = f.service.create(&ctx, input(1)).await.unwrap();

        assert_eq!(post.media_id, 100);
        assert_eq!((post.total_likes, post.total_unlikes), (0, 0));
        assert_eq!(f.media.uploaded().await, vec!["street.jpg".to_string()]);
        assert_eq!(f.service.get(&ctx, post.id).await.unwrap(), post);
    }

    #[tokio::test]
    async fn test_failed_upload_stores_nothing() {
        let f = fixture();
        f.media.set_failing_uploads(true);
        let ctx = RequestContext::new();

        let result = f.service.create(&ctx, input(1)).await;

        assert!(matches!(result, Err(AppError::Upstream(_))));
        assert!(f.service.list_by_user(&ctx, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let f = fixture();
        let ctx = RequestContext::new();
        let post = f.service.create(&ctx, input(1)).await.unwrap();
        let other = f.service.create(&ctx, input(1)).await.unwrap();

        for target in [post.id, other.id] {
            LikeStore::insert(
                f.store.as_ref(),
                NewLike {
                    user_id: 2,
                    post_id: target,
                    polarity: Polarity::Positive,
                },
            )
            .await
            .unwrap();
            CommentStore::insert(
                f.store.as_ref(),
                NewComment {
                    user_id: 2,
                    post_id: target,
                    content: "wow".to_string(),
                },
            )
            .await
            .unwrap();
        }

        f.service.delete(&ctx, post.id).await.unwrap();
        f.jobs.shutdown().await;

        assert!(matches!(
            f.service.get(&ctx, post.id).await,
            Err(AppError::PostNotFound(_))
        ));
        assert!(LikeStore::find_by_post(f.store.as_ref(), post.id).await.unwrap().is_empty());
        assert!(CommentStore::find_by_post(f.store.as_ref(), post.id).await.unwrap().is_empty());
        assert!(f.store.find_by_user_and_post(2, post.id).await.unwrap().is_none());

        assert_eq!(LikeStore::find_by_post(f.store.as_ref(), other.id).await.unwrap().len(), 1);
        assert_eq!(CommentStore::find_by_post(f.store.as_ref(), other.id).await.unwrap().len(), 1);

        assert_eq!(f.media.deleted().await, vec![post.media_id]);
    }

    #[tokio::test]
    async fn test_delete_missing_post_is_noop() {
        let f = fixture();
        let ctx = RequestContext::new();

        f.service.delete(&ctx, 404).await.unwrap();
        f.jobs.shutdown().await;

        assert!(f.media.deleted().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_does_not_wait_for_media() {
        let f = fixture();
        let ctx = RequestContext::new();
        let post = f.service.create(&ctx, input(1)).await.unwrap();
        f.media
            .set_delete_delay(std::time::Duration::from_secs(3600))
            .await;

        f.service.delete(&ctx, post.id).await.unwrap();

        assert!(PostStore::find_by_id(f.store.as_ref(), post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_users_newest_first() {
        let f = fixture();
        let ctx = RequestContext::new();
        let a = f.service.create(&ctx, input(1)).await.unwrap();
        let b = f.service.create(&ctx, input(2)).await.unwrap();
        f.service.create(&ctx, input(3)).await.unwrap();

        let posts = f.service.list_by_users(&ctx, &[1, 2]).await.unwrap();
        let ids: Vec<_> = posts.iter().map(|p| p.id).collect();

        assert_eq!(ids, vec![b.id, a.id]);
        assert!(f.service.list_by_users(&ctx, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_context_is_rejected() {
        let f = fixture();
        let ctx = RequestContext::new();
        ctx.cancel();

        let result = f.service.create(&ctx, input(1)).await;

        assert!(matches!(result, Err(AppError::Cancelled)));
        assert!(f.media.uploaded().await.is_empty());
    }
}
