//! Comment service.

use posts_common::{AppError, AppResult, CommentPolicy, RequestContext};
use posts_db::entities::comment;
use posts_db::{CommentStoreRef, NewComment, PostStoreRef};
use tracing::{debug, warn};

use crate::services::jobs::JobSender;
use crate::services::locks::PostLocks;
use crate::services::notification::{Notice, NoticeKind};

/// Input for creating a comment.
#[derive(Debug, Clone)]
pub struct CreateCommentInput {
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_store: CommentStoreRef,
    post_store: PostStoreRef,
    locks: PostLocks,
    jobs: JobSender,
    policy: CommentPolicy,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_store: CommentStoreRef,
        post_store: PostStoreRef,
        locks: PostLocks,
        jobs: JobSender,
        policy: CommentPolicy,
    ) -> Self {
        Self {
            comment_store,
            post_store,
            locks,
            jobs,
            policy,
        }
    }

    /// Store a comment and notify the post owner.
    ///
    /// With [`CommentPolicy::RejectMissingPost`] a comment on a missing post
    /// fails with `PostNotFound` and nothing is stored. With
    /// [`CommentPolicy::AcceptWithoutNotification`] it is stored and the
    /// notification is skipped. The post lock is held from the existence
    /// check to the insert, so a concurrent post delete cannot slip between.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        ctx.check()?;
        let post_id = input.post_id;
        let _guard = self.locks.lock(post_id).await;

        let owner = match self.policy {
            CommentPolicy::RejectMissingPost => {
                let post = self
                    .post_store
                    .find_by_id(post_id)
                    .await?
                    .ok_or(AppError::PostNotFound(post_id))?;
                Some(post.user_id)
            }
            CommentPolicy::AcceptWithoutNotification => None,
        };

        let comment = self
            .comment_store
            .insert(NewComment {
                user_id: input.user_id,
                post_id,
                content: input.content,
            })
            .await?;

        let owner = match owner {
            Some(owner) => Some(owner),
            None => self.lookup_owner(post_id).await,
        };

        match owner {
            Some(to_user_id) => {
                self.jobs.notify(
                    ctx,
                    Notice {
                        from_user_id: comment.user_id,
                        to_user_id,
                        kind: NoticeKind::Comment,
                    },
                );
            }
            None => debug!(post_id, comment_id = comment.id, "Comment on missing post, not notifying"),
        }

        Ok(comment)
    }

    async fn lookup_owner(&self, post_id: i64) -> Option<i64> {
        match self.post_store.find_by_id(post_id).await {
            Ok(post) => post.map(|p| p.user_id),
            Err(e) => {
                warn!(post_id, error = %e, "Post lookup failed, skipping notification");
                None
            }
        }
    }

    /// Delete a comment. Deleting a missing comment succeeds.
    pub async fn delete(&self, ctx: &RequestContext, id: i64) -> AppResult<()> {
        ctx.check()?;
        if self.comment_store.delete(id).await? == 0 {
            debug!(comment_id = id, "No comment to delete");
        }
        Ok(())
    }

    /// Comments on a post, oldest first.
    pub async fn list_by_post(
        &self,
        ctx: &RequestContext,
        post_id: i64,
    ) -> AppResult<Vec<comment::Model>> {
        ctx.check()?;
        self.comment_store.find_by_post(post_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::jobs::{JobHandle, JobService, JobWorkerContext};
    use crate::services::notification::NotificationDispatcher;
    use crate::testing::{RecordingEventPublisher, RecordingMediaService, StaticUserDirectory};
    use posts_common::config::JobsConfig;
    use crate::services::post::PostService;
    use posts_db::{CommentStore, InMemoryStore, NewPost, PostStore};
    use serde_json::json;
    use std::sync::Arc;

    struct Fixture {
        store: Arc<InMemoryStore>,
        events: Arc<RecordingEventPublisher>,
        service: CommentService,
        jobs: JobHandle,
    }

    fn fixture(policy: CommentPolicy) -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let events = Arc::new(RecordingEventPublisher::new());
        let users = StaticUserDirectory::new()
            .with_user(1, "auth0|owner", "owner")
            .with_user(2, "auth0|guest", "guest");
        let job_service = JobService::new(&JobsConfig::default());
        let service = CommentService::new(
            store.clone(),
            store.clone(),
            PostLocks::new(),
            job_service.sender(),
            policy,
        );
        let jobs = job_service.start(JobWorkerContext {
            notifications: NotificationDispatcher::new(
                Arc::new(users),
                events.clone(),
                "notifications",
            ),
            media: Arc::new(RecordingMediaService::new()),
        });

        Fixture {
            store,
            events,
            service,
            jobs,
        }
    }

    async fn create_post(store: &InMemoryStore) -> i64 {
        PostStore::insert(
            store,
            NewPost {
                user_id: 1,
                description: "Market".to_string(),
                media_id: 3,
            },
        )
        .await
        .unwrap()
        .id
    }

    fn input(post_id: i64, content: &str) -> CreateCommentInput {
        CreateCommentInput {
            post_id,
            user_id: 2,
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_notifies_owner() {
        let f = fixture(CommentPolicy::default());
        let ctx = RequestContext::new();
        let post_id = create_post(&f.store).await;

        let comment = f.service.create(&ctx, input(post_id, "Great light")).await.unwrap();
        f.jobs.shutdown().await;

        assert_eq!(comment.content, "Great light");
        assert_eq!(
            f.events.published().await,
            vec![(
                "notifications".to_string(),
                json!({
                    "message": "guest commented on your post.",
                    "userAuthId": "auth0|owner",
                    "notificationType": "comment"
                })
            )]
        );
    }

    #[tokio::test]
    async fn test_reject_policy_on_missing_post() {
        let f = fixture(CommentPolicy::RejectMissingPost);
        let ctx = RequestContext::new();

        let result = f.service.create(&ctx, input(999, "hello?")).await;
        f.jobs.shutdown().await;

        assert!(matches!(result, Err(AppError::PostNotFound(999))));
        assert!(f.service.list_by_post(&ctx, 999).await.unwrap().is_empty());
        assert!(f.events.published().await.is_empty());
    }

    #[tokio::test]
    async fn test_accept_policy_on_missing_post() {
        let f = fixture(CommentPolicy::AcceptWithoutNotification);
        let ctx = RequestContext::new();

        let comment = f.service.create(&ctx, input(999, "hello?")).await.unwrap();
        f.jobs.shutdown().await;

        let listed = f.service.list_by_post(&ctx, 999).await.unwrap();
        assert_eq!(listed, vec![comment]);
        assert!(f.events.published().await.is_empty());
    }

    #[tokio::test]
    async fn test_accept_policy_still_notifies_existing_post() {
        let f = fixture(CommentPolicy::AcceptWithoutNotification);
        let ctx = RequestContext::new();
        let post_id = create_post(&f.store).await;

        f.service.create(&ctx, input(post_id, "nice")).await.unwrap();
        f.jobs.shutdown().await;

        assert_eq!(f.events.published().await.len(), 1);
    }

    #[tokio::test]
    async fn test_list_oldest_first() {
        let f = fixture(CommentPolicy::default());
        let ctx = RequestContext::new();
        let post_id = create_post(&f.store).await;

        for content in ["one", "two", "three"] {
            f.service.create(&ctx, input(post_id, content)).await.unwrap();
        }

        let contents: Vec<_> = f
            .service
            .list_by_post(&ctx, post_id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.content)
            .collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let f = fixture(CommentPolicy::default());
        let ctx = RequestContext::new();
        let post_id = create_post(&f.store).await;
        let comment = f.service.create(&ctx, input(post_id, "bye")).await.unwrap();

        f.service.delete(&ctx, comment.id).await.unwrap();
        f.service.delete(&ctx, comment.id).await.unwrap();

        assert!(f.service.list_by_post(&ctx, post_id).await.unwrap().is_empty());
    }

    /// Post store that pauses after every lookup.
    struct SlowLookupStore {
        inner: Arc<InMemoryStore>,
        delay: std::time::Duration,
    }

    #[async_trait::async_trait]
    impl PostStore for SlowLookupStore {
        async fn insert(&self, post: NewPost) -> AppResult<posts_db::entities::post::Model> {
            PostStore::insert(self.inner.as_ref(), post).await
        }

        async fn find_by_id(&self, id: i64) -> AppResult<Option<posts_db::entities::post::Model>> {
            let post = PostStore::find_by_id(self.inner.as_ref(), id).await;
            tokio::time::sleep(self.delay).await;
            post
        }

        async fn find_by_user_id(
            &self,
            user_id: i64,
        ) -> AppResult<Vec<posts_db::entities::post::Model>> {
            self.inner.find_by_user_id(user_id).await
        }

        async fn find_by_user_ids(
            &self,
            user_ids: &[i64],
        ) -> AppResult<Vec<posts_db::entities::post::Model>> {
            self.inner.find_by_user_ids(user_ids).await
        }

        async fn update_counters(
            &self,
            id: i64,
            total_likes: i32,
            total_unlikes: i32,
        ) -> AppResult<posts_db::entities::post::Model> {
            self.inner.update_counters(id, total_likes, total_unlikes).await
        }

        async fn delete_with_associations(&self, id: i64) -> AppResult<()> {
            self.inner.delete_with_associations(id).await
        }
    }

    #[tokio::test]
    async fn test_comment_racing_post_delete_leaves_no_orphan() {
        let store = Arc::new(InMemoryStore::new());
        let slow = Arc::new(SlowLookupStore {
            inner: store.clone(),
            delay: std::time::Duration::from_millis(10),
        });
        let locks = PostLocks::new();
        let job_service = JobService::new(&JobsConfig::default());

        let comments = CommentService::new(
            store.clone(),
            slow,
            locks.clone(),
            job_service.sender(),
            CommentPolicy::RejectMissingPost,
        );
        let posts = PostService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(RecordingMediaService::new()),
            locks,
            job_service.sender(),
        );
        let post_id = create_post(&store).await;
        let ctx = RequestContext::new();

        let (created, deleted) = tokio::join!(
            comments.create(&ctx, input(post_id, "just in time")),
            posts.delete(&ctx, post_id),
        );

        assert!(created.is_ok() || matches!(created, Err(AppError::PostNotFound(_))));
        deleted.unwrap();
        assert!(PostStore::find_by_id(store.as_ref(), post_id).await.unwrap().is_none());
        assert!(
            CommentStore::find_by_post(store.as_ref(), post_id)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
