//! Like service.
//!
//! Owns the like upsert and the denormalized counters on the post. Creating
//! or changing a like recounts every like on the post; removing one
//! decrements the matching counter.

use posts_common::{AppError, AppResult, OrphanLikePolicy, RequestContext};
use posts_db::entities::{Polarity, like, post};
use posts_db::{LikeStoreRef, NewLike, PostStoreRef};
use tracing::{debug, error, warn};

use crate::services::jobs::JobSender;
use crate::services::locks::PostLocks;
use crate::services::notification::{Notice, NoticeKind};

/// Counts likes by polarity as `(total_likes, total_unlikes)`.
#[must_use]
pub fn tally(likes: &[like::Model]) -> (i32, i32) {
    likes
        .iter()
        .fold((0, 0), |(positive, negative), like| match like.polarity {
            Polarity::Positive => (positive + 1, negative),
            Polarity::Negative => (positive, negative + 1),
        })
}

/// Like service for business logic.
#[derive(Clone)]
pub struct LikeService {
    like_store: LikeStoreRef,
    post_store: PostStoreRef,
    locks: PostLocks,
    jobs: JobSender,
    orphan_policy: OrphanLikePolicy,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub const fn new(
        like_store: LikeStoreRef,
        post_store: PostStoreRef,
        locks: PostLocks,
        jobs: JobSender,
        orphan_policy: OrphanLikePolicy,
    ) -> Self {
        Self {
            like_store,
            post_store,
            locks,
            jobs,
            orphan_policy,
        }
    }

    /// Like or dislike a post. A user has at most one like per post; a second
    /// call changes the polarity of the existing one.
    pub async fn create_or_update(
        &self,
        ctx: &RequestContext,
        user_id: i64,
        post_id: i64,
        polarity: Polarity,
    ) -> AppResult<like::Model> {
        ctx.check()?;
        let _guard = self.locks.lock(post_id).await;

        let previous = self
            .like_store
            .find_by_user_and_post(user_id, post_id)
            .await?;

        let like = match &previous {
            Some(existing) => {
                self.like_store
                    .update_polarity(existing.id, polarity)
                    .await?
            }
            None => {
                self.like_store
                    .insert(NewLike {
                        user_id,
                        post_id,
                        polarity,
                    })
                    .await?
            }
        };

        let Some(post) = self.post_store.find_by_id(post_id).await? else {
            self.handle_orphan(&like, previous.as_ref()).await?;
            return Err(AppError::PostNotFound(post_id));
        };

        let post = self.recompute(post.id).await?;
        debug!(
            request_id = %ctx.request_id(),
            post_id,
            user_id,
            total_likes = post.total_likes,
            total_unlikes = post.total_unlikes,
            "Like stored"
        );

        self.jobs.notify(
            ctx,
            Notice {
                from_user_id: user_id,
                to_user_id: post.user_id,
                kind: NoticeKind::Like(polarity),
            },
        );

        Ok(like)
    }

    /// Remove a user's like from a post. Missing likes and posts are not errors.
    pub async fn delete(&self, ctx: &RequestContext, user_id: i64, post_id: i64) -> AppResult<()> {
        ctx.check()?;
        let _guard = self.locks.lock(post_id).await;

        let Some(like) = self
            .like_store
            .find_by_user_and_post(user_id, post_id)
            .await?
        else {
            debug!(post_id, user_id, "No like to delete");
            return Ok(());
        };

        self.like_store.delete(like.id).await?;

        let Some(post) = self.post_store.find_by_id(post_id).await? else {
            return Ok(());
        };

        let (total_likes, total_unlikes) = match like.polarity {
            Polarity::Positive => ((post.total_likes - 1).max(0), post.total_unlikes),
            Polarity::Negative => (post.total_likes, (post.total_unlikes - 1).max(0)),
        };

        match self
            .post_store
            .update_counters(post_id, total_likes, total_unlikes)
            .await
        {
            Ok(_) | Err(AppError::PostNotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// All likes on a post.
    pub async fn list_by_post(
        &self,
        ctx: &RequestContext,
        post_id: i64,
    ) -> AppResult<Vec<like::Model>> {
        ctx.check()?;
        self.like_store.find_by_post(post_id).await
    }

    /// Recount the counters of a post from its likes.
    pub async fn recount(&self, ctx: &RequestContext, post_id: i64) -> AppResult<post::Model> {
        ctx.check()?;
        let _guard = self.locks.lock(post_id).await;
        self.recompute(post_id).await
    }

    async fn recompute(&self, post_id: i64) -> AppResult<post::Model> {
        let likes = self.like_store.find_by_post(post_id).await?;
        let (total_likes, total_unlikes) = tally(&likes);
        self.post_store
            .update_counters(post_id, total_likes, total_unlikes)
            .await
    }

    async fn handle_orphan(
        &self,
        like: &like::Model,
        previous: Option<&like::Model>,
    ) -> AppResult<()> {
        match self.orphan_policy {
            OrphanLikePolicy::Keep => {
                warn!(
                    post_id = like.post_id,
                    like_id = like.id,
                    "Like stored for a missing post"
                );
                Ok(())
            }
            OrphanLikePolicy::RollBack => {
                let undone = match previous {
                    Some(prev) => self
                        .like_store
                        .update_polarity(prev.id, prev.polarity)
                        .await
                        .map(drop),
                    None => self.like_store.delete(like.id).await.map(drop),
                };
                undone.inspect_err(|e| {
                    error!(
                        post_id = like.post_id,
                        like_id = like.id,
                        error = %e,
                        "Failed to roll back like for a missing post"
                    );
                })
            }
        }
    }
}
