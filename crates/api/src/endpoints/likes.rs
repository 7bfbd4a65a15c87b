//! Likes endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use posts_common::AppResult;
use posts_db::entities::{Polarity, like};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    extractors::Ctx,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Like or dislike request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLikeRequest {
    #[validate(range(min = 1))]
    pub user_id: i64,
    #[validate(range(min = 1))]
    pub post_id: i64,
    pub polarity: Polarity,
}

/// Like response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
    pub polarity: Polarity,
    pub created_at: String,
    pub updated_at: String,
}

impl From<like::Model> for LikeResponse {
    fn from(l: like::Model) -> Self {
        Self {
            id: l.id,
            user_id: l.user_id,
            post_id: l.post_id,
            polarity: l.polarity,
            created_at: l.created_at.to_rfc3339(),
            updated_at: l.updated_at.to_rfc3339(),
        }
    }
}

/// Create or change the caller's like on a post.
async fn create(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Json(req): Json<CreateLikeRequest>,
) -> AppResult<ApiResponse<LikeResponse>> {
    req.validate()?;
    let like = state
        .like_service
        .create_or_update(&ctx, req.user_id, req.post_id, req.polarity)
        .await?;
    Ok(ApiResponse::created(like.into()))
}

/// Remove a user's like from a post.
async fn remove(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path((user_id, post_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.like_service.delete(&ctx, user_id, post_id).await?;
    Ok(no_content())
}

/// Likes on a post.
async fn by_post(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(post_id): Path<i64>,
) -> AppResult<ApiResponse<Vec<LikeResponse>>> {
    let likes = state.like_service.list_by_post(&ctx, post_id).await?;
    Ok(ApiResponse::ok(likes.into_iter().map(Into::into).collect()))
}

/// Like routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/users/{user_id}/posts/{post_id}", delete(remove))
        .route("/posts/{post_id}", get(by_post))
}
