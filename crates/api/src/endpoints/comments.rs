//! Comments endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use posts_common::AppResult;
use posts_core::CreateCommentInput;
use posts_db::entities::comment;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    extractors::Ctx,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Create comment request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(range(min = 1))]
    pub post_id: i64,
    #[validate(range(min = 1))]
    pub user_id: i64,
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}

/// Comment response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
    pub content: String,
    pub created_at: String,
}

impl From<comment::Model> for CommentResponse {
    fn from(c: comment::Model) -> Self {
        Self {
            id: c.id,
            user_id: c.user_id,
            post_id: c.post_id,
            content: c.content,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

async fn create(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    req.validate()?;
    let comment = state
        .comment_service
        .create(
            &ctx,
            CreateCommentInput {
                post_id: req.post_id,
                user_id: req.user_id,
                content: req.content,
            },
        )
        .await?;
    Ok(ApiResponse::created(comment.into()))
}

async fn remove(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.comment_service.delete(&ctx, id).await?;
    Ok(no_content())
}

async fn by_post(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(post_id): Path<i64>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let comments = state.comment_service.list_by_post(&ctx, post_id).await?;
    Ok(ApiResponse::ok(comments.into_iter().map(Into::into).collect()))
}

/// Comment routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", delete(remove))
        .route("/posts/{post_id}", get(by_post))
}
