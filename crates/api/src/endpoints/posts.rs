//! Posts endpoints.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
};
use bytes::Bytes;
use posts_common::{AppError, AppResult};
use posts_core::{CreatePostInput, MediaUpload};
use posts_db::entities::post;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    extractors::Ctx,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Post response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub media_id: i64,
    pub total_likes: i32,
    pub total_unlikes: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<post::Model> for PostResponse {
    fn from(p: post::Model) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            description: p.description,
            media_id: p.media_id,
            total_likes: p.total_likes,
            total_unlikes: p.total_unlikes,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

/// Text fields of the multipart create form.
#[derive(Debug, Default, Validate)]
struct CreatePostForm {
    #[validate(length(max = 2000))]
    description: String,
    #[validate(range(min = 1))]
    user_id: i64,
}

fn bad_request(e: impl std::fmt::Display) -> AppError {
    AppError::BadRequest(e.to_string())
}

/// Create a post from a multipart form with `description`, `userId` and `files`.
async fn create(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<PostResponse>> {
    let mut form = CreatePostForm::default();
    let mut user_id_seen = false;
    let mut media: Option<MediaUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "files" | "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(ToString::to_string);
                let bytes: Bytes = field.bytes().await.map_err(bad_request)?;
                media = Some(MediaUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            "description" => {
                form.description = field.text().await.map_err(bad_request)?;
            }
            "userId" => {
                let text = field.text().await.map_err(bad_request)?;
                form.user_id = text
                    .trim()
                    .parse()
                    .map_err(|_| AppError::BadRequest(format!("Invalid userId: {text}")))?;
                user_id_seen = true;
            }
            _ => {}
        }
    }

    if !user_id_seen {
        return Err(AppError::BadRequest("userId is required".to_string()));
    }
    form.validate()?;
    let media = media.ok_or_else(|| AppError::BadRequest("files is required".to_string()))?;
    if media.bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
    }

    let post = state
        .post_service
        .create(
            &ctx,
            CreatePostInput {
                user_id: form.user_id,
                description: form.description,
                media,
            },
        )
        .await?;

    Ok(ApiResponse::created(post.into()))
}

/// Get a post by ID.
async fn show(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.get(&ctx, id).await?;
    Ok(ApiResponse::ok(post.into()))
}

/// Delete a post with its likes, comments and media.
async fn delete(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.post_service.delete(&ctx, id).await?;
    Ok(no_content())
}

/// Posts of one user.
async fn by_user(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(user_id): Path<i64>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let posts = state.post_service.list_by_user(&ctx, user_id).await?;
    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

/// Posts by users request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostsByUsersRequest {
    #[validate(length(max = 1000))]
    pub user_ids: Vec<i64>,
}

/// Posts of several users.
async fn by_users(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Json(req): Json<PostsByUsersRequest>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    req.validate()?;
    let posts = state.post_service.list_by_users(&ctx, &req.user_ids).await?;
    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

/// Post routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", get(show).delete(delete))
        .route("/users", post(by_users))
        .route("/users/{user_id}", get(by_user))
}
