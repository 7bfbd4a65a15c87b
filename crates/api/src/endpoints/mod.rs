//! API endpoints.

mod comments;
mod health;
mod likes;
mod posts;

use axum::Router;

use crate::middleware::AppState;

pub use comments::{CommentResponse, CreateCommentRequest};
pub use health::health;
pub use likes::{CreateLikeRequest, LikeResponse};
pub use posts::{PostResponse, PostsByUsersRequest};

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/posts", posts::router())
        .nest("/likes", likes::router())
        .nest("/comments", comments::router())
}
