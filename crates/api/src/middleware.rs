//! Application state and request middleware.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use posts_common::RequestContext;
use posts_core::{CommentService, LikeService, PostService};
use uuid::Uuid;

/// Header carrying the request id in both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub post_service: PostService,
    pub like_service: LikeService,
    pub comment_service: CommentService,
    pub request_timeout: Duration,
}

/// Attach a [`RequestContext`] to every request.
///
/// The inbound `X-Request-Id` is reused when it is a UUID. The context is
/// cancelled when the request finishes or the client goes away.
pub async fn request_context(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let inbound = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok());

    let mut ctx = RequestContext::with_timeout(state.request_timeout);
    if let Some(request_id) = inbound {
        ctx = ctx.with_request_id(request_id);
    }
    let request_id = ctx.request_id();
    let _cancel_on_drop = ctx.cancellation_token().clone().drop_guard();

    request.extensions_mut().insert(ctx);
    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
