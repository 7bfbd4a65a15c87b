//! HTTP API layer for posts-rs.
//!
//! Thin axum handlers over the core services. Every handler receives a
//! request context from [`middleware::request_context`]; errors render
//! through `AppError`.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Router, extract::DefaultBodyLimit, routing::get};

pub use endpoints::router;
pub use middleware::AppState;

/// Largest accepted request body, multipart uploads included.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// The full application: `/health` plus the API under `/api`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(endpoints::health))
        .nest("/api", router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::request_context,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
