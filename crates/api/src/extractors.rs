//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use posts_common::RequestContext;
use std::convert::Infallible;

/// Request context set by the `request_context` middleware. Outside the
/// middleware a fresh unbounded context is used.
#[derive(Debug, Clone)]
pub struct Ctx(pub RequestContext);

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<RequestContext>()
                .cloned()
                .unwrap_or_default(),
        ))
    }
}
