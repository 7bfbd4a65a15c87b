//! Per-request context.
//!
//! Every service operation receives a [`RequestContext`]. It carries the
//! request id used in log fields, an optional deadline, and a cancellation
//! token. Upstream calls go through [`RequestContext::bounded`] so that no
//! call outlives the request or its own timeout.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{AppError, AppResult};

/// Request-scoped deadline and cancellation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Uuid,
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext {
    /// Create a context without a deadline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            deadline: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Create a context that expires after `timeout`.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
            ..Self::new()
        }
    }

    /// Replace the generated request id (e.g. with an inbound `X-Request-Id`).
    #[must_use]
    pub const fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Context for work that runs after the request is gone.
    ///
    /// Keeps the request id for log correlation. The deadline starts now and
    /// the token is fresh, so cancelling the request does not cancel the work.
    #[must_use]
    pub fn background(request_id: Uuid, timeout: Duration) -> Self {
        Self::with_timeout(timeout).with_request_id(request_id)
    }

    /// Request id.
    #[must_use]
    pub const fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Absolute deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline. `None` means unbounded.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Cancel this context and every clone of it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the context was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Underlying cancellation token.
    #[must_use]
    pub const fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fail fast when the request is already cancelled or past its deadline.
    pub fn check(&self) -> AppResult<()> {
        if self.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        if self.remaining().is_some_and(|left| left.is_zero()) {
            return Err(AppError::Timeout("request deadline".to_string()));
        }
        Ok(())
    }

    /// Run `fut` bounded by `limit`, the request deadline and cancellation,
    /// whichever comes first.
    pub async fn bounded<F, T>(&self, operation: &str, limit: Duration, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        self.check()?;

        let budget = self.remaining().map_or(limit, |left| left.min(limit));

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(AppError::Cancelled),
            result = tokio::time::timeout(budget, fut) => {
                result.map_err(|_| AppError::Timeout(operation.to_string()))?
            }
        }
    }
}
