//! Event publisher service.
//!
//! Abstraction over the one-way message bus. The Redis implementation lives
//! in the queue crate; core services only see [`EventPublisher`].

use async_trait::async_trait;
use posts_common::AppResult;
use serde_json::Value;
use std::sync::Arc;

/// Publishes fire-and-forget messages to a named channel.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish `payload` on `channel`. No acknowledgment is awaited.
    async fn publish(&self, channel: &str, payload: Value) -> AppResult<()>;
}

/// Publisher that drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, channel: &str, _payload: Value) -> AppResult<()> {
        tracing::trace!(channel = %channel, "Dropping event (no-op publisher)");
        Ok(())
    }
}

/// Type alias for a shared event publisher.
pub type EventPublisherService = Arc<dyn EventPublisher>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_noop_publisher_accepts_everything() {
        let publisher: EventPublisherService = Arc::new(NoOpEventPublisher);
        publisher
            .publish("notifications", json!({"message": "hi"}))
            .await
            .unwrap();
    }
}
