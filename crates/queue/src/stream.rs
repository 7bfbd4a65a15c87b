//! Redis Streams event bus.
//!
//! Every message is wrapped in an [`Envelope`] carrying a fresh message id
//! and a timestamp, and appended to the stream `{prefix}:{channel}`.
//! Entries stay in the stream until trimmed, so a consumer that is offline
//! when a message is published reads it once it reconnects.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fred::clients::Client;
use fred::error::{Error as RedisError, ErrorKind};
use fred::interfaces::{ClientLike, StreamsInterface};
use fred::types::config::Config as RedisConfig;
use posts_common::{AppError, AppResult};
use posts_core::services::EventPublisher;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

/// Content type of every envelope body.
pub const CONTENT_TYPE: &str = "application/json";

/// Stream entry field holding the serialized envelope.
pub const ENVELOPE_FIELD: &str = "envelope";

/// Wire format of a published message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub message_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub content_type: String,
    pub body: Value,
}

impl Envelope {
    /// Wrap `body` with a new message id and the current time.
    #[must_use]
    pub fn new(body: Value) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            content_type: CONTENT_TYPE.to_string(),
            body,
        }
    }
}

/// Redis-backed event publisher.
#[derive(Clone)]
pub struct RedisStreamBus {
    client: Client,
    prefix: String,
    max_len: i64,
}

impl RedisStreamBus {
    /// Connect to Redis.
    ///
    /// Streams are trimmed to roughly `max_len` entries on every append.
    pub async fn new(
        redis_url: &str,
        prefix: impl Into<String>,
        max_len: i64,
    ) -> Result<Self, RedisError> {
        let config = RedisConfig::from_url(redis_url)?;

        let client = Client::new(config, None, None, None);
        client.init().await?;

        info!("Redis stream bus initialized");

        Ok(Self {
            client,
            prefix: prefix.into(),
            max_len,
        })
    }

    /// Fully qualified stream key.
    #[must_use]
    pub fn stream_key(&self, channel: &str) -> String {
        qualify(&self.prefix, channel)
    }

    /// Append an envelope to the channel's stream. Returns the entry id.
    pub async fn publish_envelope(
        &self,
        channel: &str,
        envelope: &Envelope,
    ) -> Result<String, RedisError> {
        let fields = stream_fields(envelope)?;
        let key = self.stream_key(channel);
        let entry_id: String = self
            .client
            .xadd(
                key.as_str(),
                false,
                ("MAXLEN", "~", self.max_len),
                "*",
                fields,
            )
            .await?;
        debug!(
            stream = %key,
            entry_id = %entry_id,
            message_id = %envelope.message_id,
            "Appended message"
        );
        Ok(entry_id)
    }

    /// Close the connection.
    pub async fn shutdown(&self) -> Result<(), RedisError> {
        self.client.quit().await?;
        info!("Redis stream bus shutdown");
        Ok(())
    }
}

fn qualify(prefix: &str, channel: &str) -> String {
    if prefix.is_empty() {
        channel.to_string()
    } else {
        format!("{prefix}:{channel}")
    }
}

fn stream_fields(envelope: &Envelope) -> Result<Vec<(&'static str, String)>, RedisError> {
    let payload = serde_json::to_string(envelope).map_err(|e| {
        RedisError::new(
            ErrorKind::InvalidArgument,
            format!("Serialization error: {e}"),
        )
    })?;
    Ok(vec![(ENVELOPE_FIELD, payload)])
}

#[async_trait]
impl EventPublisher for RedisStreamBus {
    async fn publish(&self, channel: &str, payload: Value) -> AppResult<()> {
        self.publish_envelope(channel, &Envelope::new(payload))
            .await
            .map(drop)
            .map_err(|e| AppError::Upstream(format!("publish to {channel} failed: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stream_keys() {
        assert_eq!(qualify("posts", "notifications"), "posts:notifications");
        assert_eq!(qualify("", "media:delete"), "media:delete");
    }

    #[test]
    fn test_envelope_serialization() {
        let envelope = Envelope::new(json!({"id": 4, "url": ""}));

        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["contentType"], "application/json");
        assert_eq!(value["body"], json!({"id": 4, "url": ""}));
        assert_eq!(value["messageId"], envelope.message_id.to_string());
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_stream_entry_carries_whole_envelope() {
        let envelope = Envelope::new(json!({"id": 9, "url": "https://cdn/x.png"}));

        let fields = stream_fields(&envelope).unwrap();

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].0, "envelope");
        let decoded: Envelope = serde_json::from_str(&fields[0].1).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn test_envelopes_get_distinct_ids() {
        let first = Envelope::new(Value::Null);
        let second = Envelope::new(Value::Null);
        assert_ne!(first.message_id, second.message_id);
    }
}
