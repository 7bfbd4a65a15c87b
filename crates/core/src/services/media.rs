//! Media service client.
//!
//! Uploads go straight to the media service over HTTP. Deletes are
//! published to the bus as a command and never awaited by the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use posts_common::{AppError, AppResult, RequestContext};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::services::event_publisher::EventPublisherService;

/// A file received from a client, ready to be forwarded.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Media reference as returned by the media service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    #[serde(alias = "Id")]
    pub id: i64,
    #[serde(default, alias = "Url")]
    pub url: String,
}

/// Media storage collaborator.
#[async_trait]
pub trait MediaService: Send + Sync {
    /// Store a file and return its media id.
    async fn upload(&self, ctx: &RequestContext, file: MediaUpload) -> AppResult<i64>;

    /// Request deletion of a stored file.
    async fn delete(&self, ctx: &RequestContext, media_id: i64) -> AppResult<()>;
}

/// Type alias for a shared media service.
pub type MediaServiceRef = Arc<dyn MediaService>;

/// HTTP + bus backed media client.
#[derive(Clone)]
pub struct RestMediaClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    events: EventPublisherService,
    delete_channel: String,
}

impl RestMediaClient {
    /// Create a new media client.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        timeout: Duration,
        events: EventPublisherService,
        delete_channel: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            timeout,
            events,
            delete_channel: delete_channel.into(),
        }
    }

    fn upload_url(&self) -> String {
        format!("{}/api/medias", self.base_url.trim_end_matches('/'))
    }

    async fn send_upload(&self, form: Form) -> AppResult<MediaRef> {
        let response = self
            .http_client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("media upload failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "media service answered {status}"
            )));
        }

        response
            .json::<MediaRef>()
            .await
            .map_err(|e| AppError::Upstream(format!("invalid media response: {e}")))
    }
}

#[async_trait]
impl MediaService for RestMediaClient {
    async fn upload(&self, ctx: &RequestContext, file: MediaUpload) -> AppResult<i64> {
        let mut part = Part::bytes(file.bytes.to_vec()).file_name(file.file_name);
        if let Some(content_type) = file.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|e| AppError::BadRequest(format!("Invalid content type: {e}")))?;
        }
        let form = Form::new().part("files", part);

        let media = ctx
            .bounded("media upload", self.timeout, self.send_upload(form))
            .await?;

        tracing::debug!(
            request_id = %ctx.request_id(),
            media_id = media.id,
            "Media uploaded"
        );
        Ok(media.id)
    }

    async fn delete(&self, ctx: &RequestContext, media_id: i64) -> AppResult<()> {
        let command = json!(MediaRef {
            id: media_id,
            url: String::new(),
        });

        ctx.bounded(
            "media delete",
            self.timeout,
            self.events.publish(&self.delete_channel, command),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::RecordingEventPublisher;

    fn client(events: EventPublisherService) -> RestMediaClient {
        RestMediaClient::new(
            reqwest::Client::new(),
            "http://media.local/",
            Duration::from_secs(1),
            events,
            "media:delete",
        )
    }

    #[test]
    fn test_upload_url_trims_trailing_slash() {
        let client = client(Arc::new(RecordingEventPublisher::new()));
        assert_eq!(client.upload_url(), "http://media.local/api/medias");
    }

    #[test]
    fn test_media_ref_accepts_both_casings() {
        let lower: MediaRef = serde_json::from_str(r#"{"id": 5, "url": "u"}"#).unwrap();
        let upper: MediaRef = serde_json::from_str(r#"{"Id": 5, "Url": "u"}"#).unwrap();
        assert_eq!(lower, upper);

        let bare: MediaRef = serde_json::from_str(r#"{"id": 6}"#).unwrap();
        assert!(bare.url.is_empty());
    }

    #[tokio::test]
    async fn test_delete_publishes_command() {
        let events = Arc::new(RecordingEventPublisher::new());
        let client = client(events.clone());

        client.delete(&RequestContext::new(), 42).await.unwrap();

        let published = events.published().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "media:delete");
        assert_eq!(published[0].1, json!({"id": 42, "url": ""}));
    }

    #[tokio::test]
    async fn test_delete_on_cancelled_context() {
        let events = Arc::new(RecordingEventPublisher::new());
        let client = client(events.clone());
        let ctx = RequestContext::new();
        ctx.cancel();

        let result = client.delete(&ctx, 42).await;

        assert!(matches!(result, Err(AppError::Cancelled)));
        assert!(events.published().await.is_empty());
    }
}
