//! Notification dispatcher.
//!
//! Turns an engagement event into a message for the post owner. Both user
//! lookups are best-effort: a failed lookup leaves the corresponding fields
//! empty and the message is still published.

use posts_common::{AppError, AppResult, RequestContext};
use posts_db::entities::Polarity;
use serde::{Deserialize, Serialize};

use crate::services::event_publisher::EventPublisherService;
use crate::services::user_directory::{UserDirectoryRef, UserProfile};

/// What happened to the post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Comment,
    Like(Polarity),
}

impl NoticeKind {
    /// Tag carried in the published payload.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Like(_) => "like",
        }
    }

    /// Human-readable message text.
    #[must_use]
    pub fn message(self, from_username: &str) -> String {
        match self {
            Self::Comment => format!("{from_username} commented on your post."),
            Self::Like(Polarity::Positive) => format!("{from_username} liked your post."),
            Self::Like(Polarity::Negative) => format!("{from_username} disliked your post."),
        }
    }
}

/// A pending notification: `from_user_id` acted on a post owned by `to_user_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub from_user_id: i64,
    pub to_user_id: i64,
    pub kind: NoticeKind,
}

/// Payload published on the notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub message: String,
    pub user_auth_id: String,
    pub notification_type: String,
}

/// Resolves users and publishes notifications.
#[derive(Clone)]
pub struct NotificationDispatcher {
    users: UserDirectoryRef,
    events: EventPublisherService,
    channel: String,
}

impl NotificationDispatcher {
    /// Create a new dispatcher publishing on `channel`.
    #[must_use]
    pub fn new(
        users: UserDirectoryRef,
        events: EventPublisherService,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            users,
            events,
            channel: channel.into(),
        }
    }

    async fn profile(&self, ctx: &RequestContext, user_id: i64) -> UserProfile {
        match self.users.get_user(ctx, user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    user_id,
                    error = %e,
                    "User lookup failed, notifying with empty profile"
                );
                UserProfile::default()
            }
        }
    }

    /// Resolve both users and build the payload.
    pub async fn build(&self, ctx: &RequestContext, notice: Notice) -> Notification {
        let (from, to) = tokio::join!(
            self.profile(ctx, notice.from_user_id),
            self.profile(ctx, notice.to_user_id),
        );

        Notification {
            message: notice.kind.message(&from.username),
            user_auth_id: to.auth_id,
            notification_type: notice.kind.tag().to_string(),
        }
    }

    /// Build and publish a notification.
    pub async fn deliver(&self, ctx: &RequestContext, notice: Notice) -> AppResult<()> {
        let notification = self.build(ctx, notice).await;
        let payload = serde_json::to_value(&notification)
            .map_err(|e| AppError::Internal(format!("Failed to encode notification: {e}")))?;

        self.events.publish(&self.channel, payload).await?;

        tracing::debug!(
            request_id = %ctx.request_id(),
            to_user_id = notice.to_user_id,
            notification_type = notice.kind.tag(),
            "Notification published"
        );
        Ok(())
    }
}
