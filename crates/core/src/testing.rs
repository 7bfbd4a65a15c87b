//! Recording doubles for the external collaborators.
//!
//! Compiled for this crate's tests and, through the `test-utils` feature, for
//! downstream test suites.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use posts_common::{AppError, AppResult, RequestContext};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::services::event_publisher::EventPublisher;
use crate::services::media::{MediaService, MediaUpload};
use crate::services::user_directory::{UserDirectory, UserProfile};

/// Event publisher that keeps every message in memory.
#[derive(Default)]
pub struct RecordingEventPublisher {
    published: Mutex<Vec<(String, Value)>>,
    failing: AtomicBool,
}

impl RecordingEventPublisher {
    /// Empty publisher that accepts every message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every publish fail with an upstream error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Messages published so far, as `(channel, payload)`.
    pub async fn published(&self) -> Vec<(String, Value)> {
        self.published.lock().await.clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, channel: &str, payload: Value) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("bus unavailable".to_string()));
        }
        self.published
            .lock()
            .await
            .push((channel.to_string(), payload));
        Ok(())
    }
}

/// User directory backed by a fixed map. Unknown ids are `NotFound`.
#[derive(Default)]
pub struct StaticUserDirectory {
    users: HashMap<i64, UserProfile>,
}

impl StaticUserDirectory {
    /// Directory with no users.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user, replacing any previous entry with the same id.
    #[must_use]
    pub fn with_user(mut self, user_id: i64, auth_id: &str, username: &str) -> Self {
        self.users.insert(
            user_id,
            UserProfile {
                auth_id: auth_id.to_string(),
                username: username.to_string(),
            },
        );
        self
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn get_user(&self, ctx: &RequestContext, user_id: i64) -> AppResult<UserProfile> {
        ctx.check()?;
        self.users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User {user_id}")))
    }
}

/// Media service that hands out sequential ids and records deletions.
pub struct RecordingMediaService {
    next_id: AtomicI64,
    failing_uploads: AtomicBool,
    delete_delay: Mutex<Option<Duration>>,
    uploaded: Mutex<Vec<String>>,
    deleted: Mutex<Vec<i64>>,
}

impl Default for RecordingMediaService {
    fn default() -> Self {
        Self {
            next_id: AtomicI64::new(100),
            failing_uploads: AtomicBool::new(false),
            delete_delay: Mutex::new(None),
            uploaded: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingMediaService {
    /// Service whose first upload gets id 100.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every upload fail with an upstream error.
    pub fn set_failing_uploads(&self, failing: bool) {
        self.failing_uploads.store(failing, Ordering::SeqCst);
    }

    /// Sleep this long before recording a deletion.
    pub async fn set_delete_delay(&self, delay: Duration) {
        *self.delete_delay.lock().await = Some(delay);
    }

    /// File names uploaded so far.
    pub async fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().await.clone()
    }

    /// Media ids deleted so far.
    pub async fn deleted(&self) -> Vec<i64> {
        self.deleted.lock().await.clone()
    }
}

#[async_trait]
impl MediaService for RecordingMediaService {
    async fn upload(&self, ctx: &RequestContext, file: MediaUpload) -> AppResult<i64> {
        ctx.check()?;
        if self.failing_uploads.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("media service unavailable".to_string()));
        }
        self.uploaded.lock().await.push(file.file_name);
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn delete(&self, ctx: &RequestContext, media_id: i64) -> AppResult<()> {
        ctx.check()?;
        let delay = *self.delete_delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.deleted.lock().await.push(media_id);
        Ok(())
    }
}
