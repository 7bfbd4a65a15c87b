//! User directory client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use posts_common::{AppError, AppResult, RequestContext};
use serde::{Deserialize, Serialize};

/// Profile attributes this service needs from the user directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, rename = "auth0Id", alias = "Auth0ID", alias = "authId")]
    pub auth_id: String,
    #[serde(default, alias = "Username")]
    pub username: String,
}

/// Looks users up by numeric id.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user(&self, ctx: &RequestContext, user_id: i64) -> AppResult<UserProfile>;
}

/// Type alias for a shared user directory.
pub type UserDirectoryRef = Arc<dyn UserDirectory>;

/// HTTP user directory client.
#[derive(Clone)]
pub struct RestUserDirectory {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl RestUserDirectory {
    /// Client for the user directory at `base_url`.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            timeout,
        }
    }

    fn user_url(&self, user_id: i64) -> String {
        format!("{}/users/{user_id}", self.base_url.trim_end_matches('/'))
    }

    async fn fetch(&self, user_id: i64) -> AppResult<UserProfile> {
        let response = self
            .http_client
            .get(self.user_url(user_id))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("user lookup failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("User {user_id}")));
        }
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "user directory answered {status}"
            )));
        }

        response
            .json::<UserProfile>()
            .await
            .map_err(|e| AppError::Upstream(format!("invalid user response: {e}")))
    }
}

#[async_trait]
impl UserDirectory for RestUserDirectory {
    async fn get_user(&self, ctx: &RequestContext, user_id: i64) -> AppResult<UserProfile> {
        ctx.bounded("user lookup", self.timeout, self.fetch(user_id))
            .await
    }
}
