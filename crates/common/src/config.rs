//! Application configuration.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Redis configuration.
    pub redis: RedisConfig,
    /// Upstream service endpoints.
    pub services: ServicesConfig,
    /// Event bus channel names.
    #[serde(default)]
    pub bus: BusConfig,
    /// Background job queue settings.
    #[serde(default)]
    pub jobs: JobsConfig,
    /// Engagement policies.
    #[serde(default)]
    pub engagement: EngagementConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Deadline applied to every inbound request, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL.
    pub url: String,
    /// Key prefix for all Redis streams.
    #[serde(default = "default_redis_prefix")]
    pub prefix: String,
    /// Approximate number of entries kept per stream.
    #[serde(default = "default_stream_max_len")]
    pub stream_max_len: i64,
}

/// Upstream HTTP services.
#[derive(Debug, Clone, Deserialize)]
pub struct ServicesConfig {
    /// Base URL of the media service.
    pub media_url: String,
    /// Base URL of the user directory.
    pub user_directory_url: String,
    /// Timeout for a single upstream call, in seconds.
    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_secs: u64,
}

/// Channels used on the event bus.
#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    /// Channel for user notifications.
    #[serde(default = "default_notification_channel")]
    pub notification_channel: String,
    /// Channel for media delete commands.
    #[serde(default = "default_media_delete_channel")]
    pub media_delete_channel: String,
}

/// Background job queue configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    /// Capacity of the job channel.
    #[serde(default = "default_job_buffer")]
    pub buffer_size: usize,
    /// Maximum number of jobs processed concurrently.
    #[serde(default = "default_job_workers")]
    pub workers: usize,
    /// Upper bound on a single job, in seconds.
    #[serde(default = "default_job_timeout")]
    pub timeout_secs: u64,
}

/// What to do with a comment whose parent post does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentPolicy {
    /// Fail with `PostNotFound` and persist nothing.
    #[default]
    RejectMissingPost,
    /// Persist the comment and skip the owner notification.
    AcceptWithoutNotification,
}

/// What to do with a like written for a post that turns out to be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanLikePolicy {
    /// Undo the like write before returning `PostNotFound`.
    #[default]
    RollBack,
    /// Leave the like row in place.
    Keep,
}

/// Engagement behavior switches.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct EngagementConfig {
    /// Comment creation policy.
    #[serde(default)]
    pub comment_policy: CommentPolicy,
    /// Like upsert policy for missing posts.
    #[serde(default)]
    pub orphan_like_policy: OrphanLikePolicy,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8083
}

const fn default_request_timeout() -> u64 {
    30
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_redis_prefix() -> String {
    "posts".to_string()
}

const fn default_stream_max_len() -> i64 {
    100_000
}

const fn default_upstream_timeout() -> u64 {
    10
}

fn default_notification_channel() -> String {
    "notifications".to_string()
}

fn default_media_delete_channel() -> String {
    "media:delete".to_string()
}

const fn default_job_buffer() -> usize {
    1000
}

const fn default_job_workers() -> usize {
    4
}

const fn default_job_timeout() -> u64 {
    5
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            notification_channel: default_notification_channel(),
            media_delete_channel: default_media_delete_channel(),
        }
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_job_buffer(),
            workers: default_job_workers(),
            timeout_secs: default_job_timeout(),
        }
    }
}

impl ServerConfig {
    /// Request deadline as a duration.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ServicesConfig {
    /// Upstream call timeout as a duration.
    #[must_use]
    pub const fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

impl JobsConfig {
    /// Per-job timeout as a duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `POSTS_ENV`)
    /// 3. Environment variables with `POSTS_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("POSTS_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("POSTS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("POSTS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
