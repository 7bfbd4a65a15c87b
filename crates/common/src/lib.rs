//! Common utilities and shared types for posts-rs.
//!
//! This crate provides foundational components used across all posts-rs crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Request context**: Deadlines and cancellation via [`RequestContext`]
//!
//! # Example
//!
//! ```no_run
//! use posts_common::{AppResult, Config, RequestContext};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let ctx = RequestContext::with_timeout(config.server.request_timeout());
//!     ctx.check()?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod error;

pub use config::{CommentPolicy, Config, EngagementConfig, OrphanLikePolicy};
pub use context::RequestContext;
pub use error::{AppError, AppResult};
