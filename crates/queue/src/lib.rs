//! Message bus for posts-rs.
//!
//! Notifications and media-delete commands leave the service as entries on
//! Redis Streams, one stream per channel. [`RedisStreamBus`] implements the
//! core [`EventPublisher`] trait.
//!
//! [`EventPublisher`]: posts_core::services::EventPublisher

pub mod stream;

pub use stream::{CONTENT_TYPE, ENVELOPE_FIELD, Envelope, RedisStreamBus};
