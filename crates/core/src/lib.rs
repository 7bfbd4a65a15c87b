//! Engagement core: posts, likes, comments and their side effects.

pub mod services;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use services::*;
