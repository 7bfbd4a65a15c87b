//! Per-post mutual exclusion.
//!
//! Like events on the same post read the like set and then write counters.
//! Holding a [`PostGuard`] across that span serializes them within this
//! process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;

type LockMap = HashMap<i64, Arc<tokio::sync::Mutex<()>>>;

/// Registry of per-post async mutexes.
#[derive(Clone, Default)]
pub struct PostLocks {
    inner: Arc<Mutex<LockMap>>,
}

impl PostLocks {
    /// Empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `post_id`.
    pub async fn lock(&self, post_id: i64) -> PostGuard {
        let entry = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            map.entry(post_id).or_default().clone()
        };

        PostGuard {
            post_id,
            locks: self.inner.clone(),
            guard: Some(entry.lock_owned().await),
        }
    }

    /// Number of posts with a live lock entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no post is currently locked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive access to one post. The entry is removed once nobody holds or
/// waits for it.
pub struct PostGuard {
    post_id: i64,
    locks: Arc<Mutex<LockMap>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for PostGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut map = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if map
            .get(&self.post_id)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            map.remove(&self.post_id);
        }
    }
}
