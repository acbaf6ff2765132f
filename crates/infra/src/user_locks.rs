//! Per-user async locks serializing cart mutations within one process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use storefront_core::UserId;

/// Map size above which idle entries are dropped on the next acquire.
const PRUNE_THRESHOLD: usize = 1_024;

#[derive(Debug, Default)]
pub struct UserLocks {
    inner: Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user`'s cart. Released when the guard drops.
    pub async fn lock(&self, user: UserId) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            if map.len() > PRUNE_THRESHOLD {
                // Only the map holds an idle entry.
                map.retain(|_, m| Arc::strong_count(m) > 1);
            }
            map.entry(user).or_default().clone()
        };
        mutex.lock_owned().await
    }

    pub fn tracked_users(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
