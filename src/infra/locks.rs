//! Keyed in-process locks.
//!
//! A [`LockRegistry`] hands out one async mutex per resource key. Holders of
//! the same key run one at a time; different keys never contend. Entries are
//! dropped from the registry once no task holds or awaits them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockTable = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// Registry of per-resource async locks.
#[derive(Clone, Default)]
pub struct LockRegistry {
    locks: LockTable,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive ownership of `resource`.
    /// Returns a LockGuard that releases the lock when dropped.
    pub async fn acquire_lock(&self, resource: &str) -> LockGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks
                .entry(resource.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        let guard = lock.lock_owned().await;
        tracing::trace!(resource = %resource, "Lock acquired");

        LockGuard {
            locks: self.locks.clone(),
            key: resource.to_string(),
            guard: Some(guard),
        }
    }

    /// Check if a resource is currently held.
    pub fn is_locked(&self, resource: &str) -> bool {
        let locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .get(resource)
            .map(|lock| lock.try_lock().is_err())
            .unwrap_or(false)
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// RAII guard for a keyed lock.
pub struct LockGuard {
    locks: LockTable,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // Release first so the strong count below only sees the table and waiters
        drop(self.guard.take());

        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(lock) = locks.get(&self.key) {
            if Arc::strong_count(lock) == 1 {
                locks.remove(&self.key);
            }
        }
        tracing::trace!(resource = %self.key, "Lock released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let registry = LockRegistry::new();
        let inside = Arc::new(AtomicU32::new(0));
        let max_inside = Arc::new(AtomicU32::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                let inside = inside.clone();
                let max_inside = max_inside.clone();
                tokio::spawn(async move {
                    let _guard = registry.acquire_lock("post:1").await;
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_inside.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let registry = LockRegistry::new();
        let _a = registry.acquire_lock("post:a").await;

        let b = tokio::time::timeout(Duration::from_millis(100), registry.acquire_lock("post:b")).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_entries_are_cleaned_up() {
        let registry = LockRegistry::new();
        {
            let _guard = registry.acquire_lock("post:1").await;
            assert!(registry.is_locked("post:1"));
            assert_eq!(registry.len(), 1);
        }
        assert!(!registry.is_locked("post:1"));
        assert!(registry.is_empty());
    }
}
