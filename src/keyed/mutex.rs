//! # KeyedMutex: per-key exclusive locks with idle reclamation.
//!
//! [`KeyedMutex`] scopes mutual exclusion to a logical key (a resource id, an
//! account, a file path) instead of one global lock, without keeping a lock
//! object alive forever for every key ever seen: once no caller holds or
//! waits on a key, its entry is removed from the registry.
//!
//! ## Architecture
//! ```text
//!                     ┌───────────────────────────────┐
//!   lock("a") ──────► │ registry (one guard)          │
//!   lock("b") ──────► │   "a" → { mutex, waiters: 2 } │
//!   lock("a") ──────► │   "b" → { mutex, waiters: 1 } │
//!                     └──────────┬────────────────────┘
//!                                │ clone per-key handle, waiters += 1
//!                                ▼
//!                    await per-key mutex (outside the registry guard)
//! ```
//!
//! ## Rules
//! - An entry exists in the registry **iff** its waiter count is above zero;
//!   the count includes the current holder.
//! - The waiter count is incremented before the registry guard is released,
//!   so an entry can never be deleted between lookup and increment.
//! - The per-key mutex is awaited **outside** the registry guard; callers for
//!   different keys only contend for the duration of a lookup/insert.
//! - Unlock is guard drop. Unbalanced unlock is unrepresentable.
//! - No FIFO guarantee among same-key waiters; acquisition order is whatever
//!   the underlying async mutex provides.
//!
//! The lock is not reentrant: awaiting `lock` twice for the same key from the
//! same task deadlocks, like any non-reentrant mutex.
//!
//! ## Example
//! ```rust
//! use workgate::KeyedMutex;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let locks: KeyedMutex<String> = KeyedMutex::new();
//!
//! let guard = locks.lock("user:42".to_string()).await;
//! // ...critical section for user 42; other keys proceed freely...
//! drop(guard);
//!
//! assert!(locks.is_empty()); // idle keys are reclaimed
//! # }
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::time;

use crate::error::LockError;

/// Per-key lock state: the shared mutex handle and the number of callers
/// currently holding or waiting on it.
struct LockEntry {
    handle: Arc<AsyncMutex<()>>,
    waiters: usize,
}

/// Registry of per-key exclusive locks.
///
/// ### Properties
/// - **Scoped exclusion**: at most one holder per key at a time.
/// - **Reclamation**: entries disappear when the last holder/waiter is done.
/// - **Isolation**: callers for different keys never block each other beyond
///   a registry lookup/insert.
///
/// Keys are taken by value and cloned once into the registry; cheap-to-clone
/// key types (`String`, `u64`, small tuples) are the intended use.
pub struct KeyedMutex<K: Eq + Hash + Clone> {
    registry: StdMutex<HashMap<K, LockEntry>>,
}

impl<K: Eq + Hash + Clone> KeyedMutex<K> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            registry: StdMutex::new(HashMap::new()),
        }
    }

    /// Acquires the lock for `key`, blocking the calling task until it is
    /// available.
    ///
    /// The returned [`KeyedGuard`] releases the key on drop. There is no
    /// timeout; see [`lock_timeout`](Self::lock_timeout) for a bounded wait
    /// and [`try_lock`](Self::try_lock) for a non-blocking attempt.
    ///
    /// Dropping the returned future before it resolves (e.g. losing a
    /// `select!` race) rolls the waiter count back; no entry is leaked.
    pub async fn lock(&self, key: K) -> KeyedGuard<'_, K> {
        let handle = self.checkout(&key);
        let mut guard = KeyedGuard {
            owner: self,
            key,
            permit: None,
        };
        guard.permit = Some(handle.lock_owned().await);
        guard
    }

    /// Acquires the lock for `key`, waiting at most `timeout`.
    ///
    /// Returns [`LockError::AcquireTimeout`] if the key stayed held for the
    /// whole wait. The waiter count registered for the attempt is rolled back
    /// on timeout, so an abandoned wait leaves no trace in the registry.
    pub async fn lock_timeout(
        &self,
        key: K,
        timeout: Duration,
    ) -> Result<KeyedGuard<'_, K>, LockError> {
        let handle = self.checkout(&key);
        let mut guard = KeyedGuard {
            owner: self,
            key,
            permit: None,
        };
        match time::timeout(timeout, handle.lock_owned()).await {
            Ok(permit) => {
                guard.permit = Some(permit);
                Ok(guard)
            }
            // The permitless guard drops here and rolls back the waiter count.
            Err(_elapsed) => Err(LockError::AcquireTimeout { timeout }),
        }
    }

    /// Attempts to acquire the lock for `key` without waiting.
    ///
    /// Returns `None` if the key is currently held.
    pub fn try_lock(&self, key: K) -> Option<KeyedGuard<'_, K>> {
        let handle = self.checkout(&key);
        let mut guard = KeyedGuard {
            owner: self,
            key,
            permit: None,
        };
        match handle.try_lock_owned() {
            Ok(permit) => {
                guard.permit = Some(permit);
                Some(guard)
            }
            Err(_busy) => None,
        }
    }

    /// Number of keys with at least one holder or waiter.
    pub fn len(&self) -> usize {
        let reg = match self.registry.lock() {
            Ok(reg) => reg,
            Err(poisoned) => poisoned.into_inner(),
        };
        reg.len()
    }

    /// True when no key is held or waited on.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up or creates the entry for `key` and registers interest in it.
    ///
    /// The increment happens while the registry guard is held, so the entry
    /// cannot be reclaimed between lookup and increment.
    fn checkout(&self, key: &K) -> Arc<AsyncMutex<()>> {
        let mut reg = match self.registry.lock() {
            Ok(reg) => reg,
            Err(poisoned) => poisoned.into_inner(),
        };
        let entry = reg.entry(key.clone()).or_insert_with(|| LockEntry {
            handle: Arc::new(AsyncMutex::new(())),
            waiters: 0,
        });
        entry.waiters += 1;
        Arc::clone(&entry.handle)
    }

    /// Drops one registered interest in `key`, reclaiming the entry when it
    /// was the last.
    fn release(&self, key: &K) {
        let mut reg = match self.registry.lock() {
            Ok(reg) => reg,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(entry) = reg.get_mut(key) {
            entry.waiters = entry.waiters.saturating_sub(1);
            if entry.waiters == 0 {
                reg.remove(key);
            }
        }
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedMutex<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for a held key.
///
/// Dropping the guard releases the per-key lock and, when this was the last
/// holder/waiter, removes the key's entry from the registry.
pub struct KeyedGuard<'a, K: Eq + Hash + Clone> {
    owner: &'a KeyedMutex<K>,
    key: K,
    // None while still waiting; Some once the per-key lock is held. A guard
    // dropped in the None state only rolls back the waiter count.
    permit: Option<OwnedMutexGuard<()>>,
}

impl<K: Eq + Hash + Clone> KeyedGuard<'_, K> {
    /// The key this guard holds.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Releases the key explicitly.
    ///
    /// Equivalent to dropping the guard; provided for call sites where an
    /// explicit unlock reads better than a `drop`.
    pub fn unlock(self) {}
}

impl<K: Eq + Hash + Clone> Drop for KeyedGuard<'_, K> {
    fn drop(&mut self) {
        // Release the per-key lock before touching the registry so waiters
        // are never made to contend on the registry guard.
        self.permit.take();
        self.owner.release(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let locks: KeyedMutex<&str> = KeyedMutex::new();

        let _a = locks.lock("a").await;
        let b = time::timeout(Duration::from_millis(100), locks.lock("b")).await;
        assert!(b.is_ok(), "lock(b) must not wait behind lock(a)");
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_same_key_waits_for_unlock() {
        let locks = Arc::new(KeyedMutex::new());

        let first = locks.lock("k".to_string()).await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _g = locks.lock("k".to_string()).await;
                Instant::now()
            })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        let released_at = Instant::now();
        drop(first);

        let acquired_at = contender.await.expect("contender finished");
        assert!(
            acquired_at >= released_at,
            "second acquisition at {acquired_at:?} precedes first release at {released_at:?}"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_at_most_one_holder_per_key() {
        let locks = Arc::new(KeyedMutex::new());
        let in_critical = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = Arc::clone(&locks);
            let in_critical = Arc::clone(&in_critical);
            handles.push(tokio::spawn(async move {
                for _ in 0..25 {
                    let _g = locks.lock(7u64).await;
                    assert_eq!(in_critical.fetch_add(1, Ordering::SeqCst), 0);
                    tokio::task::yield_now().await;
                    assert_eq!(in_critical.fetch_sub(1, Ordering::SeqCst), 1);
                }
            }));
        }
        for h in handles {
            h.await.expect("task finished");
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_entry_reclaimed_after_release() {
        let locks: KeyedMutex<&str> = KeyedMutex::new();

        let guard = locks.lock("gone").await;
        assert_eq!(locks.len(), 1);
        guard.unlock();
        assert!(locks.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_entry_survives_while_waiters_remain() {
        let locks = Arc::new(KeyedMutex::new());

        let holder = locks.lock("k".to_string()).await;
        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _g = locks.lock("k".to_string()).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(locks.len(), 1);

        drop(holder);
        waiter.await.expect("waiter finished");
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_try_lock_contended_returns_none() {
        let locks: KeyedMutex<&str> = KeyedMutex::new();

        let holder = locks.lock("k").await;
        assert!(locks.try_lock("k").is_none());
        // The failed attempt must not leave an extra waiter behind.
        assert_eq!(locks.len(), 1);

        drop(holder);
        assert!(locks.is_empty());
        assert!(locks.try_lock("k").is_some());
    }

    #[tokio::test]
    async fn test_lock_timeout_rolls_back_waiter() {
        let locks: KeyedMutex<&str> = KeyedMutex::new();

        let holder = locks.lock("k").await;
        let res = locks.lock_timeout("k", Duration::from_millis(50)).await;
        match res {
            Err(LockError::AcquireTimeout { timeout }) => {
                assert_eq!(timeout, Duration::from_millis(50));
            }
            Ok(_) => panic!("lock acquired while held"),
        }
        assert_eq!(locks.len(), 1);

        drop(holder);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_lock_timeout_succeeds_when_free() {
        let locks: KeyedMutex<u32> = KeyedMutex::new();
        let guard = locks
            .lock_timeout(1, Duration::from_millis(50))
            .await
            .expect("key is free");
        assert_eq!(*guard.key(), 1);
    }
}
