//! # TTL Request Cache with In-Flight Deduplication
//!
//! Read endpoints are cached by string key with a lazy TTL: entries are
//! checked for staleness on lookup, never by a background sweeper.
//! Concurrent fetches for the same key collapse to a single underlying
//! request; the first caller becomes the leader and broadcasts its
//! outcome (success or failure) to every waiter.
//!
//! ## Locking
//!
//! Both maps are guarded by `parking_lot::Mutex` and the guards are
//! never held across an `.await`. Leader election happens entirely
//! under the pending-map lock; the fetch itself runs lock-free.
//!
//! Time is injected through the [`Clock`] trait so TTL expiry is
//! testable without sleeping.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::error::ApiError;

/// Default TTL for cached reads.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Source of monotonic time for TTL checks.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// Wall-clock-backed [`Clock`] used in production.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced [`Clock`] for deterministic expiry tests.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }
}

struct Entry<T> {
    value: T,
    stored_at: Instant,
}

/// A keyed TTL cache whose misses are deduplicated in flight.
pub struct RequestCache<T: Clone> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, Entry<T>>>,
    pending: Mutex<HashMap<String, broadcast::Sender<Result<T, ApiError>>>>,
}

enum Role<T: Clone> {
    Leader,
    Follower(broadcast::Receiver<Result<T, ApiError>>),
}

/// Removes a leader's pending-map entry when dropped.
///
/// The leader's future can be dropped mid-fetch (task cancellation).
/// Without this guard the pending entry would outlive the flight and
/// keep the channel open, leaving every waiter and every later caller
/// for the key stuck on a flight that will never complete.
struct PendingGuard<'a, T> {
    pending: &'a Mutex<HashMap<String, broadcast::Sender<Result<T, ApiError>>>>,
    key: Option<String>,
}

impl<T> PendingGuard<'_, T> {
    /// Deregister the flight on the normal path, handing back the
    /// sender so the outcome can still be broadcast to waiters.
    fn complete(mut self) -> Option<broadcast::Sender<Result<T, ApiError>>> {
        let key = self.key.take()?;
        self.pending.lock().remove(&key)
    }
}

impl<T> Drop for PendingGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.pending.lock().remove(&key);
        }
    }
}

impl<T: Clone + Send + 'static> RequestCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a fresh entry. Stale entries are removed on the way out.
    pub fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if now.duration_since(entry.stored_at) < self.ttl => {
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a value under a key, resetting its TTL.
    pub fn store(&self, key: &str, value: T) {
        self.entries.lock().insert(
            key.to_string(),
            Entry {
                value,
                stored_at: self.clock.now(),
            },
        );
    }

    /// Drop every entry whose key matches the predicate.
    pub fn invalidate<P: Fn(&str) -> bool>(&self, predicate: P) {
        self.entries.lock().retain(|key, _| !predicate(key));
    }

    /// Drop one key.
    pub fn invalidate_key(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Return the cached value for `key`, or run `fetch` to populate it.
    ///
    /// When several tasks miss on the same key concurrently, exactly one
    /// runs `fetch`; the rest await the leader's broadcast. Failures are
    /// shared too (and not cached), so every concurrent caller of a
    /// failing fetch sees the same error exactly once.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<T, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, ApiError>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let role = {
            let mut pending = self.pending.lock();
            match pending.get(key) {
                Some(tx) => Role::Follower(tx.subscribe()),
                None => {
                    let (tx, _) = broadcast::channel(1);
                    pending.insert(key.to_string(), tx);
                    Role::Leader
                }
            }
        };

        match role {
            Role::Leader => {
                let guard = PendingGuard {
                    pending: &self.pending,
                    key: Some(key.to_string()),
                };
                let result = fetch().await;
                if let Ok(value) = &result {
                    self.store(key, value.clone());
                }
                // Deregister before broadcasting so a waiter woken by the
                // send never finds a stale pending entry. If the fetch was
                // cancelled instead, the guard's drop does the deregister
                // and closing the channel wakes the waiters.
                if let Some(tx) = guard.complete() {
                    let _ = tx.send(result.clone());
                }
                result
            }
            Role::Follower(mut rx) => match rx.recv().await {
                Ok(result) => result,
                // Leader dropped without sending (cancelled). One cache
                // lookup covers the store-then-broadcast window.
                Err(_) => self.get(key).ok_or_else(|| ApiError::Transport {
                    endpoint: key.to_string(),
                    reason: "in-flight request was cancelled".to_string(),
                }),
            },
        }
    }
}
