//! Get-or-compute key/value cache used by [`CachedBlurHash`](crate::CachedBlurHash).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::error::Result;

/// The entry being computed on a cache miss.
///
/// Passed to the compute callback so it can recover its arguments from the
/// key and set the entry's lifetime.
#[derive(Debug, Clone)]
pub struct CacheItem {
    key: String,
    expires_after: Option<Duration>,
}

impl CacheItem {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            expires_after: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Expire the entry `ttl` after it is stored; `None` never expires.
    pub fn expires_after(&mut self, ttl: Option<Duration>) -> &mut Self {
        self.expires_after = ttl;
        self
    }

    pub fn expiration(&self) -> Option<Duration> {
        self.expires_after
    }
}

/// Callback run on a miss. Returning an error stores nothing.
pub type ComputeFn<'a> = dyn FnMut(&mut CacheItem) -> Result<String> + 'a;

/// A string cache with compute-if-absent semantics.
///
/// Implementations must run `compute` at most once per key at a time within
/// a process: concurrent callers for the same missing key wait for the
/// in-flight computation instead of starting their own.
pub trait Cache: Send + Sync {
    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// # Errors
    ///
    /// Errors from `compute` are returned unchanged and leave no entry behind.
    /// Backends report their own failures as
    /// [`BlurHashError::CacheBackend`](crate::BlurHashError::CacheBackend).
    fn get_or_compute(&self, key: &str, compute: &mut ComputeFn<'_>) -> Result<String>;

    /// Remove `key`. Returns whether an entry was present.
    fn delete(&self, key: &str) -> Result<bool>;
}

impl<T: Cache + ?Sized> Cache for Arc<T> {
    fn get_or_compute(&self, key: &str, compute: &mut ComputeFn<'_>) -> Result<String> {
        (**self).get_or_compute(key, compute)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        (**self).delete(key)
    }
}

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

type Slot = Arc<Mutex<Option<Entry>>>;

/// In-process [`Cache`] with per-key single flight.
///
/// Each key owns a slot guarded by its own mutex. A miss holds the slot lock
/// while computing, so other callers of that key block until the value is
/// stored; different keys never wait on each other. The compute callback
/// must not re-enter the cache with its own key.
#[derive(Debug, Default)]
pub struct MemoryCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries that have not expired.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.slots
            .lock()
            .values()
            .filter(|slot| {
                slot.try_lock()
                    .map_or(false, |entry| entry.as_ref().is_some_and(|e| e.is_fresh(now)))
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.slots.lock().clear();
    }

    /// Release slots that are empty or expired and not in use.
    pub fn purge(&self) -> usize {
        let now = Instant::now();
        let mut slots = self.slots.lock();
        let before = slots.len();
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            slot.try_lock()
                .map_or(true, |entry| entry.as_ref().is_some_and(|e| e.is_fresh(now)))
        });
        before - slots.len()
    }

    fn slot(&self, key: &str) -> Slot {
        let mut slots = self.slots.lock();
        match slots.get(key) {
            Some(slot) => Arc::clone(slot),
            None => {
                let slot = Slot::default();
                slots.insert(key.to_owned(), Arc::clone(&slot));
                slot
            }
        }
    }

    /// Remove `key`'s slot if it is still `slot`, empty, and nobody else holds it.
    ///
    /// Slots are only cloned under the map lock, so the strong count seen here
    /// (map + caller) cannot grow until the lock is released.
    fn release_if_idle(&self, key: &str, slot: &Slot) {
        let mut slots = self.slots.lock();
        let idle = slots.get(key).is_some_and(|current| {
            Arc::ptr_eq(current, slot)
                && Arc::strong_count(slot) <= 2
                && slot.try_lock().is_some_and(|entry| entry.is_none())
        });
        if idle {
            slots.remove(key);
        }
    }
}

impl Cache for MemoryCache {
    fn get_or_compute(&self, key: &str, compute: &mut ComputeFn<'_>) -> Result<String> {
        let slot = self.slot(key);
        let mut entry = slot.lock();

        if let Some(cached) = entry.as_ref() {
            if cached.is_fresh(Instant::now()) {
                tracing::trace!(key, "cache hit");
                return Ok(cached.value.clone());
            }
            tracing::debug!(key, "cache entry expired");
        }

        let mut item = CacheItem::new(key);
        match compute(&mut item) {
            Ok(value) => {
                let expires_at = item.expiration().map(|ttl| Instant::now() + ttl);
                *entry = Some(Entry {
                    value: value.clone(),
                    expires_at,
                });
                tracing::debug!(key, ttl = ?item.expiration(), "cache entry stored");
                Ok(value)
            }
            Err(err) => {
                *entry = None;
                drop(entry);
                self.release_if_idle(key, &slot);
                tracing::warn!(key, error = %err, "cache computation failed, nothing stored");
                Err(err)
            }
        }
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let removed = self.slots.lock().remove(key);
        Ok(removed.is_some_and(|slot| slot.lock().is_some()))
    }
}
