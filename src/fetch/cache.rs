//! Query Cache
//!
//! Keyed cache of fetch results shared by every chart instance in the process.
//!
//! A successful value is kept for the lifetime of the cache: there is no
//! expiry and no invalidation. Concurrent requests for the same key are
//! collapsed into a single fetch. A failed fetch is recorded but not reused,
//! so the next request for that key tries again.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Identifier of a cached query, e.g. `accidentsChartData/2023`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// Lifecycle of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Pending,
    Success,
    Error,
}

/// Snapshot of what the cache holds for a key
#[derive(Debug)]
pub struct CacheEntry<T> {
    pub status: QueryStatus,
    pub value: Option<Arc<T>>,
    pub error: Option<String>,
    /// When the entry last changed status
    pub updated_at: DateTime<Utc>,
}

impl<T> Clone for CacheEntry<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            value: self.value.clone(),
            error: self.error.clone(),
            updated_at: self.updated_at,
        }
    }
}

impl<T> CacheEntry<T> {
    fn pending() -> Self {
        Self {
            status: QueryStatus::Pending,
            value: None,
            error: None,
            updated_at: Utc::now(),
        }
    }

    fn success(value: Arc<T>) -> Self {
        Self {
            status: QueryStatus::Success,
            value: Some(value),
            error: None,
            updated_at: Utc::now(),
        }
    }

    fn failed(error: String) -> Self {
        Self {
            status: QueryStatus::Error,
            value: None,
            error: Some(error),
            updated_at: Utc::now(),
        }
    }
}

/// Per-key state: the entry itself plus a gate serializing fetches
struct Slot<T> {
    gate: tokio::sync::Mutex<()>,
    entry: RwLock<Option<CacheEntry<T>>>,
    fetches: AtomicUsize,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            gate: tokio::sync::Mutex::new(()),
            entry: RwLock::new(None),
            fetches: AtomicUsize::new(0),
        }
    }

    fn snapshot(&self) -> Option<CacheEntry<T>> {
        self.entry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn cached_value(&self) -> Option<Arc<T>> {
        self.entry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|e| e.status == QueryStatus::Success)
            .and_then(|e| e.value.clone())
    }

    fn replace(&self, entry: Option<CacheEntry<T>>) -> Option<CacheEntry<T>> {
        let mut guard = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, entry)
    }
}

/// Restores the previous entry if a fetch is dropped before it settles
struct PendingRollback<'a, T> {
    slot: &'a Slot<T>,
    previous: Option<Option<CacheEntry<T>>>,
}

impl<T> PendingRollback<'_, T> {
    fn disarm(mut self) {
        self.previous = None;
    }
}

impl<T> Drop for PendingRollback<'_, T> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.slot.replace(previous);
        }
    }
}

/// Process-wide query cache handle
///
/// Cloning the handle shares the underlying map.
pub struct QueryCache<T> {
    slots: Arc<Mutex<HashMap<QueryKey, Arc<Slot<T>>>>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> QueryCache<T> {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn slot(&self, key: &QueryKey) -> Arc<Slot<T>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            slots
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Slot::new())),
        )
    }

    fn existing_slot(&self, key: &QueryKey) -> Option<Arc<Slot<T>>> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Return the cached value for `key`, running `fetch` only if none exists
    ///
    /// At most one `fetch` runs per key at a time; callers arriving while a
    /// fetch is in flight wait for it and reuse its value on success.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &QueryKey, fetch: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let slot = self.slot(key);

        if let Some(value) = slot.cached_value() {
            tracing::trace!(%key, "Query cache hit");
            return Ok(value);
        }

        let _gate = slot.gate.lock().await;

        // Another caller may have filled the slot while we waited
        if let Some(value) = slot.cached_value() {
            tracing::trace!(%key, "Query cache hit after wait");
            return Ok(value);
        }

        let previous = slot.replace(Some(CacheEntry::pending()));
        let rollback = PendingRollback {
            slot: &slot,
            previous: Some(previous),
        };

        slot.fetches.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(%key, "Query cache miss, fetching");

        let result = fetch().await;
        rollback.disarm();

        match result {
            Ok(value) => {
                let value = Arc::new(value);
                slot.replace(Some(CacheEntry::success(Arc::clone(&value))));
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(%key, error = %e, "Query fetch failed");
                slot.replace(Some(CacheEntry::failed(e.to_string())));
                Err(e)
            }
        }
    }

    /// Snapshot of the entry for `key`, if one was ever created
    pub fn entry(&self, key: &QueryKey) -> Option<CacheEntry<T>> {
        self.existing_slot(key).and_then(|slot| slot.snapshot())
    }

    /// Number of times a fetch actually ran for `key`
    pub fn fetch_count(&self, key: &QueryKey) -> usize {
        self.existing_slot(key)
            .map(|slot| slot.fetches.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Number of keys with an entry
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.snapshot().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
