//! Query result store with in-flight deduplication and freshness windows.
//!
//! Each key owns a slot holding the last good value, the in-flight fetch (if
//! any) and the last fetch error. A fetch runs as a spawned, shared future that
//! writes its own outcome back into the slot, so it completes even when every
//! caller waiting on it goes away. Slots live in an LRU bounded by
//! `CacheConfig::max_entries`.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use lru::LruCache;
use metrics::counter;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::application::error::ContentError;

use super::config::CacheConfig;
use super::keys::{CacheKey, hash_value};
use super::state::QueryState;

pub(crate) const METRIC_CACHE_HIT: &str = "folio_cache_hit_total";
pub(crate) const METRIC_CACHE_MISS: &str = "folio_cache_miss_total";
pub(crate) const METRIC_CACHE_JOIN: &str = "folio_cache_join_total";
pub(crate) const METRIC_CACHE_STALE: &str = "folio_cache_stale_total";

type Flight<V> = Shared<BoxFuture<'static, Result<V, ContentError>>>;

struct Stored<V> {
    value: V,
    fetched_at: Instant,
}

struct Slot<V> {
    stored: Option<Stored<V>>,
    flight: Option<(u64, Flight<V>)>,
    error: Option<ContentError>,
}

impl<V> Default for Slot<V> {
    fn default() -> Self {
        Self {
            stored: None,
            flight: None,
            error: None,
        }
    }
}

enum Plan<V> {
    Fresh(V),
    Stale(V),
    Wait(Flight<V>),
}

struct Inner<V> {
    config: CacheConfig,
    slots: Mutex<LruCache<CacheKey, Slot<V>>>,
    next_flight: AtomicU64,
}

/// Cache of query results of one value type.
pub struct QueryCache<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for QueryCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> QueryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                slots: Mutex::new(LruCache::new(config.max_entries)),
                next_flight: AtomicU64::new(0),
                config,
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Resolve `key`, calling `fetch` only when no fresh value and no
    /// in-flight request exist for it.
    pub async fn load<F, Fut>(&self, key: CacheKey, ttl: Duration, fetch: F) -> QueryState<V>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, ContentError>> + Send + 'static,
    {
        match self.plan(&key, ttl, fetch) {
            Plan::Fresh(value) => QueryState::ready(value),
            Plan::Stale(value) => QueryState::refreshing(value),
            Plan::Wait(flight) => match flight.await {
                Ok(value) => QueryState::ready(value),
                Err(error) => QueryState::failed(error, self.cached(&key)),
            },
        }
    }

    /// Current state of `key` without triggering a fetch.
    pub fn peek(&self, key: &CacheKey) -> QueryState<V> {
        match self.inner.slots("peek").peek(key) {
            Some(slot) => QueryState {
                data: slot.stored.as_ref().map(|stored| stored.value.clone()),
                is_loading: slot.flight.is_some(),
                error: slot.error.clone(),
            },
            None => QueryState::idle(),
        }
    }

    /// Last good value for `key`, fresh or not.
    pub fn cached(&self, key: &CacheKey) -> Option<V> {
        self.inner
            .slots("cached")
            .peek(key)
            .and_then(|slot| slot.stored.as_ref().map(|stored| stored.value.clone()))
    }

    fn plan<F, Fut>(&self, key: &CacheKey, ttl: Duration, fetch: F) -> Plan<V>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, ContentError>> + Send + 'static,
    {
        let kind = key.kind();
        let config = &self.inner.config;
        let now = Instant::now();
        // The guard is released before anything is awaited.
        let mut slots = self.inner.slots("plan");
        if slots.len() == slots.cap().get() && !slots.contains(key) {
            debug!(target: "folio::cache", kind, "evicting least recently used query");
        }
        let slot = slots.get_or_insert_mut(key.clone(), Slot::default);

        if config.enabled {
            if let Some(stored) = &slot.stored
                && now.saturating_duration_since(stored.fetched_at) < ttl
            {
                counter!(METRIC_CACHE_HIT, "kind" => kind).increment(1);
                return Plan::Fresh(stored.value.clone());
            }

            if config.serve_stale
                && let Some(value) = slot.stored.as_ref().map(|stored| stored.value.clone())
            {
                counter!(METRIC_CACHE_STALE, "kind" => kind).increment(1);
                if slot.flight.is_none() {
                    slot.flight = Some(self.launch(key, fetch));
                    debug!(
                        target: "folio::cache",
                        kind,
                        key_hash = hash_value(key),
                        "serving stale value while refreshing"
                    );
                }
                return Plan::Stale(value);
            }
        }

        if let Some((_, flight)) = &slot.flight {
            counter!(METRIC_CACHE_JOIN, "kind" => kind).increment(1);
            return Plan::Wait(flight.clone());
        }

        counter!(METRIC_CACHE_MISS, "kind" => kind).increment(1);
        let (id, flight) = self.launch(key, fetch);
        slot.flight = Some((id, flight.clone()));
        Plan::Wait(flight)
    }

    fn launch<F, Fut>(&self, key: &CacheKey, fetch: F) -> (u64, Flight<V>)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, ContentError>> + Send + 'static,
    {
        let id = self.inner.next_flight.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);
        let key = key.clone();
        let flight = async move {
            let result = AssertUnwindSafe(async move { fetch().await })
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(ContentError::fetch(None, "query fetch panicked")));
            inner.settle(&key, id, &result);
            result
        }
        .boxed()
        .shared();
        tokio::spawn(flight.clone());
        (id, flight)
    }
}

impl<V: Clone> Inner<V> {
    fn slots(&self, op: &'static str) -> MutexGuard<'_, LruCache<CacheKey, Slot<V>>> {
        self.slots.lock().unwrap_or_else(|poisoned| {
            warn!(
                op,
                target_module = "cache::store",
                result = "poisoned_recovered",
                "Recovered from poisoned query cache"
            );
            poisoned.into_inner()
        })
    }

    fn settle(&self, key: &CacheKey, id: u64, result: &Result<V, ContentError>) {
        let mut slots = self.slots("settle");
        // Evicted while in flight: callers still get the result, nothing is kept.
        let Some(slot) = slots.peek_mut(key) else {
            return;
        };
        if slot.flight.as_ref().is_some_and(|(current, _)| *current == id) {
            slot.flight = None;
        }
        match result {
            Ok(value) => {
                if self.config.enabled {
                    slot.stored = Some(Stored {
                        value: value.clone(),
                        fetched_at: Instant::now(),
                    });
                }
                slot.error = None;
            }
            Err(error) => {
                warn!(
                    target: "folio::cache",
                    kind = key.kind(),
                    key_hash = hash_value(key),
                    error = %error,
                    "query fetch failed; keeping previous value"
                );
                slot.error = Some(error.clone());
            }
        }
    }
}
