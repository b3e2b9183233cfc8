//! Expiring key → value cache with singleflight producers.
//!
//! Each key owns a single slot that is either a settled value with its expiry
//! or the shared future of the producer currently computing it. Slots are
//! inspected and replaced through the `DashMap` entry API, so the check for a
//! live value and the registration of a new producer happen under the same
//! shard lock and at most one producer runs per key. Only the registration
//! happens under that lock: the producer is first called when the shared
//! future is polled, so it may freely touch the cache itself.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::observability::metrics::{self, CacheOutcome};

type Pending<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

enum Slot<V, E> {
    Ready { value: V, expires_at: Instant },
    InFlight(Pending<V, E>),
}

/// A TTL cache whose misses are collapsed into one producer call per key.
///
/// Cloning is cheap and clones share the same storage.
pub struct TtlCache<K, V, E> {
    name: &'static str,
    ttl: Duration,
    slots: Arc<DashMap<K, Slot<V, E>>>,
}

impl<K, V, E> Clone for TtlCache<K, V, E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            ttl: self.ttl,
            slots: self.slots.clone(),
        }
    }
}

impl<K, V, E> TtlCache<K, V, E>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create an empty cache. `name` labels metrics and log lines.
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            slots: Arc::new(DashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of slots, settled or in flight. Expired entries count until touched.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Return the live value for `key`, or run `producer` to obtain it.
    ///
    /// `producer` is only invoked when there is neither a live entry nor an
    /// in-flight producer for the key. Concurrent callers for the same key
    /// all receive the result of that single invocation, failure included.
    pub async fn get<F, Fut>(&self, key: K, producer: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let (pending, outcome) = match self.slots.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let joined = match occupied.get() {
                    Slot::Ready { value, expires_at } if Instant::now() < *expires_at => {
                        metrics::record_cache_lookup(self.name, CacheOutcome::Hit);
                        return Ok(value.clone());
                    }
                    Slot::InFlight(pending) => Some(pending.clone()),
                    Slot::Ready { .. } => None,
                };

                match joined {
                    Some(pending) => (pending, CacheOutcome::Joined),
                    None => {
                        let pending = self.launch(key, producer);
                        occupied.insert(Slot::InFlight(pending.clone()));
                        (pending, CacheOutcome::Expired)
                    }
                }
            }
            Entry::Vacant(vacant) => {
                let pending = self.launch(key, producer);
                vacant.insert(Slot::InFlight(pending.clone()));
                (pending, CacheOutcome::Miss)
            }
        };

        metrics::record_cache_lookup(self.name, outcome);
        tracing::trace!(cache = self.name, outcome = outcome.as_str(), "cache lookup");

        pending.await
    }

    /// Defer `producer` into a shared future so that whichever waiter drives it
    /// to completion also calls it and settles the slot.
    fn launch<F, Fut>(&self, key: K, producer: F) -> Pending<V, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let slots = self.slots.clone();
        let ttl = self.ttl;
        let name = self.name;

        async move {
            let mut guard = InFlightGuard {
                slots: slots.clone(),
                key: Some(key),
            };
            let result = producer().await;

            if let Some(key) = guard.key.take() {
                match &result {
                    Ok(value) => {
                        slots.insert(
                            key,
                            Slot::Ready {
                                value: value.clone(),
                                expires_at: Instant::now() + ttl,
                            },
                        );
                    }
                    Err(_) => {
                        remove_in_flight(&slots, &key);
                        tracing::debug!(cache = name, "producer failed, nothing cached");
                    }
                }
            }

            result
        }
        .boxed()
        .shared()
    }
}

fn remove_in_flight<K: Eq + Hash, V, E>(slots: &DashMap<K, Slot<V, E>>, key: &K) {
    slots.remove_if(key, |_, slot| matches!(slot, Slot::InFlight(_)));
}

/// Clears the in-flight slot if the producer unwinds before settling, so a
/// later caller can start over instead of joining a poisoned future.
struct InFlightGuard<K: Eq + Hash, V, E> {
    slots: Arc<DashMap<K, Slot<V, E>>>,
    key: Option<K>,
}

impl<K: Eq + Hash, V, E> Drop for InFlightGuard<K, V, E> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            remove_in_flight(&self.slots, &key);
        }
    }
}
