//! TTL result cache with single-flight computation per key.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use lru::LruCache;
use tracing::{debug, trace};

use salesdex_core::{
    SalesdexConfig, SalesdexResult, StoreError, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL,
};

use super::freshness::{CacheRead, ReadOrigin};
use super::key::CacheKey;
use super::stats::CacheStats;
use crate::flight::Flight;

/// Configuration for the result cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long a computed result is served.
    pub ttl: Duration,
    /// Maximum number of ready entries.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_CACHE_TTL,
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the max number of ready entries.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }
}

impl From<&SalesdexConfig> for CacheConfig {
    fn from(config: &SalesdexConfig) -> Self {
        Self {
            ttl: config.cache_ttl,
            max_entries: config.cache_max_entries,
        }
    }
}

type FlightOutcome<V> = SalesdexResult<(V, DateTime<Utc>)>;

struct ReadyEntry<V> {
    value: V,
    stored_at: Instant,
    cached_at: DateTime<Utc>,
}

/// Ready values in recency order, plus the computations still running.
struct Entries<V> {
    ready: LruCache<CacheKey, ReadyEntry<V>>,
    pending: HashMap<CacheKey, Arc<Flight<FlightOutcome<V>>>>,
}

/// Result cache keyed by [`CacheKey`].
///
/// The entry map is locked only to look up or publish. Computations run
/// outside the lock, and at most one runs per key: later callers for the
/// same key wait for it. Failed computations are never stored. Expiry is
/// checked on access; nothing runs in the background. Once full, storing a
/// new key evicts the least recently read entry.
pub struct ResultCache<V> {
    config: CacheConfig,
    entries: Mutex<Entries<V>>,
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    evictions: AtomicU64,
}

impl<V: Clone + Send> ResultCache<V> {
    pub fn new(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            config,
            entries: Mutex::new(Entries {
                ready: LruCache::new(capacity),
                pending: HashMap::new(),
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Return the cached value for `key`, or run `compute` and cache its result.
    ///
    /// If another caller is already computing `key`, waits for that result
    /// instead of running `compute`. An error from `compute` is returned to
    /// this caller and every waiter, and leaves nothing in the cache.
    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> SalesdexResult<CacheRead<V>>
    where
        F: FnOnce() -> SalesdexResult<V>,
    {
        let ttl = self.config.ttl;
        let flight = {
            let mut entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
            let expired = match entries.ready.get(&key) {
                Some(entry) if entry.stored_at.elapsed() < ttl => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    trace!(key = %key, "Result cache hit");
                    return Ok(CacheRead::new(
                        entry.value.clone(),
                        entry.cached_at,
                        ttl,
                        ReadOrigin::Hit,
                    ));
                }
                Some(_) => true,
                None => false,
            };
            if expired {
                entries.ready.pop(&key);
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }

            match entries.pending.get(&key).map(Arc::clone) {
                Some(flight) => {
                    drop(entries);
                    self.coalesced.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %key, "Waiting for in-flight computation");
                    let (value, cached_at) = flight.wait()??;
                    return Ok(CacheRead::new(value, cached_at, ttl, ReadOrigin::Coalesced));
                }
                None => {
                    let flight = Flight::new();
                    entries.pending.insert(key.clone(), Arc::clone(&flight));
                    flight
                }
            }
        };

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "Result cache miss");
        let started = Instant::now();
        let caught = panic::catch_unwind(AssertUnwindSafe(compute));
        let (outcome, panic_payload) = match caught {
            Ok(outcome) => (outcome, None),
            Err(payload) => (
                Err(StoreError::ComputationAbandoned {
                    operation: key.operation().to_string(),
                }
                .into()),
                Some(payload),
            ),
        };
        let cached_at = Utc::now();

        {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            let ours = entries
                .pending
                .get(&key)
                .is_some_and(|current| Arc::ptr_eq(current, &flight));
            if ours {
                entries.pending.remove(&key);
            }
            if let Ok(value) = &outcome {
                let entry = ReadyEntry {
                    value: value.clone(),
                    stored_at: Instant::now(),
                    cached_at,
                };
                if let Some((evicted, _)) = entries.ready.push(key.clone(), entry) {
                    if evicted != key {
                        self.evictions.fetch_add(1, Ordering::Relaxed);
                        debug!(
                            evicted = %evicted,
                            max_entries = self.config.max_entries,
                            "Evicted least recently used cache entry"
                        );
                    }
                }
            }
        }
        debug!(
            key = %key,
            ok = outcome.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Computed cache entry"
        );
        flight.land(outcome.clone().map(|value| (value, cached_at)));

        if let Some(payload) = panic_payload {
            panic::resume_unwind(payload);
        }
        outcome.map(|value| CacheRead::new(value, cached_at, ttl, ReadOrigin::Computed))
    }

    /// Drop every expired entry. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let ttl = self.config.ttl;
        let expired: Vec<CacheKey> = entries
            .ready
            .iter()
            .filter(|(_, entry)| entry.stored_at.elapsed() >= ttl)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.ready.pop(key);
        }
        self.evictions.fetch_add(expired.len() as u64, Ordering::Relaxed);
        expired.len()
    }

    /// Number of ready entries, expired or not.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.ready.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every ready entry. In-flight computations are left to finish.
    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.ready.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entry_count: self.len() as u64,
        }
    }
}
