//! Bounded, expiring memoization store.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::{CacheEntry, Fingerprint};
use crate::config::CacheConfig;
use crate::outcome::{ErrorKind, PipelineError, PipelineResult};

/// Approximate heap footprint of a cached value.
pub trait Weigh {
    fn weigh(&self) -> usize;
}

impl Weigh for String {
    fn weigh(&self) -> usize {
        self.len()
    }
}

impl Weigh for PipelineResult {
    fn weigh(&self) -> usize {
        self.as_str().len()
    }
}

/// Aggregate view of the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries that would be served on lookup.
    pub active: usize,
    /// Entries past their TTL that have not been swept yet.
    pub expired: usize,
    pub approx_bytes: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn total(&self) -> usize {
        self.active + self.expired
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} active, {} expired, ~{} ({} hits, {} misses)",
            self.active,
            self.expired,
            humansize::format_size(self.approx_bytes, humansize::BINARY),
            self.hits,
            self.misses
        )
    }
}

struct CacheStore<V> {
    entries: HashMap<Fingerprint, CacheEntry<V>>,
    /// Insertion sequence -> key, oldest first.
    order: BTreeMap<u64, Fingerprint>,
    next_seq: u64,
    hits: u64,
    misses: u64,
}

impl<V> CacheStore<V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: BTreeMap::new(),
            next_seq: 0,
            hits: 0,
            misses: 0,
        }
    }

    fn remove(&mut self, key: &Fingerprint) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.order.remove(&entry.seq);
        Some(entry)
    }

    fn purge_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<Fingerprint> = self
            .entries
            .values()
            .filter(|e| e.is_expired_at(now))
            .map(|e| e.key.clone())
            .collect();
        for key in &expired {
            self.remove(key);
        }
        if !expired.is_empty() {
            trace!("Swept {} expired cache entries", expired.len());
        }
        expired.len()
    }
}

/// Thread-safe memoization cache shared by every pipeline stage.
///
/// All state sits behind one mutex. The lock is released while a value is
/// being computed, so slow collaborators never block unrelated lookups.
pub struct MemoCache<V> {
    store: Mutex<CacheStore<V>>,
    max_entries: usize,
    default_ttl: Duration,
}

impl<V: Clone + Weigh> MemoCache<V> {
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_limits(config.max_entries, config.default_ttl())
    }

    pub fn with_limits(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            store: Mutex::new(CacheStore::new()),
            max_entries,
            default_ttl,
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn lock(&self) -> MutexGuard<'_, CacheStore<V>> {
        // A panic inside a compute closure never runs under the lock.
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up a live entry.
    pub fn get(&self, key: &Fingerprint) -> Option<V> {
        let mut store = self.lock();
        store.purge_expired(Instant::now());
        let found = store.entries.get(key).map(|e| e.value.clone());
        if found.is_some() {
            store.hits += 1;
        } else {
            store.misses += 1;
        }
        found
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// `compute` runs at most once per call. `ttl` of `None` uses the
    /// configured default.
    pub fn get_or_compute<F>(&self, key: Fingerprint, ttl: Option<Duration>, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            debug!("Cache hit for {}", key.op());
            return value;
        }

        debug!("Cache miss for {}", key.op());
        let value = compute();
        self.insert(key, value.clone(), ttl);
        value
    }

    /// Store a value, replacing any previous entry for the key.
    pub fn insert(&self, key: Fingerprint, value: V, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let now = Instant::now();
        let mut store = self.lock();
        store.purge_expired(now);

        store.remove(&key);
        let seq = store.next_seq;
        store.next_seq += 1;
        store.order.insert(seq, key.clone());
        store
            .entries
            .insert(key.clone(), CacheEntry::new(key, value, ttl, now, seq));

        self.evict_if_needed(&mut store);
    }

    fn evict_if_needed(&self, store: &mut CacheStore<V>) {
        while store.entries.len() > self.max_entries {
            let oldest = match store.order.iter().next() {
                Some((_, key)) => key.clone(),
                None => break,
            };
            debug!("Evicting cache entry due to max_entries limit: {}", oldest.op());
            store.remove(&oldest);
        }
    }

    /// Drop every entry. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut store = self.lock();
        let removed = store.entries.len();
        store.entries.clear();
        store.order.clear();
        tracing::info!("Cleared {} cache entries", removed);
        removed
    }

    /// Snapshot of entry counts and footprint. Does not sweep.
    pub fn stats(&self) -> CacheStats {
        let store = self.lock();
        let now = Instant::now();
        let mut stats = CacheStats {
            hits: store.hits,
            misses: store.misses,
            ..CacheStats::default()
        };
        for entry in store.entries.values() {
            if entry.is_expired_at(now) {
                stats.expired += 1;
            } else {
                stats.active += 1;
            }
            stats.approx_bytes += entry.key.as_str().len()
                + entry.value.weigh()
                + std::mem::size_of::<CacheEntry<V>>();
        }
        stats
    }

    /// Physically stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &Fingerprint) -> bool {
        let store = self.lock();
        store
            .entries
            .get(key)
            .map(|e| !e.is_expired_at(Instant::now()))
            .unwrap_or(false)
    }
}

impl MemoCache<PipelineResult> {
    /// Memoize a fallible stage.
    ///
    /// Success and failure are both cached, except cancellation, which is
    /// returned without touching the store so a retry runs the work again.
    pub fn memoize<F>(&self, key: Fingerprint, compute: F) -> PipelineResult
    where
        F: FnOnce() -> Result<String, PipelineError>,
    {
        if let Some(hit) = self.get(&key) {
            debug!("Cache hit for {}", key.op());
            return hit;
        }

        debug!("Cache miss for {}", key.op());
        match compute() {
            Err(e) if e.kind() == ErrorKind::Cancelled => e.into(),
            outcome => {
                let result = PipelineResult::from(outcome);
                self.insert(key, result.clone(), None);
                result
            }
        }
    }
}
