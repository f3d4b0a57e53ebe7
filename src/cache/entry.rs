//! A single memoized value.

use std::time::{Duration, Instant};

use super::Fingerprint;

/// Cached value plus the metadata needed to expire and evict it.
///
/// Immutable after creation. Expiry is a pure function of `created_at`,
/// `ttl` and the time it is evaluated at.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub key: Fingerprint,
    pub value: V,
    pub created_at: Instant,
    pub ttl: Duration,
    /// Insertion order, breaks ties between equal timestamps.
    pub(crate) seq: u64,
}

impl<V> CacheEntry<V> {
    pub fn new(key: Fingerprint, value: V, ttl: Duration, created_at: Instant, seq: u64) -> Self {
        Self {
            key,
            value,
            created_at,
            ttl,
            seq,
        }
    }

    /// Expired once strictly more than `ttl` has passed since creation.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) > self.ttl
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}
