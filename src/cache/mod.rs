//! Memoization cache for transform and acquisition results.
//!
//! Results are keyed by a [`Fingerprint`] of the operation name plus its
//! arguments. Entries expire after a time-to-live, expired entries are
//! swept lazily before each lookup or insert, and the live entry count is
//! bounded by evicting the oldest entries first.
//!
//! Concurrent misses on the same key are not deduplicated: both callers
//! compute and the later insert wins.

mod entry;
mod fingerprint;
mod store;

pub use entry::CacheEntry;
pub use fingerprint::{Fingerprint, FingerprintBuilder};
pub use store::{CacheStats, MemoCache, Weigh};
