//! Memoization of interval resolution.
//!
//! Resolution is a pure function of the interval set and the query key, so for a fixed interval set, the result for a
//! given key never changes. [`ResolutionCache`] remembers the resolved position for recently seen keys, bounded by a
//! configurable capacity and evicting the least recently used entries when full.
use std::hash::BuildHasher as _;

use lru_slab::LruSlab;
use tracing::{debug, trace};

use crate::hash::{FastBuildHasher, FastHashMap};
use crate::{Interval, Result};

/// Initial size of the LRU slab, which will grow as needed up to the configured capacity.
const INITIAL_SIZE: usize = 64;

/// Key of a cached resolution.
///
/// The fingerprint identifies the interval set that the resolution was made against, so that a resolution can never be
/// served for an interval set other than the one it was computed from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
struct CacheKey {
    fingerprint: u64,
    key: Interval,
}

#[derive(Clone, Copy)]
struct CachedResolution {
    key: CacheKey,
    position: usize,
}

/// Hit and miss counters for a [`ResolutionCache`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CacheStats {
    /// Number of lookups served from the cache.
    pub hits: u64,

    /// Number of lookups that had to be resolved.
    pub misses: u64,

    /// Number of entries evicted to stay within capacity.
    pub evictions: u64,

    /// Number of times the cache was invalidated by a change to the interval set.
    pub invalidations: u64,
}

/// A bounded LRU cache of resolved interval positions.
///
/// The cache is bound to a single interval set at a time, identified by a fingerprint of its intervals. Whenever the
/// interval set changes, [`rebind`][Self::rebind] must be called, which drops every cached resolution and computes the
/// fingerprint of the new interval set.
///
/// A capacity of zero disables caching entirely: every lookup is resolved directly.
pub struct ResolutionCache {
    capacity: usize,
    hasher: FastBuildHasher,
    fingerprint: u64,
    items: FastHashMap<CacheKey, u32>,
    entries: LruSlab<CachedResolution>,
    stats: CacheStats,
}

impl ResolutionCache {
    /// Creates a new `ResolutionCache` with the given capacity, bound to the given interval set.
    pub fn new<I>(capacity: usize, intervals: I) -> Self
    where
        I: IntoIterator<Item = Interval>,
    {
        let hasher = FastBuildHasher::default();
        let fingerprint = fingerprint_of(&hasher, intervals);

        Self {
            capacity,
            hasher,
            fingerprint,
            items: FastHashMap::default(),
            entries: LruSlab::with_capacity(slab_capacity(capacity)),
            stats: CacheStats::default(),
        }
    }

    /// Returns the maximum number of resolutions held by the cache.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of resolutions currently held by the cache.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the cache holds no resolutions.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the fingerprint of the interval set the cache is currently bound to.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Returns the hit and miss counters of the cache.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Gets the cached position for `key`, or resolves and caches it with `resolve`.
    ///
    /// A cache hit marks the entry as the most recently used. On a miss, `resolve` is called and, if it succeeds, its
    /// result is cached, evicting the least recently used entries if the cache is over capacity. Errors from `resolve`
    /// are never cached.
    ///
    /// # Errors
    ///
    /// If `resolve` fails, its error is returned.
    pub fn get_or_resolve<F>(&mut self, key: Interval, resolve: F) -> Result<usize>
    where
        F: FnOnce() -> Result<usize>,
    {
        if self.capacity == 0 {
            return resolve();
        }

        let key = CacheKey {
            fingerprint: self.fingerprint,
            key,
        };

        if let Some(&slot) = self.items.get(&key) {
            self.stats.hits += 1;

            // Reading through `get_mut` moves the entry to the front of the LRU list.
            return Ok(self.entries.get_mut(slot).position);
        }

        self.stats.misses += 1;
        let position = resolve()?;

        let slot = self.entries.insert(CachedResolution { key, position });
        self.items.insert(key, slot);

        while self.entries.len() as usize > self.capacity {
            let Some(slot) = self.entries.lru() else {
                break;
            };

            let evicted = self.entries.remove(slot);
            self.items.remove(&evicted.key);
            self.stats.evictions += 1;
            trace!(
                key = %evicted.key.key,
                capacity = self.capacity,
                "Evicted least recently used resolution."
            );
        }

        Ok(position)
    }

    /// Binds the cache to a new interval set.
    ///
    /// All cached resolutions are dropped, and the fingerprint of the new interval set is computed.
    pub fn rebind<I>(&mut self, intervals: I)
    where
        I: IntoIterator<Item = Interval>,
    {
        let previous = self.fingerprint;
        self.fingerprint = fingerprint_of(&self.hasher, intervals);

        let dropped = self.items.len();
        self.items.clear();
        self.entries = LruSlab::with_capacity(slab_capacity(self.capacity));
        self.stats.invalidations += 1;

        debug!(
            previous_fingerprint = previous,
            fingerprint = self.fingerprint,
            dropped,
            "Interval set changed, invalidated resolution cache."
        );
    }
}

fn fingerprint_of<I>(hasher: &FastBuildHasher, intervals: I) -> u64
where
    I: IntoIterator<Item = Interval>,
{
    hasher.hash_one(intervals.into_iter().collect::<Vec<_>>())
}

#[allow(clippy::cast_possible_truncation)]
fn slab_capacity(capacity: usize) -> u32 {
    // SAFETY: `INITIAL_SIZE` fits in a u32, so the minimum of the two does as well.
    capacity.min(INITIAL_SIZE) as u32
}
