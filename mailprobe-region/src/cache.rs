//! Bounded, process-lifetime memo of country lookups.

use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::warn;
use lru::LruCache;
use serde::Serialize;

use crate::error::RegionError;
use crate::source::CountryLookup;

/// Memoized outcome for one address: a country code or an error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionLookup {
    pub region_code: Option<String>,
    pub error: Option<String>,
}

impl RegionLookup {
    fn query(ip: &str, source: &dyn CountryLookup) -> Self {
        let result = ip
            .parse::<IpAddr>()
            .map_err(|_| RegionError::InvalidAddress(ip.to_string()))
            .and_then(|addr| source.country_of(addr));
        match result {
            Ok(region_code) => Self {
                region_code,
                error: None,
            },
            Err(e) => {
                if matches!(e, RegionError::Database(_)) {
                    warn!("[Region] Lookup of {ip} failed: {e}");
                }
                Self {
                    region_code: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// Hit/miss counters and occupancy, reset by [`RegionCache::clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheInfo {
    pub hits: u64,
    pub misses: u64,
    pub max_size: usize,
    pub current_size: usize,
}

struct CacheState {
    entries: LruCache<String, RegionLookup>,
    /// Bumped by every clear; a miss started under an older generation is not stored.
    generation: u64,
    hits: u64,
    misses: u64,
}

/// LRU memo keyed by the address string.
///
/// Entries never expire by time. Concurrent misses on the same address may
/// each query the source; cached entries are always served without a query.
pub struct RegionCache {
    state: Mutex<CacheState>,
    capacity: NonZeroUsize,
}

impl RegionCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                generation: 0,
                hits: 0,
                misses: 0,
            }),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached lookup of `ip`; the flag reports whether it was a cache hit.
    ///
    /// The source is queried outside the lock.
    pub fn lookup(&self, ip: &str, source: &dyn CountryLookup) -> (RegionLookup, bool) {
        let generation = {
            let mut state = self.lock();
            if let Some(hit) = state.entries.get(ip).cloned() {
                state.hits += 1;
                return (hit, true);
            }
            state.misses += 1;
            state.generation
        };

        let lookup = RegionLookup::query(ip, source);

        let mut state = self.lock();
        if state.generation == generation {
            state.entries.put(ip.to_string(), lookup.clone());
        }
        (lookup, false)
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.generation = state.generation.wrapping_add(1);
        state.hits = 0;
        state.misses = 0;
    }

    pub fn info(&self) -> CacheInfo {
        let state = self.lock();
        CacheInfo {
            hits: state.hits,
            misses: state.misses,
            max_size: self.capacity.get(),
            current_size: state.entries.len(),
        }
    }
}
