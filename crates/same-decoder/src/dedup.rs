//! Alert deduplication.
//!
//! The same activation is never emitted twice within the configured
//! suppression window. Keyed on `(EEE, sorted PSSCCC list, JJJHHMM,
//! LLLLLLLL)` — the same activation re-transmitted (e.g. a station repeating
//! a warning) collapses to one key regardless of location ordering.

use std::time::{Duration, Instant};

use lru::LruCache;
use std::num::NonZeroUsize;

use crate::header::SameHeader;

/// Default dedup cache capacity.
pub const DEFAULT_CAPACITY: usize = 512;

/// The tuple used to suppress repeated emissions of the same alert.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    event_code: String,
    locations: Vec<String>,
    issuance: String,
    station_id: String,
}

impl DedupKey {
    /// Build the key for a parsed header. Locations are sorted so the same
    /// set of counties in a different transmitted order still collapses to
    /// one key.
    pub fn from_header(header: &SameHeader) -> Self {
        let mut locations: Vec<String> = header
            .locations
            .iter()
            .map(|l| l.as_str().to_string())
            .collect();
        locations.sort();
        Self {
            event_code: header.event_code.as_str().to_string(),
            locations,
            issuance: format!(
                "{:03}{:02}{:02}",
                header.issuance.day_of_year(),
                header.issuance.hour(),
                header.issuance.minute()
            ),
            station_id: header.station_id.as_str().to_string(),
        }
    }
}

/// Fixed-capacity, LRU-evicted cache of recently-emitted dedup keys.
pub struct DedupCache {
    entries: LruCache<DedupKey, Instant>,
    window: Duration,
}

impl DedupCache {
    /// Build a cache with the default capacity and the given suppression
    /// window.
    pub fn new(window: Duration) -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, window)
    }

    /// Build a cache with an explicit capacity, for tests that want to
    /// exercise LRU eviction without waiting out the suppression window.
    pub fn with_capacity(capacity: usize, window: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            entries: LruCache::new(capacity),
            window,
        }
    }

    /// Whether `key` has already been emitted within the suppression window.
    /// Stale entries are treated as absent but left for the LRU to evict
    /// naturally, avoiding an extra full scan on every check.
    pub fn should_suppress(&mut self, key: &DedupKey, now: Instant) -> bool {
        match self.entries.get(key) {
            Some(&seen_at) => now.duration_since(seen_at) < self.window,
            None => false,
        }
    }

    /// Record that `key` was just emitted at `now`.
    pub fn record(&mut self, key: DedupKey, now: Instant) {
        self.entries.put(key, now);
    }
}
