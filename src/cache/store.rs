use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::assets::buffer::ImageBuffer;
use crate::cache::key::CacheKey;
use crate::foundation::error::{PixcacheError, PixcacheResult};

/// Cache configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheOpts {
    /// Maximum retained cost in bytes. `0` turns the cache into a pass-through.
    pub max_cost: u64,
    /// Entries untouched for at least this many seconds are dropped by periodic flushes.
    pub max_age_secs: u64,
    /// Minimum spacing between periodic flushes driven by [`ThemeCache::tick`].
    pub flush_interval_secs: u64,
}

impl Default for CacheOpts {
    fn default() -> Self {
        Self {
            max_cost: 1024 * 1024,
            max_age_secs: 300,
            flush_interval_secs: 300,
        }
    }
}

impl CacheOpts {
    /// Return options with a different capacity.
    pub fn with_max_cost(mut self, max_cost: u64) -> Self {
        self.max_cost = max_cost;
        self
    }

    /// Return options with a different stale-entry age.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age_secs = max_age.as_secs();
        self
    }

    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> PixcacheResult<Self> {
        serde_json::from_str(s).map_err(|e| PixcacheError::serde(e.to_string()))
    }

    /// Stale-entry age as a [`Duration`].
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    /// Flush spacing as a [`Duration`].
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }
}

/// Counters describing cache activity since construction.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that returned an entry.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Successful inserts.
    pub inserted: u64,
    /// Inserts refused (duplicate key, empty, oversize or pass-through).
    pub rejected: u64,
    /// Entries dropped to get back under capacity.
    pub evicted: u64,
    /// Entries dropped by age or explicit invalidation.
    pub flushed: u64,
    /// Entries currently held.
    pub retained_entries: usize,
    /// Cost currently held.
    pub retained_cost: u64,
}

#[derive(Debug)]
struct CacheEntry {
    image: Rc<ImageBuffer>,
    cost: u64,
    last_used: u64,
}

/// Bounded store of themed images that are not currently live in any role.
///
/// Lookups transfer the entry out to the caller, who either keeps it live or offers it back with
/// [`ThemeCache::insert`]. Capacity overflow evicts least-recently-used entries; [`flush_stale`]
/// and [`tick`] additionally drop entries by age, regardless of capacity.
///
/// [`flush_stale`]: ThemeCache::flush_stale
/// [`tick`]: ThemeCache::tick
#[derive(Debug)]
pub struct ThemeCache {
    opts: CacheOpts,
    entries: HashMap<CacheKey, CacheEntry>,
    total_cost: u64,
    clock: u64,
    last_flush: Option<Instant>,
    stats: CacheStats,
}

impl ThemeCache {
    /// Create an empty cache.
    pub fn new(opts: CacheOpts) -> Self {
        Self {
            opts,
            entries: HashMap::new(),
            total_cost: 0,
            clock: 0,
            last_flush: None,
            stats: CacheStats::default(),
        }
    }

    /// Options the cache was built with.
    pub fn opts(&self) -> CacheOpts {
        self.opts
    }

    /// Configured capacity in bytes.
    pub fn max_cost(&self) -> u64 {
        self.opts.max_cost
    }

    /// Cost currently retained.
    pub fn total_cost(&self) -> u64 {
        self.total_cost
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` when configured to retain nothing.
    pub fn is_pass_through(&self) -> bool {
        self.opts.max_cost == 0
    }

    /// Whether an entry for `key` is retained.
    pub fn contains(&self, key: CacheKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Activity counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            retained_entries: self.entries.len(),
            retained_cost: self.total_cost,
            ..self.stats.clone()
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.clock = self.clock.wrapping_add(1);
        self.clock
    }

    /// Remove and return the entry for `key`, marking it touched.
    pub fn lookup(&mut self, key: CacheKey) -> Option<Rc<ImageBuffer>> {
        let Some(entry) = self.entries.remove(&key) else {
            self.stats.misses = self.stats.misses.saturating_add(1);
            return None;
        };
        self.total_cost = self.total_cost.saturating_sub(entry.cost);
        self.stats.hits = self.stats.hits.saturating_add(1);
        entry.image.touch(Instant::now());
        Some(entry.image)
    }

    /// Offer `image` under `key`.
    ///
    /// Returns `false` without storing when an entry for `key` already exists, when the image is
    /// empty, when the cache is a pass-through, or when the image alone exceeds the capacity.
    /// Otherwise stores it and evicts least-recently-used entries until back under capacity.
    pub fn insert(&mut self, key: CacheKey, image: Rc<ImageBuffer>) -> bool {
        let cost = image.cost();
        if self.entries.contains_key(&key)
            || cost == 0
            || self.is_pass_through()
            || cost > self.opts.max_cost
        {
            self.stats.rejected = self.stats.rejected.saturating_add(1);
            return false;
        }

        let tick = self.next_tick();
        image.touch(Instant::now());
        self.entries.insert(
            key,
            CacheEntry {
                image,
                cost,
                last_used: tick,
            },
        );
        self.total_cost = self.total_cost.saturating_add(cost);
        self.stats.inserted = self.stats.inserted.saturating_add(1);

        self.evict_to_budget();
        true
    }

    fn evict_to_budget(&mut self) {
        while self.total_cost > self.opts.max_cost {
            let lru_key = self
                .entries
                .iter()
                .min_by_key(|(_key, entry)| entry.last_used)
                .map(|(key, _entry)| *key);

            let Some(key) = lru_key else {
                break;
            };
            if let Some(entry) = self.entries.remove(&key) {
                self.total_cost = self.total_cost.saturating_sub(entry.cost);
                self.stats.evicted = self.stats.evicted.saturating_add(1);
                tracing::debug!(key = key.encode(), cost = entry.cost, "evicted over capacity");
            } else {
                break;
            }
        }
    }

    /// Drop every entry untouched for at least `max_age` as of `now`. Returns the count removed.
    pub fn flush_stale(&mut self, now: Instant, max_age: Duration) -> usize {
        let before = self.entries.len();
        let mut freed = 0u64;
        self.entries.retain(|_key, entry| {
            let age = now.saturating_duration_since(entry.image.last_touched());
            let keep = age < max_age;
            if !keep {
                freed += entry.cost;
            }
            keep
        });
        self.total_cost = self.total_cost.saturating_sub(freed);
        self.last_flush = Some(now);

        let removed = before - self.entries.len();
        self.stats.flushed = self.stats.flushed.saturating_add(removed as u64);
        if removed > 0 {
            tracing::debug!(removed, freed, "flushed stale theme images");
        }
        removed
    }

    /// Periodic flush hook for a host timer or cooperative tick.
    ///
    /// Runs [`ThemeCache::flush_stale`] with the configured age once the flush interval has
    /// elapsed since the previous flush; the first call only arms the interval.
    pub fn tick(&mut self, now: Instant) -> usize {
        match self.last_flush {
            None => {
                self.last_flush = Some(now);
                0
            }
            Some(last) if now.saturating_duration_since(last) >= self.opts.flush_interval() => {
                self.flush_stale(now, self.opts.max_age())
            }
            Some(_) => 0,
        }
    }

    /// Remove the entry for `key`, if any.
    pub fn evict(&mut self, key: CacheKey) -> bool {
        match self.entries.remove(&key) {
            Some(entry) => {
                self.total_cost = self.total_cost.saturating_sub(entry.cost);
                self.stats.flushed = self.stats.flushed.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Remove every variant cached for `role_id`. Returns the count removed.
    pub fn evict_role(&mut self, role_id: u32) -> usize {
        let keys: Vec<CacheKey> = self
            .entries
            .keys()
            .filter(|k| k.role_id() == role_id)
            .copied()
            .collect();
        keys.into_iter().filter(|k| self.evict(*k)).count()
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        let n = self.entries.len() as u64;
        self.entries.clear();
        self.total_cost = 0;
        self.stats.flushed = self.stats.flushed.saturating_add(n);
    }
}

impl Default for ThemeCache {
    fn default() -> Self {
        Self::new(CacheOpts::default())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/store.rs"]
mod tests;
