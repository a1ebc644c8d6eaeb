//! Cache Region Module
//!
//! One uniform cache region, parameterised by key/value type and by a
//! `RegionPolicy` giving its capacity and entry lifetime.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, CacheStats, WriteOrder};

// == Region Policy ==
/// Capacity and expiration policy of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegionPolicy {
    /// Maximum live entries; `None` = unbounded
    pub max_entries: Option<usize>,
    /// Lifetime of an entry counted from its last write; `None` = never expires
    pub ttl: Option<Duration>,
}

impl RegionPolicy {
    /// Unbounded, never expires. Entries leave only through invalidation.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// At most `max_entries` entries, each expiring `ttl` after it was written.
    pub fn bounded(max_entries: usize, ttl: Duration) -> Self {
        Self {
            max_entries: Some(max_entries),
            ttl: Some(ttl),
        }
    }
}

// == Generation ==
/// Write counter of a region, observed on a miss.
///
/// Every put and every invalidation advances it. A read-through fill that
/// carries the generation seen at its miss only lands if nothing changed the
/// region in between, so a store read that raced a write is never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// Outcome of a region lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<V> {
    Hit(V),
    Miss(Generation),
}

#[derive(Debug)]
struct RegionState<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    /// Only maintained for bounded regions
    order: WriteOrder<K>,
    stats: CacheStats,
    generation: u64,
}

impl<K, V> RegionState<K, V> {
    fn advance(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

// == Cache Region ==
/// A concurrent, side-effect-free key/value region.
///
/// `get` never fetches; population is the caller's job. All operations take
/// the region's own lock, so `invalidate_all` is observed either fully done or
/// not at all by any reader. Capacity eviction and expiration are silent and
/// only ever show up as a miss.
#[derive(Debug)]
pub struct CacheRegion<K, V> {
    name: &'static str,
    policy: RegionPolicy,
    state: RwLock<RegionState<K, V>>,
}

impl<K, V> CacheRegion<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    pub fn new(name: &'static str, policy: RegionPolicy) -> Self {
        Self {
            name,
            policy,
            state: RwLock::new(RegionState {
                entries: HashMap::new(),
                order: WriteOrder::new(),
                stats: CacheStats::new(),
                generation: 0,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn policy(&self) -> RegionPolicy {
        self.policy
    }

    // == Get ==
    /// Returns a clone of the live value for `key`, if any.
    pub async fn get(&self, key: &K) -> Option<V> {
        match self.lookup(key).await {
            Lookup::Hit(value) => Some(value),
            Lookup::Miss(_) => None,
        }
    }

    // == Lookup ==
    /// Like [`get`](Self::get), but a miss reports the region's current
    /// generation for a later [`put_if_fresh`](Self::put_if_fresh).
    ///
    /// An expired entry is dropped and reported as a miss.
    pub async fn lookup(&self, key: &K) -> Lookup<V> {
        // Write lock: stats and lazy expiry both mutate
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let expired = match state.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                let value = entry.value.clone();
                state.stats.record_hit();
                return Lookup::Hit(value);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            state.entries.remove(key);
            state.order.remove(key);
            state.stats.record_expirations(1);
            state.stats.set_total_entries(state.entries.len());
        }
        state.stats.record_miss();
        Lookup::Miss(Generation(state.generation))
    }

    /// Current generation, for a writer that will refresh an entry later.
    pub async fn generation(&self) -> Generation {
        Generation(self.state.read().await.generation)
    }

    // == Put ==
    /// Stores `value` under `key`, overwriting any previous entry.
    ///
    /// A bounded region at capacity first evicts its least recently written
    /// entry; this never fails. A region with capacity 0 stores nothing.
    pub async fn put(&self, key: K, value: V) {
        let mut guard = self.state.write().await;
        self.insert(&mut guard, key, value);
    }

    // == Put If Fresh ==
    /// Stores `value` only if the region is still at generation `seen`.
    ///
    /// Returns false, leaving the region untouched, when a put or an
    /// invalidation happened since `seen` was observed.
    pub async fn put_if_fresh(&self, key: K, value: V, seen: Generation) -> bool {
        let mut guard = self.state.write().await;
        if guard.generation != seen.0 {
            debug!(region = self.name, "Skipped fill from a superseded read");
            return false;
        }
        self.insert(&mut guard, key, value);
        true
    }

    fn insert(&self, state: &mut RegionState<K, V>, key: K, value: V) {
        state.advance();

        if let Some(max_entries) = self.policy.max_entries {
            if max_entries == 0 {
                return;
            }
            let is_overwrite = state.entries.contains_key(&key);
            if !is_overwrite && state.entries.len() >= max_entries {
                if let Some(evicted) = state.order.evict_oldest() {
                    state.entries.remove(&evicted);
                    state.stats.record_eviction();
                    debug!(region = self.name, "Evicted least recently written entry");
                }
            }
            state.order.record_write(&key);
        }

        state.entries.insert(key, CacheEntry::new(value, self.policy.ttl));
        state.stats.set_total_entries(state.entries.len());
    }

    // == Invalidate ==
    /// Removes one key. Returns true if an entry was present.
    pub async fn invalidate(&self, key: &K) -> bool {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        state.advance();
        let removed = state.entries.remove(key).is_some();
        if removed {
            state.order.remove(key);
            state.stats.set_total_entries(state.entries.len());
        }
        removed
    }

    // == Invalidate All ==
    /// Clears the region under a single write lock. Returns the number of
    /// entries dropped.
    pub async fn invalidate_all(&self) -> usize {
        let mut state = self.state.write().await;
        state.advance();
        let count = state.entries.len();
        state.entries.clear();
        state.order.clear();
        state.stats.set_total_entries(0);
        count
    }

    // == Purge Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub async fn purge_expired(&self) -> usize {
        if self.policy.ttl.is_none() {
            return 0;
        }

        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let now = current_timestamp_ms();
        let expired: Vec<K> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            state.entries.remove(key);
            state.order.remove(key);
        }

        state.stats.record_expirations(expired.len());
        state.stats.set_total_entries(state.entries.len());
        expired.len()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    /// Returns a snapshot of the region's counters.
    pub async fn stats(&self) -> CacheStats {
        let state = self.state.read().await;
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats
    }
}
