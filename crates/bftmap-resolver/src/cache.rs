//! Per-partition record cache with single-flight loading.
//!
//! Entries are immutable once stored and live until [`PartitionCache::clear`].
//! Concurrent misses on the same key share one load: the first caller runs
//! the loader, later callers subscribe to its result.
//!
//! ```text
//! load(港区, public) ─┐
//!                    ├─► in_flight[key] ──► one fetch ──► entries[key]
//! load(港区, public) ─┘        │                              │
//!                         waiters ◄──────── broadcast ◄───────┘
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bftmap_core::{AreaDescriptor, AreaKind, FacilityRecord, SourceKind};
use tokio::sync::broadcast;

/// Parsed records of one partition, shared between the cache and callers.
pub type Partition = Arc<Vec<FacilityRecord>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub area: String,
    pub kind: AreaKind,
    pub source: SourceKind,
}

impl CacheKey {
    #[must_use]
    pub fn new(area: &AreaDescriptor, source: SourceKind) -> Self {
        Self {
            area: area.name.clone(),
            kind: area.kind,
            source,
        }
    }
}

/// Counters for observing cache effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    /// Misses that joined a load already in flight instead of starting one.
    pub coalesced: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, Partition>,
    in_flight: HashMap<CacheKey, broadcast::Sender<Partition>>,
    hits: u64,
    misses: u64,
    coalesced: u64,
}

enum Lookup {
    Hit(Partition),
    Wait(broadcast::Receiver<Partition>),
    Lead,
}

/// Shared partition cache. The inner lock is never held across an await.
#[derive(Debug, Default)]
pub struct PartitionCache {
    state: Mutex<CacheState>,
}

impl PartitionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached partition for `key`, running `load` on a miss.
    ///
    /// The loader's result is stored even when empty. If the leading load is
    /// dropped before finishing, waiters retry and one of them takes over.
    pub async fn get_or_load<L, Fut>(&self, key: CacheKey, load: L) -> Partition
    where
        L: FnOnce() -> Fut,
        Fut: Future<Output = Vec<FacilityRecord>>,
    {
        let mut load = Some(load);
        loop {
            let lookup = {
                let mut state = self.lock();
                if let Some(hit) = state.entries.get(&key).cloned() {
                    state.hits += 1;
                    Lookup::Hit(hit)
                } else if let Some(tx) = state.in_flight.get(&key) {
                    let rx = tx.subscribe();
                    state.coalesced += 1;
                    Lookup::Wait(rx)
                } else {
                    let (tx, _rx) = broadcast::channel(1);
                    state.in_flight.insert(key.clone(), tx);
                    state.misses += 1;
                    Lookup::Lead
                }
            };

            match lookup {
                Lookup::Hit(partition) => {
                    tracing::debug!(area = %key.area, source = %key.source, "partition cache hit");
                    return partition;
                }
                Lookup::Wait(mut rx) => {
                    tracing::debug!(area = %key.area, source = %key.source, "joining in-flight partition load");
                    if let Ok(partition) = rx.recv().await {
                        return partition;
                    }
                    // Leader dropped without publishing; try again.
                }
                Lookup::Lead => {
                    let guard = InFlightGuard {
                        cache: self,
                        key: Some(key.clone()),
                    };
                    // Leading always returns, so the loader is still here.
                    let Some(load) = load.take() else {
                        return guard.complete(Vec::new());
                    };
                    let records = load().await;
                    return guard.complete(records);
                }
            }
        }
    }

    /// Returns the stored partition without loading.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Partition> {
        self.lock().entries.get(key).cloned()
    }

    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().entries.contains_key(key)
    }

    /// Drops every stored partition. Loads already in flight still publish
    /// to their waiters and store their result.
    pub fn clear(&self) -> usize {
        let mut state = self.lock();
        let dropped = state.entries.len();
        state.entries.clear();
        tracing::info!(dropped, "partition cache cleared");
        dropped
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            entries: state.entries.len(),
            hits: state.hits,
            misses: state.misses,
            coalesced: state.coalesced,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removes the in-flight marker if the leading load never completes, which
/// closes the channel and wakes waiters.
struct InFlightGuard<'a> {
    cache: &'a PartitionCache,
    key: Option<CacheKey>,
}

impl InFlightGuard<'_> {
    fn complete(mut self, records: Vec<FacilityRecord>) -> Partition {
        let partition: Partition = Arc::new(records);
        if let Some(key) = self.key.take() {
            let mut state = self.cache.lock();
            state.entries.insert(key.clone(), Arc::clone(&partition));
            if let Some(tx) = state.in_flight.remove(&key) {
                // No receivers is fine: nobody joined this load.
                let _ = tx.send(Arc::clone(&partition));
            }
        }
        partition
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.cache.lock().in_flight.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    fn key(area: &str) -> CacheKey {
        CacheKey::new(&AreaDescriptor::new(area, AreaKind::Ward), SourceKind::Public)
    }

    fn record(name: &str) -> FacilityRecord {
        FacilityRecord {
            name: name.to_owned(),
            address: None,
            floor: None,
            toilet_name: None,
            description: None,
            equipment: None,
            color: None,
            lat: 35.0,
            lng: 139.0,
            extra: std::collections::BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn second_load_is_a_hit() {
        let cache = PartitionCache::new();
        let counter = AtomicUsize::new(0);
        let loads = &counter;

        for _ in 0..2 {
            let partition = cache
                .get_or_load(key("港区"), || async move {
                    loads.fetch_add(1, Ordering::SeqCst);
                    vec![record("A")]
                })
                .await;
            assert_eq!(partition.len(), 1);
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[tokio::test]
    async fn empty_result_is_cached() {
        let cache = PartitionCache::new();
        cache.get_or_load(key("港区"), || async { Vec::new() }).await;
        assert!(cache.contains(&key("港区")));
        assert!(cache.get(&key("港区")).unwrap().is_empty());
    }

    #[tokio::test]
    async fn keys_differ_by_source() {
        let cache = PartitionCache::new();
        cache.get_or_load(key("港区"), || async { Vec::new() }).await;
        let transit = CacheKey {
            source: SourceKind::Transit,
            ..key("港区")
        };
        assert!(!cache.contains(&transit));
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_load() {
        let cache = Arc::new(PartitionCache::new());
        let loads = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..5)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let loads = Arc::clone(&loads);
                tokio::spawn(async move {
                    cache
                        .get_or_load(key("新宿区"), || async move {
                            loads.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            vec![record("A"), record("B")]
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().len(), 2);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test]
    async fn dropped_leader_lets_waiter_take_over() {
        let cache = Arc::new(PartitionCache::new());

        let leader = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                cache
                    .get_or_load(key("渋谷区"), || async {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                        vec![record("never")]
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let waiter = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                cache
                    .get_or_load(key("渋谷区"), || async { vec![record("fresh")] })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        leader.abort();

        let partition = waiter.await.unwrap();
        assert_eq!(partition[0].name, "fresh");
    }

    #[tokio::test]
    async fn clear_forces_reload() {
        let cache = PartitionCache::new();
        cache.get_or_load(key("港区"), || async { Vec::new() }).await;
        assert_eq!(cache.clear(), 1);
        assert!(!cache.contains(&key("港区")));
        assert_eq!(cache.stats().entries, 0);
    }
}
