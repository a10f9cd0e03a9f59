//! The tiered nearby-facility cascade.
//!
//! ```text
//! tier 0  lightweight index ──(count < min(max, 20))──┐
//! tier 1  classified area partitions ◄────────────────┘
//! tier 2  adjacent areas, in adjacency order, until max_count
//! tier 3  integrated files (explicit, or after a tier 0–2 fetch failure)
//! ```
//!
//! Partition loads go through [`PartitionCache`]; a failed partition
//! degrades to an empty, cached list. After a tiered resolution the
//! neighbors of the primary area are prefetched in the background.

mod merge;

use std::fmt;
use std::sync::Arc;

use bftmap_core::{AppConfig, AreaDescriptor, FacilityRecord, ResolvedFacility, SourceKind};
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::area::{AreaStrategy, CentroidClassifier};
use crate::cache::{CacheKey, CacheStats, Partition, PartitionCache};
use crate::error::ResolverError;
use crate::fetch::DatasetFetcher;
use crate::parse::{parse_facilities, parse_partition};
use crate::paths::{lightweight_path, partition_path, INTEGRATED_PATHS};
use crate::preload::Preloader;

use merge::RankedMerge;

/// Tier 0 never escalates once it holds this many results, whatever `max_count` is.
pub const ESCALATION_FLOOR: usize = 20;

/// Tunables for [`TieredDataSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceOptions {
    /// Upper bound on concurrent partition loads during adjacent expansion
    /// and preloading.
    pub fetch_concurrency: usize,
    pub preload_enabled: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            fetch_concurrency: 4,
            preload_enabled: true,
        }
    }
}

impl SourceOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            fetch_concurrency: config.fetch_concurrency.max(1),
            preload_enabled: config.preload_enabled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius_meters: f64,
    pub max_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveMode {
    /// Tiers 0–2, falling back to the integrated files on a fetch failure.
    #[default]
    Tiered,
    /// Integrated files only.
    Integrated,
}

impl fmt::Display for ResolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveMode::Tiered => write!(f, "tiered"),
            ResolveMode::Integrated => write!(f, "integrated"),
        }
    }
}

impl std::str::FromStr for ResolveMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tiered" => Ok(ResolveMode::Tiered),
            "integrated" => Ok(ResolveMode::Integrated),
            other => Err(format!("unknown resolve mode \"{other}\"")),
        }
    }
}

/// The cheapest tier that produced the final list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Index,
    Area,
    Adjacent,
    Integrated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveOutcome {
    Found,
    /// Data loaded fine; nothing lies within the radius.
    NoneInRange,
}

impl ResolveOutcome {
    /// User-facing summary line.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ResolveOutcome::Found => "facilities found nearby",
            ResolveOutcome::NoneInRange => "no facilities within the search radius",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub facilities: Vec<ResolvedFacility>,
    pub outcome: ResolveOutcome,
    pub tier: Tier,
    /// Area the query center was classified into; `None` on the integrated path.
    pub area: Option<AreaDescriptor>,
}

impl Resolution {
    fn new(facilities: Vec<ResolvedFacility>, tier: Tier, area: Option<AreaDescriptor>) -> Self {
        let outcome = if facilities.is_empty() {
            ResolveOutcome::NoneInRange
        } else {
            ResolveOutcome::Found
        };
        Self {
            facilities,
            outcome,
            tier,
            area,
        }
    }
}

type LightweightIndex = Vec<(SourceKind, FacilityRecord)>;

struct SourceInner<F> {
    fetcher: F,
    strategy: Arc<dyn AreaStrategy>,
    cache: PartitionCache,
    index: Mutex<Option<Arc<LightweightIndex>>>,
    options: SourceOptions,
}

/// Owns the fetcher, the area strategy, the partition cache, and the
/// preloader for one resolver instance. Dropping it cancels its preloads.
pub struct TieredDataSource<F: DatasetFetcher> {
    inner: Arc<SourceInner<F>>,
    preloader: Preloader,
}

impl<F: DatasetFetcher> TieredDataSource<F> {
    /// Creates a data source using nearest-centroid classification.
    pub fn new(fetcher: F, options: SourceOptions) -> Self {
        Self::with_strategy(fetcher, CentroidClassifier::new(), options)
    }

    pub fn with_strategy(fetcher: F, strategy: impl AreaStrategy, options: SourceOptions) -> Self {
        Self {
            inner: Arc::new(SourceInner {
                fetcher,
                strategy: Arc::new(strategy),
                cache: PartitionCache::new(),
                index: Mutex::new(None),
                options,
            }),
            preloader: Preloader::new(),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.inner.fetcher
    }

    pub fn strategy(&self) -> &dyn AreaStrategy {
        self.inner.strategy.as_ref()
    }

    pub fn options(&self) -> SourceOptions {
        self.inner.options
    }

    pub fn classify(&self, lat: f64, lng: f64) -> AreaDescriptor {
        self.inner.strategy.classify(lat, lng)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }

    /// Whether the partition for `(area, source)` is cached.
    pub fn is_cached(&self, area: &AreaDescriptor, source: SourceKind) -> bool {
        self.inner.cache.contains(&CacheKey::new(area, source))
    }

    pub fn pending_preloads(&self) -> usize {
        self.preloader.pending_count()
    }

    /// Forgets every cached partition and the lightweight index.
    pub async fn clear_cache(&self) {
        self.inner.cache.clear();
        *self.inner.index.lock().await = None;
    }

    /// Cancels in-flight preloads and refuses new ones.
    pub fn shutdown(&self) {
        self.preloader.shutdown();
    }

    /// Tiers 0–2: distance-sorted facilities within `radius_meters`, at most
    /// `max_count` of them.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::IndexUnavailable`] when neither lightweight
    /// index file loads. Individual partition failures are not errors.
    pub async fn resolve_nearby(
        &self,
        lat: f64,
        lng: f64,
        radius_meters: f64,
        max_count: usize,
    ) -> Result<Vec<ResolvedFacility>, ResolverError> {
        let query = NearbyQuery {
            lat,
            lng,
            radius_meters,
            max_count,
        };
        Ok(self.resolve_tiered(query).await?.facilities)
    }

    /// Tier 3: rank the two integrated files directly.
    ///
    /// An empty list means nothing lies within the radius.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::AllSourcesExhausted`] only when every
    /// integrated file fails to load.
    pub async fn resolve_nearby_integrated(
        &self,
        lat: f64,
        lng: f64,
        radius_meters: f64,
        max_count: usize,
    ) -> Result<Vec<ResolvedFacility>, ResolverError> {
        let query = NearbyQuery {
            lat,
            lng,
            radius_meters,
            max_count,
        };
        self.inner.resolve_integrated(query).await
    }

    /// Resolves `query` in `mode`, distinguishing "nothing in range" (an
    /// `Ok` with [`ResolveOutcome::NoneInRange`]) from "could not load" (an
    /// `Err`).
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::AllSourcesExhausted`] when the integrated
    /// path is reached and every integrated file fails.
    pub async fn resolve(
        &self,
        query: NearbyQuery,
        mode: ResolveMode,
    ) -> Result<Resolution, ResolverError> {
        if mode == ResolveMode::Tiered {
            match self.resolve_tiered(query).await {
                Ok(resolution) => return Ok(resolution),
                Err(err) if err.is_fetch_failure() => {
                    tracing::warn!(error = %err, "tiered resolution failed; falling back to integrated files");
                }
                Err(err) => return Err(err),
            }
        }

        let facilities = self.inner.resolve_integrated(query).await?;
        Ok(Resolution::new(facilities, Tier::Integrated, None))
    }

    async fn resolve_tiered(&self, query: NearbyQuery) -> Result<Resolution, ResolverError> {
        let inner = &self.inner;
        let area = inner.strategy.classify(query.lat, query.lng);
        let index = inner.lightweight_index().await?;

        let mut merged = RankedMerge::new(query);
        for source in SourceKind::ALL {
            merged.merge(
                source,
                index.iter().filter(|(s, _)| *s == source).map(|(_, r)| r),
            );
        }

        let threshold = query.max_count.min(ESCALATION_FLOOR);
        let tier = if merged.len() >= threshold {
            tracing::debug!(found = merged.len(), threshold, "lightweight index sufficient");
            Tier::Index
        } else {
            tracing::debug!(found = merged.len(), threshold, area = %area, "escalating to area partitions");
            let (public, transit) = inner.load_area(&area).await;
            merged.merge(SourceKind::Public, public.iter());
            merged.merge(SourceKind::Transit, transit.iter());

            if !merged.is_full() && inner.expand_adjacent(&area, &mut merged).await > 0 {
                Tier::Adjacent
            } else {
                Tier::Area
            }
        };

        if inner.options.preload_enabled {
            self.schedule_preload(&area);
        }

        let facilities = merged.into_vec();
        tracing::debug!(
            area = %area,
            ?tier,
            count = facilities.len(),
            "tiered resolution complete"
        );
        Ok(Resolution::new(facilities, tier, Some(area)))
    }

    fn schedule_preload(&self, area: &AreaDescriptor) {
        let neighbors = self.inner.strategy.adjacent_areas(area);
        if neighbors.is_empty() {
            return;
        }
        let inner = Arc::clone(&self.inner);
        self.preloader.schedule(area.name.clone(), async move {
            let concurrency = inner.options.fetch_concurrency.max(1);
            let inner = &inner;
            let loaded = stream::iter(neighbors)
                .map(|neighbor| async move {
                    inner.load_area(&neighbor).await;
                })
                .buffer_unordered(concurrency)
                .count()
                .await;
            tracing::debug!(areas = loaded, "preloaded neighbor partitions");
        });
    }
}

impl<F: DatasetFetcher> fmt::Debug for TieredDataSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TieredDataSource")
            .field("options", &self.inner.options)
            .field("cache", &self.inner.cache.stats())
            .field("pending_preloads", &self.preloader.pending_count())
            .finish_non_exhaustive()
    }
}

impl<F: DatasetFetcher> SourceInner<F> {
    /// Memoized tier-0 index. One file failing degrades to the other and is
    /// retried on the next call; both failing is an error.
    async fn lightweight_index(&self) -> Result<Arc<LightweightIndex>, ResolverError> {
        let mut slot = self.index.lock().await;
        if let Some(index) = slot.as_ref() {
            return Ok(Arc::clone(index));
        }

        let loads = SourceKind::ALL.map(|source| async move {
            let path = lightweight_path(source);
            (source, self.fetcher.fetch_text(&path).await)
        });

        let mut index = Vec::new();
        let mut failures = Vec::new();
        for (source, result) in join_all(loads).await {
            match result {
                Ok(body) => index.extend(parse_facilities(&body).into_iter().map(|r| (source, r))),
                Err(err) => {
                    tracing::warn!(%source, error = %err, "lightweight index file unavailable");
                    failures.push(format!("{source}: {err}"));
                }
            }
        }

        if failures.len() == SourceKind::ALL.len() {
            return Err(ResolverError::IndexUnavailable {
                reason: failures.join("; "),
            });
        }

        let index = Arc::new(index);
        if failures.is_empty() {
            tracing::info!(records = index.len(), "lightweight index loaded");
            *slot = Some(Arc::clone(&index));
        }
        Ok(index)
    }

    /// Loads both partitions of `area` concurrently.
    async fn load_area(&self, area: &AreaDescriptor) -> (Partition, Partition) {
        futures::join!(
            self.load_partition(area, SourceKind::Public),
            self.load_partition(area, SourceKind::Transit)
        )
    }

    async fn load_partition(&self, area: &AreaDescriptor, source: SourceKind) -> Partition {
        self.cache
            .get_or_load(CacheKey::new(area, source), || async move {
                let path = partition_path(area, source);
                match self.fetcher.fetch_text(&path).await {
                    Ok(body) => {
                        let parsed = parse_partition(&body);
                        tracing::debug!(
                            path,
                            records = parsed.records.len(),
                            skipped = parsed.skipped_rows,
                            "partition loaded"
                        );
                        parsed.records
                    }
                    Err(ResolverError::NotFound { .. }) => {
                        tracing::debug!(path, "no partition published; caching empty");
                        Vec::new()
                    }
                    Err(err) => {
                        tracing::warn!(path, error = %err, "partition unavailable; caching empty");
                        Vec::new()
                    }
                }
            })
            .await
    }

    /// Tier 2. Loads run ahead by up to `fetch_concurrency` areas but merge
    /// in adjacency order. Each load is its own task, so loads still in
    /// flight when the list fills run on into the cache instead of being
    /// dropped. Returns how many neighbor areas were merged.
    async fn expand_adjacent(self: &Arc<Self>, area: &AreaDescriptor, merged: &mut RankedMerge) -> usize {
        let neighbors = self.strategy.adjacent_areas(area);
        if neighbors.is_empty() {
            tracing::debug!(area = %area, "no adjacency row; expansion ends");
            return 0;
        }

        let mut loads = stream::iter(neighbors)
            .map(|neighbor| {
                let inner = Arc::clone(self);
                tokio::spawn(async move {
                    let partitions = inner.load_area(&neighbor).await;
                    (neighbor, partitions)
                })
            })
            .buffered(self.options.fetch_concurrency.max(1));

        let mut visited = 0;
        while let Some(joined) = loads.next().await {
            let (neighbor, (public, transit)) = match joined {
                Ok(loaded) => loaded,
                Err(err) => {
                    tracing::warn!(area = %area, error = %err, "adjacent area load aborted");
                    continue;
                }
            };
            visited += 1;
            let added = merged.merge(SourceKind::Public, public.iter())
                + merged.merge(SourceKind::Transit, transit.iter());
            tracing::debug!(area = %neighbor, added, total = merged.len(), "merged adjacent area");
            if merged.is_full() {
                break;
            }
        }
        visited
    }

    async fn resolve_integrated(
        &self,
        query: NearbyQuery,
    ) -> Result<Vec<ResolvedFacility>, ResolverError> {
        let loads = INTEGRATED_PATHS.map(|(source, path)| async move {
            (source, path, self.fetcher.fetch_text(path).await)
        });

        let mut merged = RankedMerge::new(query);
        let mut failures = Vec::new();
        for (source, path, result) in join_all(loads).await {
            match result {
                Ok(body) => {
                    merged.merge(source, parse_facilities(&body).iter());
                }
                Err(err) => {
                    tracing::warn!(path, error = %err, "integrated file unavailable");
                    failures.push(format!("{path}: {err}"));
                }
            }
        }

        if failures.len() == INTEGRATED_PATHS.len() {
            return Err(ResolverError::AllSourcesExhausted {
                attempted: INTEGRATED_PATHS.len(),
                reason: failures.join("; "),
            });
        }

        let facilities = merged.into_vec();
        if facilities.is_empty() {
            tracing::info!(lat = query.lat, lng = query.lng, "integrated files hold nothing in range");
        }
        Ok(facilities)
    }
}

#[cfg(test)]
#[path = "cascade_test.rs"]
mod tests;
