//! One user's resolver state: a data source paired with a pin registry.

use serde::Serialize;

use bftmap_core::ViewportBounds;

use crate::error::ResolverError;
use crate::fetch::DatasetFetcher;
use crate::registry::{FacilityRegistry, IngestSummary};
use crate::source::{NearbyQuery, Resolution, ResolveMode, TieredDataSource};

/// Result of [`NearbySession::search`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchReport {
    pub resolution: Resolution,
    pub ingest: IngestSummary,
    /// Pins hidden by the visibility pass that followed the ingest.
    pub hidden: Vec<u64>,
}

/// Drives the resolve → ingest → visibility flow.
///
/// Viewport changes only re-run the visibility pass; they never refetch.
/// Mutating methods take `&mut self`, so a session shared between tasks must
/// sit behind a lock, which serializes overlapping searches.
#[derive(Debug)]
pub struct NearbySession<F: DatasetFetcher> {
    source: TieredDataSource<F>,
    registry: FacilityRegistry,
    viewport: Option<ViewportBounds>,
    last_search: Option<(NearbyQuery, ResolveMode)>,
}

impl<F: DatasetFetcher> NearbySession<F> {
    pub fn new(source: TieredDataSource<F>, registry: FacilityRegistry) -> Self {
        Self {
            source,
            registry,
            viewport: None,
            last_search: None,
        }
    }

    /// Resolves `query`, pins the results, and hides pins outside the last
    /// known viewport.
    ///
    /// # Errors
    ///
    /// Propagates the terminal [`ResolverError`] from
    /// [`TieredDataSource::resolve`]; the registry is untouched in that case.
    pub async fn search(
        &mut self,
        query: NearbyQuery,
        mode: ResolveMode,
    ) -> Result<SearchReport, ResolverError> {
        let resolution = self.source.resolve(query, mode).await?;
        self.last_search = Some((query, mode));

        let ingest = self.registry.ingest_resolved(&resolution.facilities);
        let hidden = match &self.viewport {
            Some(bounds) => self.registry.update_visibility_for_viewport(bounds),
            None => Vec::new(),
        };
        tracing::info!(
            lat = query.lat,
            lng = query.lng,
            %mode,
            found = resolution.facilities.len(),
            added = ingest.added,
            skipped = ingest.skipped,
            outcome = resolution.outcome.message(),
            "nearby search complete"
        );

        Ok(SearchReport {
            resolution,
            ingest,
            hidden,
        })
    }

    /// Records the new viewport and returns the ids of pins it hid.
    pub fn on_viewport_change(&mut self, bounds: ViewportBounds) -> Vec<u64> {
        self.viewport = Some(bounds);
        self.registry.update_visibility_for_viewport(&bounds)
    }

    /// Drops facility pins and repeats the last search, which is the only
    /// way sticky-hidden pins come back. Returns `None` if nothing was
    /// searched yet.
    ///
    /// # Errors
    ///
    /// Same as [`search`](Self::search).
    pub async fn reload(&mut self) -> Result<Option<SearchReport>, ResolverError> {
        let Some((query, mode)) = self.last_search else {
            tracing::info!("reload requested before any search; nothing to do");
            return Ok(None);
        };
        let dropped = self.registry.clear_facilities();
        tracing::info!(dropped, "reloading last search");
        self.search(query, mode).await.map(Some)
    }

    pub fn source(&self) -> &TieredDataSource<F> {
        &self.source
    }

    pub fn registry(&self) -> &FacilityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FacilityRegistry {
        &mut self.registry
    }

    pub fn viewport(&self) -> Option<ViewportBounds> {
        self.viewport
    }

    pub fn last_search(&self) -> Option<(NearbyQuery, ResolveMode)> {
        self.last_search
    }
}

#[cfg(test)]
mod tests {
    use bftmap_core::SourceKind;

    use super::*;
    use crate::fetch::MemoryFetcher;
    use crate::paths::lightweight_path;
    use crate::source::{ResolveOutcome, SourceOptions};

    const HEADER: &str = "name,address,floor,toilet_name,note,color,lng,lat";

    fn session_with_index(rows: &str) -> NearbySession<MemoryFetcher> {
        let fetcher = MemoryFetcher::new()
            .with_file(lightweight_path(SourceKind::Public), format!("{HEADER}\n{rows}"))
            .with_file(lightweight_path(SourceKind::Transit), HEADER);
        let source = TieredDataSource::new(
            fetcher,
            SourceOptions {
                fetch_concurrency: 1,
                preload_enabled: false,
            },
        );
        NearbySession::new(source, FacilityRegistry::default())
    }

    fn query() -> NearbyQuery {
        NearbyQuery {
            lat: 35.690_9,
            lng: 139.700_3,
            radius_meters: 2_000.0,
            max_count: 1,
        }
    }

    const ROWS: &str = "新宿駅,,,,,,139.7003,35.6909\n";

    #[tokio::test]
    async fn search_pins_results() {
        let mut session = session_with_index(ROWS);
        let report = session.search(query(), ResolveMode::Tiered).await.unwrap();

        assert_eq!(report.resolution.outcome, ResolveOutcome::Found);
        assert_eq!(report.ingest, IngestSummary { added: 1, skipped: 0 });
        assert!(report.hidden.is_empty());
        assert_eq!(session.registry().len(), 1);
    }

    #[tokio::test]
    async fn repeated_search_skips_duplicates() {
        let mut session = session_with_index(ROWS);
        session.search(query(), ResolveMode::Tiered).await.unwrap();
        let report = session.search(query(), ResolveMode::Tiered).await.unwrap();
        assert_eq!(report.ingest, IngestSummary { added: 0, skipped: 1 });
    }

    #[tokio::test]
    async fn viewport_change_hides_without_refetching() {
        let mut session = session_with_index(ROWS);
        session.search(query(), ResolveMode::Tiered).await.unwrap();
        let fetches = session.source().fetcher().total_fetches();

        let hidden = session.on_viewport_change(ViewportBounds::new(35.0, 34.9, 139.1, 139.0));
        assert_eq!(hidden.len(), 1);
        assert_eq!(session.source().fetcher().total_fetches(), fetches);

        // Back over the pin: still hidden.
        let hidden = session.on_viewport_change(ViewportBounds::new(35.7, 35.6, 139.8, 139.6));
        assert!(hidden.is_empty());
        assert_eq!(session.registry().visible_entries().count(), 0);
    }

    #[tokio::test]
    async fn reload_restores_sticky_hidden_pins() {
        let mut session = session_with_index(ROWS);
        session.search(query(), ResolveMode::Tiered).await.unwrap();
        session.on_viewport_change(ViewportBounds::new(35.0, 34.9, 139.1, 139.0));
        session.on_viewport_change(ViewportBounds::new(35.7, 35.6, 139.8, 139.6));

        let report = session.reload().await.unwrap().unwrap();
        assert_eq!(report.ingest.added, 1);
        assert_eq!(session.registry().visible_entries().count(), 1);
    }

    #[tokio::test]
    async fn reload_before_search_is_none() {
        let mut session = session_with_index(ROWS);
        assert!(session.reload().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_search_leaves_registry_untouched() {
        let source = TieredDataSource::new(MemoryFetcher::new(), SourceOptions::default());
        let mut session = NearbySession::new(source, FacilityRegistry::default());

        let err = session.search(query(), ResolveMode::Tiered).await.unwrap_err();
        assert!(matches!(err, ResolverError::AllSourcesExhausted { .. }));
        assert!(session.registry().is_empty());
        assert!(session.last_search().is_none());
    }
}
