//! Coordinate → administrative area classification.
//!
//! The shipped [`CentroidClassifier`] picks the nearest municipal centroid.
//! That is a heuristic stand-in for polygon containment: near a boundary it
//! can pick the neighbor. Callers that need exact geofencing implement
//! [`AreaStrategy`] themselves; the cascade only depends on the trait.

mod adjacency;
mod tables;

use bftmap_core::{distance_meters, AreaDescriptor};

pub use adjacency::{neighbor_names, ADJACENCY};
pub use tables::{all_centroids, find_centroid, AreaCentroid, CITIES, ISLANDS, TOWNS, WARDS};

/// Maps coordinates to areas and areas to their expansion neighbors.
pub trait AreaStrategy: Send + Sync + 'static {
    /// Area the coordinate most plausibly belongs to.
    fn classify(&self, lat: f64, lng: f64) -> AreaDescriptor;

    /// Areas to expand into when `area` alone is not enough. An empty result
    /// means "no further expansion", not an unknown area.
    fn adjacent_areas(&self, area: &AreaDescriptor) -> Vec<AreaDescriptor>;
}

/// Nearest-centroid classifier over the built-in Tokyo tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct CentroidClassifier;

impl CentroidClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AreaStrategy for CentroidClassifier {
    fn classify(&self, lat: f64, lng: f64) -> AreaDescriptor {
        let mut best: Option<(&AreaCentroid, f64)> = None;
        for centroid in all_centroids() {
            let d = distance_meters(lat, lng, centroid.lat, centroid.lng);
            // Strictly less: earlier tables win exact ties.
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((centroid, d));
            }
        }

        // Tables are non-empty constants, so `best` is always set; the
        // fallback keeps the function total without a panic path.
        let centroid = best.map_or(&WARDS[0], |(c, _)| c);
        AreaDescriptor::new(centroid.name, centroid.kind)
    }

    fn adjacent_areas(&self, area: &AreaDescriptor) -> Vec<AreaDescriptor> {
        neighbor_names(&area.name)
            .iter()
            .filter_map(|name| find_centroid(name))
            .map(|c| AreaDescriptor::new(c.name, c.kind))
            .collect()
    }
}

/// Classifies a free-text address by municipality name.
///
/// Substring match over wards, Tama cities, Nishi-Tama towns, then islands;
/// the first hit wins. Returns `None` for addresses outside Tokyo or without
/// a municipality.
#[must_use]
pub fn area_from_address(address: &str) -> Option<AreaDescriptor> {
    all_centroids()
        .find(|c| address.contains(c.name))
        .map(|c| AreaDescriptor::new(c.name, c.kind))
}
