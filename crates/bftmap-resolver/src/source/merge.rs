use std::collections::HashSet;

use bftmap_core::{distance_meters, FacilityRecord, ResolvedFacility, SourceKind};

use super::NearbyQuery;

/// Accumulates ranked facilities across tiers.
///
/// Records outside the radius are ignored; a coordinate pair already seen
/// (exact bit equality) is dropped. After every merge the list is sorted by
/// ascending distance and capped at `max_count`.
#[derive(Debug)]
pub(crate) struct RankedMerge {
    query: NearbyQuery,
    seen: HashSet<(u64, u64)>,
    ranked: Vec<ResolvedFacility>,
}

impl RankedMerge {
    pub(crate) fn new(query: NearbyQuery) -> Self {
        Self {
            query,
            seen: HashSet::new(),
            ranked: Vec::new(),
        }
    }

    /// Merges `records`, returning how many were added.
    pub(crate) fn merge<'r>(
        &mut self,
        source: SourceKind,
        records: impl IntoIterator<Item = &'r FacilityRecord>,
    ) -> usize {
        let before = self.ranked.len();
        for record in records {
            let d = distance_meters(self.query.lat, self.query.lng, record.lat, record.lng);
            if self.query.radius_meters.is_nan() || d > self.query.radius_meters {
                continue;
            }
            if !self.seen.insert(coordinate_key(record)) {
                continue;
            }
            self.ranked.push(ResolvedFacility {
                record: record.clone(),
                distance_meters: d,
                source,
            });
        }
        let added = self.ranked.len() - before;

        self.ranked
            .sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
        self.ranked.truncate(self.query.max_count);
        added
    }

    pub(crate) fn len(&self) -> usize {
        self.ranked.len()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.ranked.len() >= self.query.max_count
    }

    pub(crate) fn into_vec(self) -> Vec<ResolvedFacility> {
        self.ranked
    }
}

fn coordinate_key(record: &FacilityRecord) -> (u64, u64) {
    (record.lat.to_bits(), record.lng.to_bits())
}
