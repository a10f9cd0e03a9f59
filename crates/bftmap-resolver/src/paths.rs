//! Dataset path conventions, relative to the configured data base.

use bftmap_core::{AreaDescriptor, AreaKind, SourceKind};

/// Integrated full-coverage files, in the order they are tried.
pub const INTEGRATED_PATHS: [(SourceKind, &str); 2] = [
    (SourceKind::Public, "data/barrier_free_toilets.csv"),
    (SourceKind::Transit, "data/station_barrier_free_toilets.csv"),
];

/// `data/lightweight/integrated_{public|station}.csv`
#[must_use]
pub fn lightweight_path(source: SourceKind) -> String {
    let suffix = match source {
        SourceKind::Public => "public",
        SourceKind::Transit => "station",
    };
    format!("data/lightweight/integrated_{suffix}.csv")
}

/// `data/tokyo[_station]/{23ku|tama|islands}/<area>.csv`
#[must_use]
pub fn partition_path(area: &AreaDescriptor, source: SourceKind) -> String {
    let tree = match source {
        SourceKind::Public => "tokyo",
        SourceKind::Transit => "tokyo_station",
    };
    let region = match area.kind {
        AreaKind::Ward => "23ku",
        AreaKind::City | AreaKind::Town => "tama",
        AreaKind::Island => "islands",
    };
    format!("data/{tree}/{region}/{}.csv", area.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lightweight_transit_file_is_named_station() {
        assert_eq!(
            lightweight_path(SourceKind::Transit),
            "data/lightweight/integrated_station.csv"
        );
    }

    #[test]
    fn partition_paths_follow_region_layout() {
        let ward = AreaDescriptor::new("港区", AreaKind::Ward);
        let town = AreaDescriptor::new("奥多摩町", AreaKind::Town);
        let island = AreaDescriptor::new("大島町", AreaKind::Island);

        assert_eq!(
            partition_path(&ward, SourceKind::Public),
            "data/tokyo/23ku/港区.csv"
        );
        assert_eq!(
            partition_path(&town, SourceKind::Transit),
            "data/tokyo_station/tama/奥多摩町.csv"
        );
        assert_eq!(
            partition_path(&island, SourceKind::Public),
            "data/tokyo/islands/大島町.csv"
        );
    }
}
